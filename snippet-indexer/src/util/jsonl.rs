//! JSONL export for snippet streams.

use crate::errors::{Error, Result};
use crate::types::Snippet;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Line-oriented writer: one serialized [`Snippet`] per line.
pub struct SnippetWriter {
    w: BufWriter<File>,
}

impl SnippetWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let f = File::create(path).map_err(Error::from)?;
        Ok(Self {
            w: BufWriter::new(f),
        })
    }

    pub fn write(&mut self, snippet: &Snippet) -> Result<()> {
        serde_json::to_writer(&mut self.w, snippet).map_err(Error::from)?;
        self.w.write_all(b"\n").map_err(Error::from)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.w.flush().map_err(Error::from)
    }
}

/// Write a whole snippet slice to `path`.
pub fn write_snippets(path: impl AsRef<Path>, snippets: &[Snippet]) -> Result<()> {
    let mut w = SnippetWriter::create(path)?;
    for s in snippets {
        w.write(s)?;
    }
    w.finish()
}
