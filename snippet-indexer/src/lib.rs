//! Public entrypoints for repository snippet extraction.
//!
//! The crate turns a source tree into a deduplicated stream of [`Snippet`]
//! records for downstream embedding and retrieval:
//! - [`lang`] maps extensions to grammars and node-type vocabularies;
//! - [`extract`] walks syntax trees and carves out functions/methods/classes;
//! - [`chunk`] windows non-code text;
//! - [`walk`] drives a whole directory with filters, a worker pool, and
//!   optional snapshot-based incremental mode.

pub mod chunk;
pub mod config;
pub mod errors;
pub mod extract;
pub mod lang;
pub mod types;
pub mod util;
pub mod walk;

pub use config::{DirectoryConfig, ParserConfig};
pub use errors::{Error, Result};
pub use lang::Language;
pub use types::{DirectoryParseResult, ParseResult, Snippet, SnippetKind};
pub use walk::DirectoryParser;
pub use walk::pool::CancelToken;

use lang::registry::GrammarRegistry;
use std::fs;
use std::path::Path;

/// Parse a single file into a [`ParseResult`].
///
/// Files whose extension does not map to a supported language come back with
/// `language: None` and no snippets; callers route those to the text
/// pipeline via [`DirectoryParser`] or [`chunk::chunk_text`].
pub fn parse_file(path: &Path, config: &ParserConfig) -> Result<ParseResult> {
    config.validate()?;
    let rel = util::paths::to_unix_sep(path.to_string_lossy());
    let Some(language) = Language::from_path(path) else {
        return Ok(ParseResult::new(&rel, None));
    };
    let bytes = fs::read(path)?;
    let registry = GrammarRegistry::new(config.max_cache_size);
    let extractor = extract::SnippetExtractor::new(&registry, config);
    Ok(extractor.extract(&rel, &bytes, language))
}

/// Parse a whole directory tree with default cancellation.
pub fn parse_directory(
    root: &Path,
    parser_config: ParserConfig,
    directory_config: DirectoryConfig,
) -> Result<DirectoryParseResult> {
    let parser = DirectoryParser::new(parser_config, directory_config)?;
    parser.parse_directory(root)
}
