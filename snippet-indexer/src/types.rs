//! Portable output schema for the snippet extraction pipeline.
//!
//! Design goals:
//! - Language-neutral records with minimal assumptions about consumers.
//! - Stable identity via content hashes (computed at emit time).
//! - Deterministic serialized form: `snake_case` enums, `BTreeMap` bags.
//!
//! A [`Snippet`] is the atomic unit handed to the embedding/indexing stage;
//! [`ParseResult`] and [`DirectoryParseResult`] wrap per-file and per-tree
//! outcomes with their error context.

use crate::lang::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//
// ──────────────────────────────────────────────────────────────────────────
//  Snippet
// ──────────────────────────────────────────────────────────────────────────
//

/// Classification of an extracted snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetKind {
    CodeFunction,
    CodeMethod,
    CodeClass,
    TextChunk,
    ConfigFile,
    Documentation,
    BinaryFile,
}

/// One semantic unit carved out of a source file.
///
/// Line ranges are 1-based and inclusive. `code` is the verbatim text of the
/// snippet under the encoding used for the whole file, and `content_hash` is
/// the lowercase-hex MD5 of `code` alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub kind: SnippetKind,

    /// Repo-relative file path with `/` separators.
    pub path: String,
    /// Directory part of `path` (empty for files at the root).
    pub directory: String,
    /// File name part of `path`.
    pub filename: String,

    /// Primary identifier: function/class name, or `<stem>_chunk_{i}` for text.
    pub name: String,
    /// Verbatim snippet text.
    pub code: String,
    /// Lowercase-hex MD5 of `code`.
    pub content_hash: String,

    /// Populated for callable kinds; empty otherwise.
    pub func_name: String,
    /// Verbatim parameter list including surrounding punctuation.
    pub args: String,
    /// Enclosing class for methods; empty for free functions.
    pub class_name: String,

    /// Attached preceding comment or docstring, delimiters stripped.
    pub comment: String,

    pub line_start: usize,
    pub line_end: usize,

    /// Detected language, or `None` for text/config/binary records.
    pub language: Option<Language>,

    /// Space-joined deduplicated token bag for lexical search assist.
    /// Consumers must not rely on token order.
    pub keywords: String,

    /// Open key/value bag for implementation extras (file size, encoding, MIME).
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Snippet {
    /// Number of lines the snippet spans.
    pub fn line_count(&self) -> usize {
        self.line_end.saturating_sub(self.line_start) + 1
    }

    pub fn is_code(&self) -> bool {
        matches!(
            self.kind,
            SnippetKind::CodeFunction | SnippetKind::CodeMethod | SnippetKind::CodeClass
        )
    }
}

//
// ──────────────────────────────────────────────────────────────────────────
//  Per-file and per-tree results
// ──────────────────────────────────────────────────────────────────────────
//

/// Outcome of parsing a single file.
///
/// Errors do not clear `snippets`: whatever was salvaged before the failure
/// stays in the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub language: Option<Language>,
    /// Repo-relative file path with `/` separators.
    pub path: String,
    pub snippets: Vec<Snippet>,
    /// Rendered per-file errors, in the order they occurred.
    pub errors: Vec<String>,
    /// File-level extras: `file_size`, `encoding`.
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub processing_time_ms: u64,
}

impl ParseResult {
    pub fn new(path: &str, language: Option<Language>) -> Self {
        Self {
            language,
            path: path.to_string(),
            snippets: Vec::new(),
            errors: Vec::new(),
            metadata: BTreeMap::new(),
            processing_time_ms: 0,
        }
    }

    /// A parse succeeded when the language was recognized and nothing failed.
    pub fn is_successful(&self) -> bool {
        self.language.is_some() && self.errors.is_empty()
    }
}

/// Directory structure captured during the walk, for consumers that want to
/// render the tree without re-walking the filesystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryTree {
    pub name: String,
    pub dirs: Vec<DirectoryTree>,
    pub files: Vec<String>,
}

/// Aggregated outcome of walking a directory tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryParseResult {
    /// Canonicalized root the walk started from.
    pub root: String,
    /// Files encountered during the walk, before per-file filters.
    pub total_files_seen: usize,
    /// Files that were dispatched and produced a result.
    pub processed_files: usize,
    /// Files dropped by filters, binary policy, or incremental skip.
    pub skipped_files: usize,
    /// All snippets, sorted by `(path, line_start, line_end)`.
    pub snippets: Vec<Snippet>,
    /// Per-file failures keyed by repo-relative path.
    pub errors: BTreeMap<String, String>,
    /// Snippet-producing code files counted per language.
    pub per_language_counts: BTreeMap<String, usize>,
    pub directory_tree: Option<DirectoryTree>,
    pub elapsed_ms: u64,
    /// Incremental mode: paths present in the prior snapshot but gone now.
    pub deleted: Vec<String>,
    /// Incremental mode: surviving paths whose hash matches the prior snapshot.
    /// Their snippets remain with the snippet store collaborator.
    pub unchanged: Vec<String>,
}

impl DirectoryParseResult {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            total_files_seen: 0,
            processed_files: 0,
            skipped_files: 0,
            snippets: Vec::new(),
            errors: BTreeMap::new(),
            per_language_counts: BTreeMap::new(),
            directory_tree: None,
            elapsed_ms: 0,
            deleted: Vec::new(),
            unchanged: Vec::new(),
        }
    }
}
