//! Configuration data structures for the snippet extraction pipeline.
//!
//! Two typed configs:
//! - [`ParserConfig`]: per-file extraction behavior (size gate, encoding,
//!   comment/keyword harvesting, snippet size filter)
//! - [`DirectoryConfig`]: directory walk behavior (filters, depth, chunker
//!   windowing, worker pool)
//!
//! All structs are `serde`-friendly and carry `Default` impls matching the
//! documented defaults. ENV overrides are tolerant: unknown variables are
//! ignored and parse failures fall back to defaults; `validate()` is the
//! single place where inconsistent values are rejected.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Per-file extraction options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Skip files larger than this many bytes.
    pub max_file_size: u64,
    /// Accept a detected encoding only at or above this confidence.
    pub encoding_confidence_threshold: f64,
    /// Primary decoder label.
    pub default_encoding: String,
    /// Decoder tried when detection is inconclusive.
    pub fallback_encoding: String,
    /// Attach preceding comment blocks to snippets.
    pub extract_comments: bool,
    /// Treat a first body-string as the comment (Python-style docstrings).
    pub extract_docstrings: bool,
    /// Drop function/method snippets spanning fewer lines than this.
    pub min_function_lines: usize,
    /// Drop function/method snippets spanning more lines than this.
    pub max_function_lines: usize,
    /// Drop methods whose name starts with `_`.
    pub ignore_private_methods: bool,
    /// Harvest CJK runs into the keyword bag.
    pub extract_chinese_keywords: bool,
    /// Harvest identifier-shaped tokens into the keyword bag.
    pub extract_english_keywords: bool,
    /// Drop keywords shorter than this many characters.
    pub min_keyword_length: usize,
    /// Cap on the keyword bag per snippet.
    pub max_keywords_per_snippet: usize,
    /// Cap on pooled parser handles per language.
    pub max_cache_size: usize,
    /// Per-file wall-clock deadline in milliseconds. Advisory: the grammar
    /// parser is not interruptible mid-call, so expiry is detected after the
    /// parse returns and recorded as a timeout error.
    pub parse_timeout_ms: Option<u64>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10 MiB
            encoding_confidence_threshold: 0.7,
            default_encoding: String::from("utf-8"),
            fallback_encoding: String::from("gbk"),
            extract_comments: true,
            extract_docstrings: true,
            min_function_lines: 1,
            max_function_lines: 1000,
            ignore_private_methods: false,
            extract_chinese_keywords: true,
            extract_english_keywords: true,
            min_keyword_length: 2,
            max_keywords_per_snippet: 50,
            max_cache_size: 128,
            parse_timeout_ms: None,
        }
    }
}

impl ParserConfig {
    /// Load from ENV variables or fall back to defaults, then validate.
    ///
    /// Supported ENV vars (all optional):
    /// - `SNIPPET_MAX_FILE_SIZE`          (u64, bytes)
    /// - `SNIPPET_ENCODING_CONFIDENCE`    (f64)
    /// - `SNIPPET_FALLBACK_ENCODING`      (label)
    /// - `SNIPPET_EXTRACT_COMMENTS`       (bool)
    /// - `SNIPPET_EXTRACT_DOCSTRINGS`     (bool)
    /// - `SNIPPET_MIN_FUNCTION_LINES`     (usize)
    /// - `SNIPPET_MAX_FUNCTION_LINES`     (usize)
    /// - `SNIPPET_IGNORE_PRIVATE_METHODS` (bool)
    /// - `SNIPPET_MIN_KEYWORD_LENGTH`     (usize)
    /// - `SNIPPET_MAX_KEYWORDS`           (usize)
    /// - `SNIPPET_PARSE_TIMEOUT_MS`       (u64)
    pub fn load_from_env_or_default() -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(v) = env_u64("SNIPPET_MAX_FILE_SIZE") {
            cfg.max_file_size = v;
        }
        if let Some(v) = env_f64("SNIPPET_ENCODING_CONFIDENCE") {
            cfg.encoding_confidence_threshold = v;
        }
        if let Some(v) = env_string("SNIPPET_FALLBACK_ENCODING") {
            cfg.fallback_encoding = v;
        }
        if let Some(v) = env_bool("SNIPPET_EXTRACT_COMMENTS") {
            cfg.extract_comments = v;
        }
        if let Some(v) = env_bool("SNIPPET_EXTRACT_DOCSTRINGS") {
            cfg.extract_docstrings = v;
        }
        if let Some(v) = env_usize("SNIPPET_MIN_FUNCTION_LINES") {
            cfg.min_function_lines = v;
        }
        if let Some(v) = env_usize("SNIPPET_MAX_FUNCTION_LINES") {
            cfg.max_function_lines = v;
        }
        if let Some(v) = env_bool("SNIPPET_IGNORE_PRIVATE_METHODS") {
            cfg.ignore_private_methods = v;
        }
        if let Some(v) = env_usize("SNIPPET_MIN_KEYWORD_LENGTH") {
            cfg.min_keyword_length = v;
        }
        if let Some(v) = env_usize("SNIPPET_MAX_KEYWORDS") {
            cfg.max_keywords_per_snippet = v;
        }
        if let Some(v) = env_u64("SNIPPET_PARSE_TIMEOUT_MS") {
            cfg.parse_timeout_ms = Some(v);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject inconsistent values before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(Error::InvalidConfig(
                "max_file_size must be greater than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.encoding_confidence_threshold) {
            return Err(Error::InvalidConfig(format!(
                "encoding_confidence_threshold out of range: {}",
                self.encoding_confidence_threshold
            )));
        }
        if self.min_function_lines > self.max_function_lines {
            return Err(Error::InvalidConfig(format!(
                "min_function_lines {} exceeds max_function_lines {}",
                self.min_function_lines, self.max_function_lines
            )));
        }
        if self.max_cache_size == 0 {
            return Err(Error::InvalidConfig(
                "max_cache_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Directory walk and dispatch options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Text chunker window size, in characters.
    pub chunk_size: usize,
    /// Characters carried over between consecutive windows.
    pub chunk_overlap: usize,
    /// Trailing chunks shorter than this merge into the previous chunk.
    pub min_chunk_size: usize,
    /// Walk depth cap; the root is depth 0.
    pub max_depth: usize,
    /// Global file-count cap for a single walk.
    pub max_files: usize,
    /// Follow symbolic links (cycle detection applies when set).
    pub follow_symlinks: bool,
    /// Glob patterns excluded from the walk, matched against directory and
    /// file names as well as repo-relative paths.
    pub ignore_patterns: Vec<String>,
    /// If non-empty, only files with these extensions survive.
    pub only_extensions: Vec<String>,
    /// Chunk unclassified text files as `TextChunk` snippets.
    pub extract_text_files: bool,
    /// Chunk config files (`.json`, `.yaml`, ...) as `ConfigFile` snippets.
    pub extract_config_files: bool,
    /// Chunk documentation files (`.md`, `.rst`, `.txt`) as `Documentation`.
    pub extract_documentation: bool,
    /// Emit `BinaryFile` stub snippets instead of skipping binaries.
    pub record_binary_files: bool,
    /// Populate `directory_tree` in the result.
    pub include_directory_structure: bool,
    /// Worker pool size; 0 means one worker per logical CPU. 1 is the
    /// deterministic sequential mode.
    pub worker_threads: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
            min_chunk_size: 100,
            max_depth: 10,
            max_files: 10_000,
            follow_symlinks: false,
            ignore_patterns: default_ignore_patterns(),
            only_extensions: Vec::new(),
            extract_text_files: true,
            extract_config_files: true,
            extract_documentation: true,
            record_binary_files: false,
            include_directory_structure: true,
            worker_threads: 0,
        }
    }
}

impl DirectoryConfig {
    /// Load from ENV variables or fall back to defaults, then validate.
    ///
    /// Supported ENV vars (all optional):
    /// - `SNIPPET_CHUNK_SIZE` / `SNIPPET_CHUNK_OVERLAP` / `SNIPPET_MIN_CHUNK_SIZE`
    /// - `SNIPPET_MAX_DEPTH` / `SNIPPET_MAX_FILES`
    /// - `SNIPPET_FOLLOW_SYMLINKS`
    /// - `SNIPPET_IGNORE_PATTERNS`  (comma-separated, replaces defaults)
    /// - `SNIPPET_ONLY_EXTENSIONS`  (comma-separated)
    /// - `SNIPPET_RECORD_BINARY_FILES`
    /// - `SNIPPET_WORKER_THREADS`
    pub fn load_from_env_or_default() -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(v) = env_usize("SNIPPET_CHUNK_SIZE") {
            cfg.chunk_size = v;
        }
        if let Some(v) = env_usize("SNIPPET_CHUNK_OVERLAP") {
            cfg.chunk_overlap = v;
        }
        if let Some(v) = env_usize("SNIPPET_MIN_CHUNK_SIZE") {
            cfg.min_chunk_size = v;
        }
        if let Some(v) = env_usize("SNIPPET_MAX_DEPTH") {
            cfg.max_depth = v;
        }
        if let Some(v) = env_usize("SNIPPET_MAX_FILES") {
            cfg.max_files = v;
        }
        if let Some(v) = env_bool("SNIPPET_FOLLOW_SYMLINKS") {
            cfg.follow_symlinks = v;
        }
        if let Some(v) = env_list("SNIPPET_IGNORE_PATTERNS") {
            cfg.ignore_patterns = v;
        }
        if let Some(v) = env_list("SNIPPET_ONLY_EXTENSIONS") {
            cfg.only_extensions = v;
        }
        if let Some(v) = env_bool("SNIPPET_RECORD_BINARY_FILES") {
            cfg.record_binary_files = v;
        }
        if let Some(v) = env_usize("SNIPPET_WORKER_THREADS") {
            cfg.worker_threads = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject inconsistent values before the walk starts.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.max_files == 0 {
            return Err(Error::InvalidConfig("max_files must be greater than 0".into()));
        }
        Ok(())
    }

    /// Effective worker count: 0 resolves to the logical CPU count.
    pub fn effective_workers(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.worker_threads
        }
    }
}

/// Built-in ignore baseline: VCS metadata, build caches, editor/OS noise.
pub fn default_ignore_patterns() -> Vec<String> {
    [
        ".git",
        ".hg",
        ".svn",
        "__pycache__",
        "node_modules",
        "target",
        "build",
        "dist",
        ".venv",
        ".idea",
        ".vscode",
        ".DS_Store",
        "*.swp",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/* ------------------------- ENV helpers ------------------------- */

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|s| {
        let v = s.trim().to_ascii_lowercase();
        match v.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    })
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key).ok().and_then(|s| s.trim().parse::<f64>().ok())
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().map(|s| s.trim().to_string())
}

fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let list = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    Some(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ParserConfig::default().validate().unwrap();
        DirectoryConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_max_file_size_is_rejected() {
        let cfg = ParserConfig {
            max_file_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_function_line_bounds_are_rejected() {
        let cfg = ParserConfig {
            min_function_lines: 10,
            max_function_lines: 5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        let cfg = DirectoryConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn ignore_baseline_covers_vcs_and_caches() {
        let patterns = default_ignore_patterns();
        for expected in [".git", "node_modules", "__pycache__", "target"] {
            assert!(patterns.iter().any(|p| p == expected), "missing {expected}");
        }
    }
}
