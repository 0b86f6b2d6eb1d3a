//! Keyword harvesting for lexical search assist.
//!
//! The bag is the deduplicated union of CJK runs and identifier-shaped tokens
//! from the snippet text and its attached comment, plus the file stem. Tokens
//! below the configured length floor are dropped and the bag is capped. The
//! joined string preserves first-seen order, which keeps repeated runs
//! deterministic; consumers must treat it as unordered.

use crate::config::ParserConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("identifier regex"));

/// Contiguous runs in the Unified CJK ranges (base + extension A).
static CJK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{4E00}-\x{9FFF}\x{3400}-\x{4DBF}]+").expect("cjk regex"));

/// Harvest the space-joined keyword bag for one snippet.
pub fn harvest(code: &str, comment: &str, file_stem: &str, config: &ParserConfig) -> String {
    let mut seen = HashSet::<String>::new();
    let mut out = Vec::<String>::new();

    let mut add = |token: &str, out: &mut Vec<String>, seen: &mut HashSet<String>| {
        if token.chars().count() < config.min_keyword_length {
            return;
        }
        if out.len() >= config.max_keywords_per_snippet {
            return;
        }
        if seen.insert(token.to_string()) {
            out.push(token.to_string());
        }
    };

    if config.extract_english_keywords {
        for m in IDENT_RE.find_iter(code) {
            add(m.as_str(), &mut out, &mut seen);
        }
        for m in IDENT_RE.find_iter(comment) {
            add(m.as_str(), &mut out, &mut seen);
        }
    }

    if config.extract_chinese_keywords {
        for m in CJK_RE.find_iter(code) {
            add(m.as_str(), &mut out, &mut seen);
        }
        for m in CJK_RE.find_iter(comment) {
            add(m.as_str(), &mut out, &mut seen);
        }
    }

    add(file_stem, &mut out, &mut seen);

    out.join(" ")
}
