//! Comment attachment for extracted snippets.
//!
//! Strategy:
//! - Python-style docstrings: the first expression-statement inside the body
//!   whose expression is a string literal;
//! - otherwise walk backwards over previous siblings, collecting the maximal
//!   contiguous run of comment nodes whose final line sits directly above the
//!   declaration (no gap lines, no non-comment tokens between);
//! - strip the language's comment delimiters and join top-to-bottom.
//!
//! Contiguity is judged on (0-based) rows: the nearest comment must end on
//! the line above the declaration, the one before it on the line above that
//! comment's start, and so on.

use crate::config::ParserConfig;
use crate::lang::vocabulary::NodeVocabulary;
use tree_sitter::Node;

/// Attached comment text for a class/function node, or empty.
pub fn attach(node: Node, source: &str, vocab: &NodeVocabulary, config: &ParserConfig) -> String {
    if config.extract_docstrings && vocab.has_docstrings {
        if let Some(doc) = body_docstring(node, source, vocab) {
            return doc;
        }
    }
    if config.extract_comments {
        let raw = preceding_comment_block(node, source, vocab);
        if !raw.is_empty() {
            return strip_delimiters(&raw, vocab);
        }
    }
    String::new()
}

/// First body statement as a docstring, if it is a plain string expression.
fn body_docstring(node: Node, source: &str, vocab: &NodeVocabulary) -> Option<String> {
    let body = {
        let mut found = None;
        let mut w = node.walk();
        for ch in node.children(&mut w) {
            if vocab.is_body(ch.kind()) {
                found = Some(ch);
                break;
            }
        }
        found?
    };

    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    let raw = expr.utf8_text(source.as_bytes()).ok()?;
    let doc = strip_string_quotes(raw);
    if doc.is_empty() { None } else { Some(doc) }
}

/// Raw text of the contiguous comment run directly above `node`.
fn preceding_comment_block(node: Node, source: &str, vocab: &NodeVocabulary) -> String {
    // Decorated Python definitions hang off a wrapper node; comments sit
    // above the wrapper, not the definition itself.
    let anchor = match node.parent() {
        Some(p) if p.kind() == "decorated_definition" => p,
        _ => node,
    };

    let mut parts = Vec::<String>::new();
    let mut expected = anchor.start_position().row;
    let mut cur = anchor;

    while let Some(prev) = cur.prev_sibling() {
        if !vocab.is_comment(prev.kind()) {
            break;
        }
        if expected == 0 || prev.end_position().row != expected - 1 {
            break;
        }
        let text = prev.utf8_text(source.as_bytes()).unwrap_or_default();
        parts.push(text.to_string());
        expected = prev.start_position().row;
        cur = prev;
    }

    parts.reverse();
    parts.join("\n")
}

/// Strip comment delimiters line by line: block open/close, doc-comment and
/// line-comment prefixes, `*` continuation lines.
pub fn strip_delimiters(raw: &str, vocab: &NodeVocabulary) -> String {
    let mut lines = Vec::<String>::new();
    for line in raw.lines() {
        let mut s = line.trim();

        if let Some((open, close)) = vocab.block_comment {
            if s.starts_with("/**") {
                s = &s[3..];
            } else if s.starts_with(open) {
                s = &s[open.len()..];
            }
            if s.ends_with(close) {
                s = &s[..s.len() - close.len()];
            }
            // Continuation lines inside C-style blocks.
            if close == "*/" && s.starts_with('*') && !s.starts_with("*/") {
                s = &s[1..];
            }
        }

        for prefix in ["///", "//!"] {
            if vocab.comment_prefixes.contains(&"//") && s.starts_with(prefix) {
                s = &s[prefix.len()..];
            }
        }
        for prefix in vocab.comment_prefixes {
            if s.starts_with(prefix) {
                s = &s[prefix.len()..];
            }
        }

        let s = s.trim();
        if !s.is_empty() {
            lines.push(s.to_string());
        }
    }
    lines.join("\n")
}

/// Strip string prefixes and quotes from a docstring literal.
pub fn strip_string_quotes(raw: &str) -> String {
    let mut t = raw.trim();

    // Skip literal prefixes (r, b, u, f and combinations) before the quote.
    if let Some(p) = t.find(['"', '\'']) {
        if p > 0
            && p <= 2
            && t[..p]
                .chars()
                .all(|c| matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U' | 'f' | 'F'))
        {
            t = &t[p..];
        }
    }

    for quote in ["\"\"\"", "'''"] {
        if t.starts_with(quote) && t.ends_with(quote) && t.len() >= 2 * quote.len() {
            return t[quote.len()..t.len() - quote.len()].trim().to_string();
        }
    }
    for quote in ["\"", "'"] {
        if t.starts_with(quote) && t.ends_with(quote) && t.len() >= 2 {
            return t[1..t.len() - 1].trim().to_string();
        }
    }
    t.trim().to_string()
}
