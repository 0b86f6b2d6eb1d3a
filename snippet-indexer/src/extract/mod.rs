//! Per-file structural extraction.
//!
//! Pipeline: size gate → decode → tree-sitter parse → DFS walk with a class
//! stack → size filter → keyword harvest → content hash. Partial trees are
//! accepted: subtrees that parsed cleanly still yield snippets, and per-file
//! failures never escape the returned [`ParseResult`].

pub mod comments;
pub mod encoding;
pub mod keywords;

use crate::config::ParserConfig;
use crate::errors::Error;
use crate::lang::registry::GrammarRegistry;
use crate::lang::vocabulary::{NodeVocabulary, vocabulary_for};
use crate::lang::Language;
use crate::types::{ParseResult, Snippet, SnippetKind};
use md5::{Digest, Md5};
use serde_json::json;
use std::time::Instant;
use tracing::{debug, warn};
use tree_sitter::Node;

/// Lowercase-hex MD5 of snippet text.
pub fn content_hash(code: &str) -> String {
    content_hash_bytes(code.as_bytes())
}

/// Lowercase-hex MD5 of raw bytes; used for file-level change detection.
pub fn content_hash_bytes(bytes: &[u8]) -> String {
    let mut h = Md5::new();
    h.update(bytes);
    format!("{:x}", h.finalize())
}

/// Split a repo-relative path into `(directory, filename)`.
pub fn split_path(rel_path: &str) -> (String, String) {
    match rel_path.rsplit_once('/') {
        Some((dir, file)) => (dir.to_string(), file.to_string()),
        None => (String::new(), rel_path.to_string()),
    }
}

/// File stem: basename without the final extension.
pub fn file_stem(rel_path: &str) -> String {
    let (_, filename) = split_path(rel_path);
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => filename,
    }
}

pub struct SnippetExtractor<'a> {
    registry: &'a GrammarRegistry,
    config: &'a ParserConfig,
}

impl<'a> SnippetExtractor<'a> {
    pub fn new(registry: &'a GrammarRegistry, config: &'a ParserConfig) -> Self {
        Self { registry, config }
    }

    /// Extract snippets from one file's bytes.
    ///
    /// All failure modes are recorded in the result's error list; snippets
    /// salvaged before a failure stay in place.
    #[tracing::instrument(level = "debug", skip_all, fields(path = rel_path, language = %language))]
    pub fn extract(&self, rel_path: &str, bytes: &[u8], language: Language) -> ParseResult {
        let started = Instant::now();
        let mut result = ParseResult::new(rel_path, Some(language));
        result
            .metadata
            .insert("file_size".to_string(), json!(bytes.len()));

        if bytes.len() as u64 > self.config.max_file_size {
            result.errors.push(
                Error::FileTooLarge {
                    size: bytes.len() as u64,
                    limit: self.config.max_file_size,
                }
                .to_string(),
            );
            result.processing_time_ms = started.elapsed().as_millis() as u64;
            return result;
        }

        let (source, encoding_label) = match encoding::decode(bytes, self.config) {
            Ok(decoded) => decoded,
            Err(err) => {
                result.errors.push(err.to_string());
                result.processing_time_ms = started.elapsed().as_millis() as u64;
                return result;
            }
        };
        result
            .metadata
            .insert("encoding".to_string(), json!(encoding_label));

        let parsed = self
            .registry
            .with_parser(language, |parser| parser.parse(source.as_bytes(), None));
        let tree = match parsed {
            Ok(Some(tree)) => tree,
            Ok(None) => {
                result.errors.push(Error::ParseSyntax.to_string());
                result.processing_time_ms = started.elapsed().as_millis() as u64;
                return result;
            }
            Err(err) => {
                result.errors.push(err.to_string());
                result.processing_time_ms = started.elapsed().as_millis() as u64;
                return result;
            }
        };

        let root = tree.root_node();
        if root.kind() == "ERROR" {
            // The grammar produced nothing usable at the top; salvage below.
            result.errors.push(Error::ParseSyntax.to_string());
        } else if root.has_error() {
            warn!(path = rel_path, "parse tree contains error nodes");
        }

        let vocab = vocabulary_for(language);
        let mut snippets = self.walk(root, &source, rel_path, language, vocab);
        snippets.sort_by_key(|s| (s.line_start, s.line_end));
        debug!(count = snippets.len(), "snippets extracted");
        result.snippets = snippets;

        let elapsed = started.elapsed().as_millis() as u64;
        if let Some(limit) = self.config.parse_timeout_ms {
            if elapsed > limit {
                result.errors.push(Error::ParseTimeout(limit).to_string());
            }
        }
        result.processing_time_ms = elapsed;
        result
    }

    /// Iterative pre-order traversal with an explicit class stack.
    ///
    /// Entering a class emits a `CodeClass` snippet and pushes its name; a
    /// sentinel frame pops the name once the subtree is done. Function nodes
    /// consult the stack top to decide method vs free function.
    fn walk(
        &self,
        root: Node,
        source: &str,
        rel_path: &str,
        language: Language,
        vocab: &NodeVocabulary,
    ) -> Vec<Snippet> {
        enum Frame<'t> {
            Enter(Node<'t>),
            PopClass,
        }

        let mut out = Vec::<Snippet>::new();
        let mut class_stack = Vec::<String>::new();
        let mut stack = vec![Frame::Enter(root)];

        while let Some(frame) = stack.pop() {
            let node = match frame {
                Frame::PopClass => {
                    class_stack.pop();
                    continue;
                }
                Frame::Enter(node) => node,
            };
            let kind = node.kind();

            if vocab.is_class_decl(kind) && (!vocab.class_needs_body || has_body_child(node, vocab))
            {
                if let Some(name) = class_name_of(node, source, vocab) {
                    out.push(self.emit(
                        SnippetKind::CodeClass,
                        node,
                        source,
                        rel_path,
                        language,
                        vocab,
                        &name,
                        "",
                    ));
                    class_stack.push(name);
                    stack.push(Frame::PopClass);
                    push_children(node, &mut stack, Frame::Enter);
                    continue;
                }
            } else if vocab.is_function_decl(kind) && !vocab.anonymous_forms.contains(&kind) {
                // Anonymous forms (unnamed arrow functions, IIFEs) are skipped:
                // no parent-chain climbing for a synthetic name.
                if let Some(name) = function_name_of(node, source, vocab) {
                    let (snippet_kind, class_name) = match class_stack.last() {
                        Some(top) => (SnippetKind::CodeMethod, top.clone()),
                        None => (SnippetKind::CodeFunction, String::new()),
                    };
                    let private_dropped = snippet_kind == SnippetKind::CodeMethod
                        && self.config.ignore_private_methods
                        && name.starts_with('_');
                    if !private_dropped {
                        let snippet = self.emit(
                            snippet_kind,
                            node,
                            source,
                            rel_path,
                            language,
                            vocab,
                            &name,
                            &class_name,
                        );
                        let span = snippet.line_count();
                        if span >= self.config.min_function_lines
                            && span <= self.config.max_function_lines
                        {
                            out.push(snippet);
                        }
                    }
                }
                // Still descend: nested declarations live inside the body.
            }

            push_children(node, &mut stack, Frame::Enter);
        }

        out
    }

    #[allow(clippy::too_many_arguments)]
    fn emit(
        &self,
        kind: SnippetKind,
        node: Node,
        source: &str,
        rel_path: &str,
        language: Language,
        vocab: &NodeVocabulary,
        name: &str,
        class_name: &str,
    ) -> Snippet {
        let code = source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or_default()
            .to_string();
        let comment = comments::attach(node, source, vocab, self.config);
        let args = match kind {
            SnippetKind::CodeFunction | SnippetKind::CodeMethod => {
                parameters_text(node, source, vocab)
            }
            _ => String::new(),
        };
        let func_name = match kind {
            SnippetKind::CodeFunction | SnippetKind::CodeMethod => name.to_string(),
            _ => String::new(),
        };
        let stem = file_stem(rel_path);
        let keywords = keywords::harvest(&code, &comment, &stem, self.config);
        let (directory, filename) = split_path(rel_path);

        Snippet {
            kind,
            path: rel_path.to_string(),
            directory,
            filename,
            name: name.to_string(),
            content_hash: content_hash(&code),
            code,
            func_name,
            args,
            class_name: class_name.to_string(),
            comment,
            line_start: node.start_position().row + 1,
            line_end: node.end_position().row + 1,
            language: Some(language),
            keywords,
            metadata: Default::default(),
        }
    }
}

fn push_children<'t, F>(node: Node<'t>, stack: &mut Vec<F>, wrap: impl Fn(Node<'t>) -> F) {
    // Reverse order keeps left-to-right traversal when popping.
    let mut w = node.walk();
    let children: Vec<_> = node.children(&mut w).collect();
    for ch in children.into_iter().rev() {
        stack.push(wrap(ch));
    }
}

fn has_body_child(node: Node, vocab: &NodeVocabulary) -> bool {
    let mut w = node.walk();
    node.children(&mut w).any(|ch| vocab.is_body(ch.kind()))
}

/// Resolve a function declaration's name.
///
/// Lookup order is defensive across grammars: a `name` field when present,
/// then the declarator subtree (C/C++ put the identifier inside nested
/// declarators), then direct children. There is deliberately no deeper
/// search: a function with no name here is anonymous and gets skipped.
fn function_name_of(node: Node, source: &str, vocab: &NodeVocabulary) -> Option<String> {
    if let Some(name_node) = node.child_by_field_name("name") {
        if let Ok(text) = name_node.utf8_text(source.as_bytes()) {
            if is_ident_like(text) {
                return Some(text.to_string());
            }
        }
    }

    if let Some(declarator) = node.child_by_field_name("declarator") {
        if let Some(found) = first_identifier_descendant(declarator, source, vocab) {
            return Some(found);
        }
    }

    let mut w = node.walk();
    for ch in node.children(&mut w) {
        if vocab.is_identifier(ch.kind()) {
            if let Ok(text) = ch.utf8_text(source.as_bytes()) {
                if is_ident_like(text) {
                    return Some(text.to_string());
                }
            }
        }
    }

    None
}

/// Resolve a class declaration's name.
///
/// Same lookup as functions plus a bounded descendant search that does not
/// cross into body nodes — Go wraps the `type_identifier` inside a
/// `type_spec`, one level below the declaration.
fn class_name_of(node: Node, source: &str, vocab: &NodeVocabulary) -> Option<String> {
    if let Some(found) = function_name_of(node, source, vocab) {
        return Some(found);
    }
    first_identifier_descendant_skipping_bodies(node, source, vocab)
}

fn first_identifier_descendant(node: Node, source: &str, vocab: &NodeVocabulary) -> Option<String> {
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if vocab.is_identifier(n.kind()) {
            if let Ok(text) = n.utf8_text(source.as_bytes()) {
                if is_ident_like(text) {
                    return Some(text.to_string());
                }
            }
        }
        let mut w = n.walk();
        let children: Vec<_> = n.children(&mut w).collect();
        for ch in children.into_iter().rev() {
            stack.push(ch);
        }
    }
    None
}

fn first_identifier_descendant_skipping_bodies(
    node: Node,
    source: &str,
    vocab: &NodeVocabulary,
) -> Option<String> {
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if n.id() != node.id() && vocab.is_body(n.kind()) {
            continue;
        }
        if vocab.is_identifier(n.kind()) {
            if let Ok(text) = n.utf8_text(source.as_bytes()) {
                if is_ident_like(text) {
                    return Some(text.to_string());
                }
            }
        }
        let mut w = n.walk();
        let children: Vec<_> = n.children(&mut w).collect();
        for ch in children.into_iter().rev() {
            stack.push(ch);
        }
    }
    None
}

/// Verbatim text of the first parameters-role node, punctuation included.
///
/// The `parameters` field is authoritative where the grammar has one (it
/// skips past Go method receivers); otherwise direct children, then the
/// declarator subtree for C-style declarations.
fn parameters_text(node: Node, source: &str, vocab: &NodeVocabulary) -> String {
    if let Some(params) = node.child_by_field_name("parameters") {
        return params
            .utf8_text(source.as_bytes())
            .unwrap_or_default()
            .to_string();
    }
    let mut w = node.walk();
    for ch in node.children(&mut w) {
        if vocab.is_parameters(ch.kind()) {
            return ch
                .utf8_text(source.as_bytes())
                .unwrap_or_default()
                .to_string();
        }
    }
    // C-style declarations nest the list inside the declarator.
    if let Some(declarator) = node.child_by_field_name("declarator") {
        let mut stack = vec![declarator];
        while let Some(n) = stack.pop() {
            if vocab.is_parameters(n.kind()) {
                return n.utf8_text(source.as_bytes()).unwrap_or_default().to_string();
            }
            let mut w = n.walk();
            let children: Vec<_> = n.children(&mut w).collect();
            for ch in children.into_iter().rev() {
                stack.push(ch);
            }
        }
    }
    String::new()
}

/// Rough check whether a string can start an identifier.
fn is_ident_like(s: &str) -> bool {
    let mut it = s.chars();
    matches!(it.next(), Some(c) if c == '_' || c == '$' || c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_md5_hex() {
        // MD5("") and MD5("abc") are fixed vectors.
        assert_eq!(content_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(content_hash("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn path_helpers_split_and_stem() {
        assert_eq!(
            split_path("src/core/calc.py"),
            ("src/core".to_string(), "calc.py".to_string())
        );
        assert_eq!(split_path("calc.py"), (String::new(), "calc.py".to_string()));
        assert_eq!(file_stem("src/calc.py"), "calc");
        assert_eq!(file_stem("Makefile"), "Makefile");
        assert_eq!(file_stem(".gitignore"), ".gitignore");
    }
}
