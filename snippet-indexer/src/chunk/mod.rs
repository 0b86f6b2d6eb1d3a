//! Sliding-window chunking for non-code files.
//!
//! Windows are measured in characters with a configurable carry-over between
//! consecutive windows. A trailing chunk shorter than `min_chunk_size` is
//! merged into the previous chunk so consumers never see a fragment tail.
//! Line ranges are recovered from character offsets.

use crate::config::{DirectoryConfig, ParserConfig};
use crate::extract::{content_hash, file_stem, keywords, split_path};
use crate::lang::Language;
use crate::types::{Snippet, SnippetKind};

/// Chunk decoded text into snippets of the given kind.
pub fn chunk_text(
    rel_path: &str,
    text: &str,
    kind: SnippetKind,
    language: Option<Language>,
    dir_config: &DirectoryConfig,
    parser_config: &ParserConfig,
) -> Vec<Snippet> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let size = dir_config.chunk_size.max(1);
    let overlap = dir_config.chunk_overlap.min(size.saturating_sub(1));
    let step = size - overlap;

    // Cumulative newline counts: nl_prefix[i] = newlines among chars[..i].
    let mut nl_prefix = Vec::with_capacity(chars.len() + 1);
    nl_prefix.push(0usize);
    for c in &chars {
        let last = *nl_prefix.last().expect("prefix seeded");
        nl_prefix.push(last + usize::from(*c == '\n'));
    }

    let mut ranges = Vec::<(usize, usize)>::new();
    let mut start = 0usize;
    loop {
        let end = (start + size).min(chars.len());
        ranges.push((start, end));
        if end == chars.len() {
            break;
        }
        start += step;
    }

    // Merge a fragment tail into its predecessor.
    if ranges.len() >= 2 {
        let (tail_start, tail_end) = *ranges.last().expect("non-empty");
        if tail_end - tail_start < dir_config.min_chunk_size {
            ranges.pop();
            let last = ranges.last_mut().expect("predecessor exists");
            last.1 = tail_end;
        }
    }

    let stem = file_stem(rel_path);
    let (directory, filename) = split_path(rel_path);

    ranges
        .into_iter()
        .enumerate()
        .map(|(i, (s, e))| {
            let code: String = chars[s..e].iter().collect();
            let keywords = keywords::harvest(&code, "", &stem, parser_config);
            Snippet {
                kind,
                path: rel_path.to_string(),
                directory: directory.clone(),
                filename: filename.clone(),
                name: format!("{stem}_chunk_{i}"),
                content_hash: content_hash(&code),
                code,
                func_name: String::new(),
                args: String::new(),
                class_name: String::new(),
                comment: String::new(),
                line_start: nl_prefix[s] + 1,
                line_end: nl_prefix[e.saturating_sub(1).max(s)] + 1,
                language,
                keywords,
                metadata: Default::default(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configs(size: usize, overlap: usize, min: usize) -> (DirectoryConfig, ParserConfig) {
        (
            DirectoryConfig {
                chunk_size: size,
                chunk_overlap: overlap,
                min_chunk_size: min,
                ..Default::default()
            },
            ParserConfig::default(),
        )
    }

    #[test]
    fn short_text_becomes_one_chunk() {
        let (dc, pc) = configs(512, 50, 100);
        let chunks = chunk_text(
            "README.md",
            "short text",
            SnippetKind::Documentation,
            None,
            &dc,
            &pc,
        );
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].name, "README_chunk_0");
        assert_eq!(chunks[0].code, "short text");
        assert_eq!(chunks[0].line_start, 1);
        assert_eq!(chunks[0].line_end, 1);
    }

    #[test]
    fn windows_overlap_by_the_configured_carry() {
        let (dc, pc) = configs(10, 4, 1);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunk_text("notes.txt", text, SnippetKind::Documentation, None, &dc, &pc);
        assert!(chunks.len() >= 2);
        // Step is size - overlap = 6, so the second window starts at char 6.
        assert!(chunks[0].code.ends_with("ghij"));
        assert!(chunks[1].code.starts_with("ghij"));
    }

    #[test]
    fn fragment_tail_merges_into_previous_chunk() {
        let (dc, pc) = configs(10, 0, 5);
        let text = "0123456789ab"; // 12 chars: window of 10 plus a 2-char tail
        let chunks = chunk_text("notes.txt", text, SnippetKind::TextChunk, None, &dc, &pc);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].code, text);
    }

    #[test]
    fn line_ranges_follow_newlines() {
        let (dc, pc) = configs(6, 0, 1);
        let text = "ab\ncd\nef\n";
        let chunks = chunk_text("doc.md", text, SnippetKind::Documentation, None, &dc, &pc);
        assert_eq!(chunks[0].line_start, 1);
        assert_eq!(chunks[0].line_end, 2); // "ab\ncd\n" ends on line 2
        let last = chunks.last().unwrap();
        assert_eq!(last.line_end, 3);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let (dc, pc) = configs(512, 50, 100);
        assert!(chunk_text("x.txt", "", SnippetKind::TextChunk, None, &dc, &pc).is_empty());
    }

    #[test]
    fn chunk_order_is_ascending_by_line() {
        let (dc, pc) = configs(8, 2, 1);
        let text = "line one\nline two\nline three\nline four\n";
        let chunks = chunk_text("doc.md", text, SnippetKind::Documentation, None, &dc, &pc);
        let mut prev = 0;
        for c in &chunks {
            assert!(c.line_start >= 1);
            assert!(c.line_start <= c.line_end);
            assert!(c.line_start >= prev);
            prev = c.line_start;
        }
    }
}
