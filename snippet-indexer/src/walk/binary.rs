//! Binary and text-kind classification heuristics.

use crate::types::SnippetKind;

/// Extensions that are binary regardless of content.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "svgz", "pdf", "zip", "tar", "gz", "bz2",
    "xz", "7z", "rar", "jar", "war", "exe", "dll", "so", "dylib", "a", "o", "obj", "class", "pyc",
    "pyo", "wasm", "ttf", "otf", "woff", "woff2", "eot", "mp3", "mp4", "m4a", "avi", "mov", "mkv",
    "webm", "flac", "ogg", "wav", "db", "sqlite", "sqlite3", "bin", "dat", "iso", "img", "dmg",
];

const DOCUMENTATION_EXTENSIONS: &[&str] = &["md", "rst", "txt"];

const CONFIG_EXTENSIONS: &[&str] = &["json", "yaml", "yml", "toml", "ini"];

/// How many leading bytes the NUL sniff inspects.
const SNIFF_WINDOW: usize = 8 * 1024;

pub fn is_binary_extension(ext: &str) -> bool {
    let e = ext.to_ascii_lowercase();
    BINARY_EXTENSIONS.contains(&e.as_str())
}

/// NUL byte in the first 8 KiB marks the content as binary.
pub fn looks_binary(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    window.contains(&0)
}

/// Text-kind classification by extension: documentation, config, or generic.
pub fn text_kind(ext: &str) -> SnippetKind {
    let e = ext.to_ascii_lowercase();
    if DOCUMENTATION_EXTENSIONS.contains(&e.as_str()) {
        SnippetKind::Documentation
    } else if CONFIG_EXTENSIONS.contains(&e.as_str()) {
        SnippetKind::ConfigFile
    } else {
        SnippetKind::TextChunk
    }
}

/// Coarse MIME guess for binary-file metadata.
pub fn guess_mime(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "zip" | "jar" | "war" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_bytes_mark_binary() {
        assert!(looks_binary(b"ELF\x00\x01\x02"));
        assert!(!looks_binary(b"plain text\nwith lines\n"));
        assert!(!looks_binary(b""));
    }

    #[test]
    fn known_extensions_classify_as_binary() {
        assert!(is_binary_extension("png"));
        assert!(is_binary_extension("PNG"));
        assert!(!is_binary_extension("py"));
        assert!(!is_binary_extension("md"));
    }

    #[test]
    fn text_kinds_split_docs_from_config() {
        assert_eq!(text_kind("md"), SnippetKind::Documentation);
        assert_eq!(text_kind("rst"), SnippetKind::Documentation);
        assert_eq!(text_kind("yaml"), SnippetKind::ConfigFile);
        assert_eq!(text_kind("toml"), SnippetKind::ConfigFile);
        assert_eq!(text_kind("log"), SnippetKind::TextChunk);
    }
}
