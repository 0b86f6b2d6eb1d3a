//! Language taxonomy and helpers.
//!
//! This module defines a compact enum for supported languages plus cheap
//! extension-based detection. Grammar registration and node-type vocabularies
//! live in the sibling modules so that language data stays out of the
//! extraction loop.

pub mod registry;
pub mod vocabulary;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Supported programming languages for structural extraction.
///
/// Keep the set tight and add variants deliberately. Files that do not map
/// here are handled by the text/binary pipeline instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    /// TypeScript with JSX. Same node roles as TypeScript, but a distinct
    /// grammar: the plain TypeScript parser rejects JSX syntax.
    Tsx,
    Java,
    Go,
    C,
    Cpp,
    Kotlin,
    Lua,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::Java => "java",
            Language::Go => "go",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Kotlin => "kotlin",
            Language::Lua => "lua",
        }
    }

    /// Best-effort detection by file extension.
    ///
    /// Returns `None` for unsupported extensions; callers fall back to the
    /// text/binary pipeline. The mapping is intentionally conservative.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let e = ext.to_ascii_lowercase();
        match e.as_str() {
            "py" | "pyi" => Some(Self::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "java" => Some(Self::Java),
            "go" => Some(Self::Go),
            "c" | "h" => Some(Self::C),
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Some(Self::Cpp),
            "kt" | "kts" => Some(Self::Kotlin),
            "lua" => Some(Self::Lua),
            _ => None,
        }
    }

    /// Detect from a path's extension.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
