//! Path normalization helpers.
//!
//! Snippets carry repository-relative paths with stable `/` separators so the
//! same tree indexed on different machines (or platforms) produces identical
//! records.

use std::path::Path;

/// Replace OS-specific separators with `/`.
pub fn to_unix_sep<S: AsRef<str>>(s: S) -> String {
    s.as_ref().replace('\\', "/")
}

/// Repo-relative string for `path` under `root`, `/`-separated.
///
/// Falls back to the lossy full path when `path` is not under `root`; callers
/// only hit that case with hand-built inputs.
pub fn repo_rel(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    to_unix_sep(rel.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn separators_are_normalized() {
        assert_eq!(to_unix_sep(r"src\core\a.py"), "src/core/a.py");
        assert_eq!(to_unix_sep("already/fine"), "already/fine");
    }

    #[test]
    fn relative_paths_strip_the_root() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/src/a.py");
        assert_eq!(repo_rel(&root, &file), "src/a.py");
    }
}
