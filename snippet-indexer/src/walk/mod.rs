//! Directory driver: walk, filter, dispatch, aggregate.
//!
//! Responsibilities:
//! - Walk a root directory with pruning, depth/file caps, and glob filters;
//! - Route each surviving file to the structural extractor (code), the text
//!   chunker (docs/config/plain text), or the binary policy;
//! - Run per-file work on a bounded worker pool with per-file error isolation;
//! - In incremental mode, diff content hashes against a prior snapshot and
//!   dispatch only added/modified paths.
//!
//! Walk order is documented and stable: within a directory, subdirectories
//! are visited before files, each group in lexicographic name order.

pub mod binary;
pub mod pool;

use crate::chunk;
use crate::config::{DirectoryConfig, ParserConfig};
use crate::errors::{Error, Result};
use crate::extract::{self, SnippetExtractor, content_hash_bytes, split_path};
use crate::lang::Language;
use crate::lang::registry::GrammarRegistry;
use crate::types::{DirectoryParseResult, DirectoryTree, Snippet, SnippetKind};
use crate::util::paths;
use globset::{Glob, GlobSet, GlobSetBuilder};
use pool::CancelToken;
use serde_json::json;
use snapshot_store::{Snapshot, SnapshotStore};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Reserved error-map key for walk-level conditions (cancellation).
pub const WALK_ERROR_KEY: &str = "<walk>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Code(Language),
    Text(SnippetKind),
    Binary,
}

#[derive(Debug)]
struct FileTask {
    rel_path: String,
    abs_path: PathBuf,
    route: Route,
}

#[derive(Debug)]
struct FileOutcome {
    rel_path: String,
    language: Option<Language>,
    snippets: Vec<Snippet>,
    error: Option<String>,
    skipped: bool,
}

#[derive(Debug, Default)]
struct WalkStats {
    seen: usize,
    skipped: usize,
}

/// Parses a directory tree into an aggregated snippet stream.
pub struct DirectoryParser {
    registry: GrammarRegistry,
    parser_config: ParserConfig,
    config: DirectoryConfig,
}

impl DirectoryParser {
    /// Validates both configs; invalid configuration is terminal.
    pub fn new(parser_config: ParserConfig, config: DirectoryConfig) -> Result<Self> {
        parser_config.validate()?;
        config.validate()?;
        let registry = GrammarRegistry::new(parser_config.max_cache_size);
        Ok(Self {
            registry,
            parser_config,
            config,
        })
    }

    /// Full (non-incremental) parse of the tree under `root`.
    pub fn parse_directory(&self, root: &Path) -> Result<DirectoryParseResult> {
        self.parse_directory_with_cancel(root, &CancelToken::new())
    }

    /// Full parse with an external cancellation signal.
    ///
    /// Workers check the token between files; a cancelled run returns the
    /// partial result accumulated so far with a marker in the error map.
    #[tracing::instrument(level = "info", skip_all, fields(root = %root.display()))]
    pub fn parse_directory_with_cancel(
        &self,
        root: &Path,
        cancel: &CancelToken,
    ) -> Result<DirectoryParseResult> {
        let started = Instant::now();
        let root_abs = self.checked_root(root)?;
        let (tasks, stats, tree) = self.enumerate(&root_abs)?;
        info!(files = tasks.len(), seen = stats.seen, "walk complete");

        let mut result = self.run(&root_abs, tasks, stats, cancel);
        result.directory_tree = tree;
        result.elapsed_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Incremental parse against the `(repository_id, prior_version_id)`
    /// snapshot; persists the new snapshot under `version_id` on success.
    ///
    /// Only `added ∪ modified` paths are dispatched. Unchanged paths are
    /// reported by name (their snippets live with the snippet store), and
    /// deleted paths are emitted as tombstones.
    #[tracing::instrument(level = "info", skip_all, fields(root = %root.display(), version = version_id))]
    pub fn parse_directory_incremental(
        &self,
        root: &Path,
        store: &SnapshotStore,
        repository_id: &str,
        version_id: &str,
        prior_version_id: Option<&str>,
    ) -> Result<DirectoryParseResult> {
        let started = Instant::now();
        let cancel = CancelToken::new();
        let root_abs = self.checked_root(root)?;
        let (tasks, mut stats, tree) = self.enumerate(&root_abs)?;

        let prior = match prior_version_id {
            Some(v) => store.load(repository_id, v)?,
            None => None,
        };
        let prior = prior.unwrap_or_else(|| Snapshot::new(repository_id, "empty", BTreeMap::new()));

        // Hash every surviving file; read, hash, drop — bytes are not retained.
        let mut current = BTreeMap::<String, String>::new();
        let mut hash_errors = BTreeMap::<String, String>::new();
        for task in &tasks {
            match fs::read(&task.abs_path) {
                Ok(bytes) => {
                    current.insert(task.rel_path.clone(), content_hash_bytes(&bytes));
                }
                Err(err) => {
                    hash_errors.insert(task.rel_path.clone(), Error::Io(err).to_string());
                }
            }
        }

        let plan = snapshot_store::diff(&prior, &current);
        info!(
            added = plan.added.len(),
            modified = plan.modified.len(),
            deleted = plan.deleted.len(),
            unchanged = plan.unchanged.len(),
            "update plan computed"
        );

        let dirty = plan.dirty();
        let dirty_tasks: Vec<FileTask> = tasks
            .into_iter()
            .filter(|t| dirty.contains(&t.rel_path))
            .collect();
        stats.skipped += plan.unchanged.len();

        let mut result = self.run(&root_abs, dirty_tasks, stats, &cancel);
        result.directory_tree = tree;
        result.deleted = plan.deleted.iter().cloned().collect();
        result.unchanged = plan.unchanged.iter().cloned().collect();
        result.errors.extend(hash_errors);

        store.save(&Snapshot::new(repository_id, version_id, current))?;

        result.elapsed_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    fn checked_root(&self, root: &Path) -> Result<PathBuf> {
        let root_abs = dunce::canonicalize(root)
            .map_err(|e| Error::WalkFailure(format!("{}: {e}", root.display())))?;
        if !root_abs.is_dir() {
            return Err(Error::WalkFailure(format!(
                "not a directory: {}",
                root_abs.display()
            )));
        }
        Ok(root_abs)
    }

    /// Dispatch tasks to the worker pool and aggregate outcomes.
    fn run(
        &self,
        root: &Path,
        tasks: Vec<FileTask>,
        stats: WalkStats,
        cancel: &CancelToken,
    ) -> DirectoryParseResult {
        let mut result = DirectoryParseResult::new(&paths::to_unix_sep(root.to_string_lossy()));
        result.total_files_seen = stats.seen;
        result.skipped_files = stats.skipped;

        let dispatched = tasks.len();
        let workers = self.config.effective_workers();
        debug!(dispatched, workers, "dispatching files");
        let outcomes = pool::run_tasks(tasks, workers, cancel, |task| self.process_file(task));

        // Tasks dropped by cancellation are neither processed nor errored.
        result.skipped_files += dispatched - outcomes.len();

        for outcome in outcomes {
            if outcome.skipped {
                result.skipped_files += 1;
            } else {
                result.processed_files += 1;
            }
            if let Some(err) = outcome.error {
                result.errors.insert(outcome.rel_path.clone(), err);
            }
            if let Some(lang) = outcome.language {
                if outcome.snippets.iter().any(Snippet::is_code) {
                    *result
                        .per_language_counts
                        .entry(lang.to_string())
                        .or_default() += 1;
                }
            }
            result.snippets.extend(outcome.snippets);
        }

        if cancel.is_cancelled() {
            result
                .errors
                .insert(WALK_ERROR_KEY.to_string(), Error::Cancelled.to_string());
        }

        result
            .snippets
            .sort_by(|a, b| (&a.path, a.line_start, a.line_end).cmp(&(&b.path, b.line_start, b.line_end)));
        result
    }

    /// Walk the tree and build the task list.
    ///
    /// Ignored directories are pruned before they are opened. File-level
    /// filters (globs, extension whitelist, binary policy, text toggles)
    /// mark files as skipped without reading them.
    fn enumerate(&self, root: &Path) -> Result<(Vec<FileTask>, WalkStats, Option<DirectoryTree>)> {
        let ignore = build_globset(&self.config.ignore_patterns);
        let only: Vec<String> = self
            .config
            .only_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();

        let mut tasks = Vec::<FileTask>::new();
        let mut stats = WalkStats::default();
        let mut capped = 0usize;

        let walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(self.config.max_depth)
            .sort_by(|a, b| {
                (a.file_type().is_file(), a.file_name().to_owned())
                    .cmp(&(b.file_type().is_file(), b.file_name().to_owned()))
            })
            .into_iter()
            .filter_entry(|e| keep_entry(e, ignore.as_ref()));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    // Loops (when following symlinks) and unreadable entries
                    // are isolated, not terminal.
                    warn!(error = %err, "walk entry failed");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            stats.seen += 1;

            if tasks.len() >= self.config.max_files {
                capped += 1;
                continue;
            }

            let rel = paths::repo_rel(root, entry.path());
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(set) = ignore.as_ref() {
                if set.is_match(&name) || set.is_match(&rel) {
                    debug!(path = %rel, "ignored by glob");
                    stats.skipped += 1;
                    continue;
                }
            }

            let ext = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            if !only.is_empty() && !only.contains(&ext) {
                stats.skipped += 1;
                continue;
            }

            let route = if binary::is_binary_extension(&ext) {
                Route::Binary
            } else if let Some(lang) = Language::from_extension(&ext) {
                Route::Code(lang)
            } else {
                Route::Text(binary::text_kind(&ext))
            };

            let keep = match route {
                Route::Binary => self.config.record_binary_files,
                Route::Text(SnippetKind::Documentation) => self.config.extract_documentation,
                Route::Text(SnippetKind::ConfigFile) => self.config.extract_config_files,
                Route::Text(_) => self.config.extract_text_files,
                Route::Code(_) => true,
            };
            if !keep {
                stats.skipped += 1;
                continue;
            }

            tasks.push(FileTask {
                rel_path: rel,
                abs_path: entry.into_path(),
                route,
            });
        }

        if capped > 0 {
            warn!(
                capped,
                max_files = self.config.max_files,
                "file cap reached, remainder skipped"
            );
            stats.skipped += capped;
        }

        let tree = self.config.include_directory_structure.then(|| {
            let mut tree = DirectoryTree {
                name: paths::to_unix_sep(root.to_string_lossy()),
                ..Default::default()
            };
            for task in &tasks {
                insert_path(&mut tree, &task.rel_path);
            }
            tree
        });

        Ok((tasks, stats, tree))
    }

    /// Per-file work, executed on a pool worker. Never panics on bad input:
    /// every failure is folded into the outcome.
    fn process_file(&self, task: FileTask) -> FileOutcome {
        let mut outcome = FileOutcome {
            rel_path: task.rel_path.clone(),
            language: None,
            snippets: Vec::new(),
            error: None,
            skipped: false,
        };

        let bytes = match fs::read(&task.abs_path) {
            Ok(b) => b,
            Err(err) => {
                outcome.error = Some(Error::Io(err).to_string());
                return outcome;
            }
        };

        match task.route {
            Route::Binary => {
                outcome.snippets.push(self.binary_stub(&task.rel_path, &bytes));
            }
            Route::Code(lang) => {
                outcome.language = Some(lang);
                let extractor = SnippetExtractor::new(&self.registry, &self.parser_config);
                let parsed = extractor.extract(&task.rel_path, &bytes, lang);
                outcome.snippets = parsed.snippets;
                if !parsed.errors.is_empty() {
                    outcome.error = Some(parsed.errors.join("; "));
                }
            }
            Route::Text(kind) => {
                if bytes.len() as u64 > self.parser_config.max_file_size {
                    outcome.error = Some(
                        Error::FileTooLarge {
                            size: bytes.len() as u64,
                            limit: self.parser_config.max_file_size,
                        }
                        .to_string(),
                    );
                    return outcome;
                }
                // Extension said text, content says otherwise.
                if binary::looks_binary(&bytes) {
                    if self.config.record_binary_files {
                        outcome.snippets.push(self.binary_stub(&task.rel_path, &bytes));
                    } else {
                        outcome.skipped = true;
                    }
                    return outcome;
                }
                match extract::encoding::decode(&bytes, &self.parser_config) {
                    Ok((text, _)) => {
                        outcome.snippets = chunk::chunk_text(
                            &task.rel_path,
                            &text,
                            kind,
                            None,
                            &self.config,
                            &self.parser_config,
                        );
                    }
                    Err(err) => {
                        outcome.error = Some(err.to_string());
                    }
                }
            }
        }

        outcome
    }

    fn binary_stub(&self, rel_path: &str, bytes: &[u8]) -> Snippet {
        let (directory, filename) = split_path(rel_path);
        let ext = filename.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
        let mut metadata = BTreeMap::new();
        metadata.insert("file_size".to_string(), json!(bytes.len()));
        metadata.insert("mime".to_string(), json!(binary::guess_mime(ext)));

        Snippet {
            kind: SnippetKind::BinaryFile,
            path: rel_path.to_string(),
            directory,
            name: filename.clone(),
            filename,
            code: String::new(),
            content_hash: extract::content_hash(""),
            func_name: String::new(),
            args: String::new(),
            class_name: String::new(),
            comment: String::new(),
            line_start: 1,
            line_end: 1,
            language: None,
            keywords: String::new(),
            metadata,
        }
    }
}

/// Coarse directory filter: prune ignored directories before opening them.
fn keep_entry(entry: &DirEntry, ignore: Option<&GlobSet>) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if entry.file_type().is_dir() {
        if let (Some(set), Some(name)) = (ignore, entry.file_name().to_str()) {
            return !set.is_match(name);
        }
    }
    true
}

/// Build a [`GlobSet`] from patterns, skipping invalid or empty ones.
fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        if let Ok(g) = Glob::new(pat) {
            builder.add(g);
        }
    }
    builder.build().ok()
}

fn insert_path(tree: &mut DirectoryTree, rel: &str) {
    let mut parts: Vec<&str> = rel.split('/').collect();
    let file = match parts.pop() {
        Some(f) => f,
        None => return,
    };
    let mut node = tree;
    for part in parts {
        if node.dirs.iter().all(|d| d.name != part) {
            node.dirs.push(DirectoryTree {
                name: part.to_string(),
                ..Default::default()
            });
        }
        let idx = node
            .dirs
            .iter()
            .position(|d| d.name == part)
            .expect("just inserted");
        node = &mut node.dirs[idx];
    }
    node.files.push(file.to_string());
}
