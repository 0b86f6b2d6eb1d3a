use std::path::PathBuf;

use anyhow::Result;
use snapshot_store::SnapshotStore;
use snippet_indexer::util::jsonl;
use snippet_indexer::{DirectoryConfig, DirectoryParser, ParserConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load environment variables from .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let root = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let out_path = PathBuf::from(
        args.next()
            .unwrap_or_else(|| "snippets.jsonl".to_string()),
    );

    let parser_config = ParserConfig::load_from_env_or_default()?;
    let directory_config = DirectoryConfig::load_from_env_or_default()?;
    let parser = DirectoryParser::new(parser_config, directory_config)?;

    // With a snapshot directory configured, runs are incremental: only
    // added/modified files are re-parsed and a new snapshot is persisted.
    let result = match std::env::var("SNIPPET_SNAPSHOT_DIR") {
        Ok(dir) => {
            let store = SnapshotStore::open(dir)?;
            let repo = std::env::var("SNIPPET_REPO_ID").unwrap_or_else(|_| "default".to_string());
            let version = std::env::var("SNIPPET_VERSION").unwrap_or_else(|_| "v1".to_string());
            let prior = std::env::var("SNIPPET_PRIOR_VERSION").ok();
            parser.parse_directory_incremental(&root, &store, &repo, &version, prior.as_deref())?
        }
        Err(_) => parser.parse_directory(&root)?,
    };

    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        snippet_indexer::util::ensure_dir(parent)?;
    }
    jsonl::write_snippets(&out_path, &result.snippets)?;

    info!(
        root = %result.root,
        processed = result.processed_files,
        skipped = result.skipped_files,
        snippets = result.snippets.len(),
        deleted = result.deleted.len(),
        unchanged = result.unchanged.len(),
        errors = result.errors.len(),
        elapsed_ms = result.elapsed_ms,
        out = %out_path.display(),
        "indexing complete"
    );
    for (path, error) in &result.errors {
        tracing::warn!(path = %path, error = %error, "file failed");
    }

    Ok(())
}
