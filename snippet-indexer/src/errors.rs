use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too large: {size} bytes exceeds limit of {limit}")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("encoding unresolved: {0}")]
    EncodingUnresolved(String),

    #[error("language unavailable: no grammar for {0}")]
    LanguageUnavailable(&'static str),

    #[error("syntax error: grammar produced no usable parse tree")]
    ParseSyntax,

    #[error("parse timeout: file exceeded deadline of {0} ms")]
    ParseTimeout(u64),

    #[error("walk failure: {0}")]
    WalkFailure(String),

    #[error("cancelled")]
    Cancelled,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] snapshot_store::SnapshotError),

    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
