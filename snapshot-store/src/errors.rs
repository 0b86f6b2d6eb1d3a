use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("unsupported snapshot format version {found} (this build reads up to {supported})")]
    UnsupportedFormat { found: u32, supported: u32 },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
