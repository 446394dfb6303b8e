use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("source database '{}' does not exist", .0.display())]
    SourceNotFound(PathBuf),

    #[error("source and destination refer to the same file '{}'", .0.display())]
    SamePath(PathBuf),

    /// Uniqueness, NOT NULL or foreign key failure reported by the storage engine.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("failed to encode extra data: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ConvertError {
    /// Data-phase failures roll the destination back; path failures never touch it.
    pub fn is_storage(&self) -> bool {
        matches!(self, ConvertError::ConstraintViolation(_) | ConvertError::Storage(_))
    }
}
