use crate::{ConvertError, Result};
use std::path::{Path, PathBuf};

/// Source and destination database files, checked before any connection is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPaths {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl MigrationPaths {
    pub fn new(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Self> {
        let source = source.as_ref().to_path_buf();
        let destination = destination.as_ref().to_path_buf();
        if !source.exists() {
            return Err(ConvertError::SourceNotFound(source));
        }
        // destination may not exist yet; it is created on open
        if destination.exists() {
            let a = source.canonicalize().map_err(|e| ConvertError::Storage(e.to_string()))?;
            let b = destination.canonicalize().map_err(|e| ConvertError::Storage(e.to_string()))?;
            if a == b {
                return Err(ConvertError::SamePath(source));
            }
        }
        Ok(MigrationPaths { source, destination })
    }
}
