use authconv_core::{ConvertError, Result};
use rusqlite::ErrorCode;

pub(crate) fn classify(e: rusqlite::Error) -> ConvertError {
    match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => ConvertError::ConstraintViolation(e.to_string()),
        _ => ConvertError::Storage(e.to_string()),
    }
}

pub(crate) trait StorageExt<T> {
    fn storage(self) -> Result<T>;
}

impl<T> StorageExt<T> for rusqlite::Result<T> {
    fn storage(self) -> Result<T> {
        self.map_err(classify)
    }
}
