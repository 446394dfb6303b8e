//! Shared types for the authorization database converter.

mod error;
mod paths;

pub use error::{ConvertError, Result};
pub use paths::MigrationPaths;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }
}
