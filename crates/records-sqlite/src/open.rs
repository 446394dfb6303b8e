use crate::error::StorageExt;
use authconv_core::Result;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbOptions {
    pub busy_timeout_ms: u64,
}

impl Default for DbOptions {
    fn default() -> Self {
        DbOptions { busy_timeout_ms: 5_000 }
    }
}

/// Destination database, opened read-write and created if absent.
pub struct Db {
    pub conn: Connection,
}

impl Db {
    pub fn open_or_create(path: impl AsRef<Path>, opts: &DbOptions) -> Result<Self> {
        let conn = Connection::open(path).storage()?;
        apply_pragmas(&conn, opts)?;
        Ok(Db { conn })
    }

    /// Opens an existing destination for inspection; never creates the file.
    pub fn open_read_only(path: impl AsRef<Path>, opts: &DbOptions) -> Result<Self> {
        let conn = Connection::open_with_flags(path, read_only_flags()).storage()?;
        conn.busy_timeout(Duration::from_millis(opts.busy_timeout_ms)).storage()?;
        Ok(Db { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().storage()?;
        apply_pragmas(&conn, &DbOptions::default())?;
        Ok(Db { conn })
    }
}

/// Legacy database. Opened read-only so the legacy file is never written.
pub struct SourceDb {
    pub conn: Connection,
}

impl SourceDb {
    pub fn open(path: impl AsRef<Path>, opts: &DbOptions) -> Result<Self> {
        let conn = Connection::open_with_flags(path, read_only_flags()).storage()?;
        conn.busy_timeout(Duration::from_millis(opts.busy_timeout_ms)).storage()?;
        Ok(SourceDb { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        SourceDb { conn }
    }
}

fn read_only_flags() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI
}

fn apply_pragmas(conn: &Connection, opts: &DbOptions) -> Result<()> {
    // journal_mode stays at the default so the file remains a plain rollback-journal database
    conn.pragma_update(None, "foreign_keys", "ON").storage()?;
    conn.pragma_update(None, "synchronous", "NORMAL").storage()?;
    conn.busy_timeout(Duration::from_millis(opts.busy_timeout_ms)).storage()?;
    Ok(())
}
