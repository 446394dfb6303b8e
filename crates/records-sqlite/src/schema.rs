pub const AUTHORIZED_RECORDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS authorized_records (
  id              INTEGER PRIMARY KEY AUTOINCREMENT,
  uid             TEXT NOT NULL UNIQUE,
  discord_uid     TEXT NOT NULL UNIQUE,
  access_token    TEXT NOT NULL,
  refresh_token   TEXT NOT NULL,
  expires         INTEGER NOT NULL,
  updated_at      DATETIME DEFAULT CURRENT_TIMESTAMP
);
"#;

pub const RECORDS_EXTRA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS records_extra (
  id              INTEGER PRIMARY KEY AUTOINCREMENT,
  record_id       INTEGER NOT NULL UNIQUE,
  json            TEXT NOT NULL,
  FOREIGN KEY (record_id) REFERENCES authorized_records(id) ON DELETE CASCADE
);
"#;

// Lookup indexes the token daemon also creates on startup.
pub const AUTHORIZED_RECORDS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_uid ON authorized_records (uid);
CREATE INDEX IF NOT EXISTS idx_duid ON authorized_records (discord_uid);
"#;

pub const PROVISION: &[&str] = &[AUTHORIZED_RECORDS_TABLE, RECORDS_EXTRA_TABLE, AUTHORIZED_RECORDS_INDEXES];

/// Destination tables written by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    AuthorizedRecords,
    RecordsExtra,
}

impl Table {
    pub const ALL: [Table; 2] = [Table::AuthorizedRecords, Table::RecordsExtra];

    pub fn name(self) -> &'static str {
        match self {
            Table::AuthorizedRecords => "authorized_records",
            Table::RecordsExtra => "records_extra",
        }
    }
}
