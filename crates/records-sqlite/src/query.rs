use crate::error::StorageExt;
use crate::schema::Table;
use crate::{AuthorizedRecord, Db, RecordExtra, RecordId};
use authconv_core::Result;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

pub fn record_id_by_discord_uid(conn: &Connection, discord_uid: &str) -> Result<Option<RecordId>> {
    conn.query_row("SELECT id FROM authorized_records WHERE discord_uid=?", [discord_uid], |r| r.get(0))
        .optional()
        .storage()
}

pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let cnt: i64 = conn
        .query_row("SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name=?", [name], |r| r.get(0))
        .storage()?;
    Ok(cnt > 0)
}

pub fn count_rows(conn: &Connection, table: Table) -> Result<i64> {
    let sql = format!("SELECT COUNT(1) FROM {}", table.name());
    conn.query_row(&sql, [], |r| r.get(0)).storage()
}

pub fn authorized_records(conn: &Connection) -> Result<Vec<AuthorizedRecord>> {
    let mut stmt = conn
        .prepare("SELECT id,uid,discord_uid,access_token,refresh_token,expires,updated_at FROM authorized_records ORDER BY id")
        .storage()?;
    let rows = stmt
        .query_map([], |r| {
            Ok(AuthorizedRecord {
                id: r.get(0)?,
                uid: r.get(1)?,
                discord_uid: r.get(2)?,
                access_token: r.get(3)?,
                refresh_token: r.get(4)?,
                expires: r.get(5)?,
                updated_at: r.get(6)?,
            })
        })
        .storage()?;
    rows.collect::<rusqlite::Result<Vec<_>>>().storage()
}

pub fn records_extra(conn: &Connection) -> Result<Vec<RecordExtra>> {
    let mut stmt = conn.prepare("SELECT id,record_id,json FROM records_extra ORDER BY id").storage()?;
    let rows = stmt
        .query_map([], |r| Ok(RecordExtra { id: r.get(0)?, record_id: r.get(1)?, json: r.get(2)? }))
        .storage()?;
    rows.collect::<rusqlite::Result<Vec<_>>>().storage()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: &'static str,
    pub present: bool,
    pub rows: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationSummary {
    pub tables: Vec<TableSummary>,
}

impl Db {
    pub fn summary(&self) -> Result<DestinationSummary> {
        let mut tables = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            let present = table_exists(&self.conn, table.name())?;
            let rows = if present { Some(count_rows(&self.conn, table)?) } else { None };
            tables.push(TableSummary { name: table.name(), present, rows });
        }
        Ok(DestinationSummary { tables })
    }
}
