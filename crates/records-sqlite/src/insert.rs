use crate::error::StorageExt;
use crate::{ExtraPayload, NewAuthorizedRecord, RecordId};
use authconv_core::Result;
use rusqlite::{params, Connection};

const INSERT_AUTHORIZED_RECORD: &str =
    "INSERT INTO authorized_records(uid,discord_uid,access_token,refresh_token,expires,updated_at) VALUES (?,?,?,?,?,?)";
const INSERT_RECORD_EXTRA: &str = "INSERT INTO records_extra(record_id,json) VALUES (?,?)";

/// Inserts one record and returns the id the engine assigned to it.
pub fn insert_authorized_record(conn: &Connection, rec: &NewAuthorizedRecord) -> Result<RecordId> {
    conn.execute(
        INSERT_AUTHORIZED_RECORD,
        params![rec.uid, rec.discord_uid, rec.access_token, rec.refresh_token, rec.expires, rec.updated_at],
    )
    .storage()?;
    let id: RecordId = conn
        .query_row("SELECT id FROM authorized_records WHERE uid=?", [&rec.uid], |r| r.get(0))
        .storage()?;
    Ok(id)
}

pub fn insert_record_extra(conn: &Connection, record_id: RecordId, payload: &ExtraPayload) -> Result<RecordId> {
    let json = payload.encode()?;
    conn.execute(INSERT_RECORD_EXTRA, params![record_id, json]).storage()?;
    let id: RecordId = conn
        .query_row("SELECT id FROM records_extra WHERE record_id=?", [record_id], |r| r.get(0))
        .storage()?;
    Ok(id)
}
