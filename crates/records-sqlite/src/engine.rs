use crate::error::StorageExt;
use crate::schema::PROVISION;
use crate::{
    insert_authorized_record, insert_record_extra, record_id_by_discord_uid, Db, DbOptions, ExtraPayload,
    NewAuthorizedRecord, SourceDb,
};
use authconv_core::{MigrationPaths, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Commit,
    /// Run every phase, then roll back.
    DryRun,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrimaryStats {
    pub read: usize,
    pub inserted: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtraStats {
    pub read: usize,
    pub inserted: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub users_read: usize,
    pub records_inserted: usize,
    pub given_read: usize,
    pub extras_inserted: usize,
    pub extras_unmatched: usize,
    pub dry_run: bool,
    pub started_at: String,
    pub finished_at: String,
}

/// Creates both destination tables and their indexes if absent. Existing tables are not diffed.
pub fn provision_schema(conn: &Connection) -> Result<()> {
    for ddl in PROVISION {
        conn.execute_batch(ddl).storage()?;
    }
    debug!("destination schema provisioned");
    Ok(())
}

/// Copies every legacy user into `authorized_records` with `expires = 0`.
pub fn migrate_primary_records(source: &SourceDb, dest: &Connection, migrated_at: &str) -> Result<PrimaryStats> {
    let users = source.users()?;
    let mut stats = PrimaryStats { read: users.len(), ..Default::default() };
    for user in users {
        let rec = NewAuthorizedRecord::from_legacy(user, migrated_at);
        let id = insert_authorized_record(dest, &rec)?;
        debug!(record_id = id, uid = %rec.uid, "migrated authorized record");
        stats.inserted += 1;
    }
    info!(read = stats.read, inserted = stats.inserted, "primary records migrated");
    Ok(stats)
}

/// Joins legacy `given` rows against records already inserted in this run.
/// Rows without a matching `discord_uid` are skipped.
pub fn migrate_extra_data(source: &SourceDb, dest: &Connection) -> Result<ExtraStats> {
    let given = source.given()?;
    let mut stats = ExtraStats { read: given.len(), ..Default::default() };
    for row in given {
        let Some(record_id) = record_id_by_discord_uid(dest, &row.discord_id)? else {
            debug!(discord_id = %row.discord_id, "no migrated record for given row, skipping");
            stats.unmatched += 1;
            continue;
        };
        insert_record_extra(dest, record_id, &ExtraPayload { loadout_given: row.is_given })?;
        stats.inserted += 1;
    }
    info!(read = stats.read, inserted = stats.inserted, unmatched = stats.unmatched, "extra data migrated");
    Ok(stats)
}

/// Owns both connections for one run; they close when the engine is dropped.
pub struct MigrationEngine {
    source: SourceDb,
    dest: Db,
    paths: MigrationPaths,
}

impl MigrationEngine {
    pub fn open(paths: &MigrationPaths, opts: &DbOptions) -> Result<Self> {
        info!(source = %paths.source.display(), destination = %paths.destination.display(), "opening databases");
        let source = SourceDb::open(&paths.source, opts)?;
        let dest = Db::open_or_create(&paths.destination, opts)?;
        Ok(MigrationEngine { source, dest, paths: paths.clone() })
    }

    pub fn run(mut self, mode: RunMode) -> Result<MigrationReport> {
        let started_at = now_rfc3339();
        // a dry run provisions inside the transaction so the rollback discards the tables too
        if mode == RunMode::Commit {
            provision_schema(&self.dest.conn)?;
        }

        let tx = self.dest.conn.transaction().storage()?;
        let provisioned = match mode {
            RunMode::Commit => Ok(()),
            RunMode::DryRun => provision_schema(&tx),
        };
        // one timestamp for the whole run, in the column default's format
        let outcome = provisioned
            .and_then(|()| tx.query_row("SELECT CURRENT_TIMESTAMP", [], |r| r.get::<_, String>(0)).storage())
            .and_then(|migrated_at| {
                let primary = migrate_primary_records(&self.source, &tx, &migrated_at)?;
                let extra = migrate_extra_data(&self.source, &tx)?;
                Ok((primary, extra))
            });

        let (primary, extra) = match outcome {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "migration failed, rolling back");
                if let Err(rb) = tx.rollback() {
                    error!(error = %rb, "rollback failed");
                }
                return Err(e);
            }
        };

        match mode {
            RunMode::Commit => tx.commit().storage()?,
            RunMode::DryRun => {
                info!("dry run, discarding changes");
                tx.rollback().storage()?
            }
        }

        let report = MigrationReport {
            source: self.paths.source,
            destination: self.paths.destination,
            users_read: primary.read,
            records_inserted: primary.inserted,
            given_read: extra.read,
            extras_inserted: extra.inserted,
            extras_unmatched: extra.unmatched,
            dry_run: mode == RunMode::DryRun,
            started_at,
            finished_at: now_rfc3339(),
        };
        info!(destination = %report.destination.display(), dry_run = report.dry_run, "migration finished");
        Ok(report)
    }
}
