//! Layout upgrades for the `kv` table.
//!
//! The layout version lives in `PRAGMA user_version`. A fresh file starts
//! at `0`; every step below runs once, in order, inside one transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(layout version, SQL that produces it)`, ascending.
const LAYOUT_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_kv_store.sql"))];

/// Newest `kv` layout this build can read and write.
pub fn latest_version() -> u32 {
    LAYOUT_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings the `kv` table up to `latest_version`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file is ahead of this build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    let pending: Vec<_> = LAYOUT_STEPS
        .iter()
        .filter(|(version, _)| *version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!("event=kv_upgrade module=db status=ok from={found} to={latest}");
    Ok(())
}

/// Layout version recorded in the open file.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
