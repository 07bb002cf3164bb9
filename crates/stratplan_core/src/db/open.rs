//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open planning database files read-only and verify their schema version.
//! - Build fully migrated in-memory databases for fixtures.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - File connections reject writes at the SQLite level.

use super::migrations::{apply_migrations, ensure_latest_version};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens an existing, already provisioned planning database for reading.
///
/// # Errors
/// - `DbError::MissingDatabase` when `path` does not exist.
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer
///   schema than this binary knows.
/// - `DbError::SchemaMismatch` when the file is behind the known schema.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    if !path.exists() {
        error!(
            "event=db_open module=db status=error mode=file duration_ms={} error_code=db_missing",
            started_at.elapsed().as_millis()
        );
        return Err(DbError::MissingDatabase(path.to_path_buf()));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags).map_err(|err| {
        error!(
            "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
            started_at.elapsed().as_millis(),
            err
        );
        DbError::from(err)
    })?;

    finish_open(conn, "file", started_at, |conn| ensure_latest_version(conn))
}

/// Opens an in-memory SQLite database with the full planning schema.
///
/// Used by tests and tooling that seed their own fixture rows.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let conn = Connection::open_in_memory().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_open_failed error={}",
            started_at.elapsed().as_millis(),
            err
        );
        DbError::from(err)
    })?;

    finish_open(conn, "memory", started_at, apply_migrations)
}

fn finish_open(
    mut conn: Connection,
    mode: &str,
    started_at: Instant,
    prepare_schema: impl FnOnce(&mut Connection) -> DbResult<()>,
) -> DbResult<Connection> {
    let outcome = configure_connection(&conn).and_then(|()| prepare_schema(&mut conn));
    match outcome {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                error_code(&err),
                err
            );
            Err(err)
        }
    }
}

fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

fn error_code(err: &DbError) -> &'static str {
    match err {
        DbError::UnsupportedSchemaVersion { .. } | DbError::SchemaMismatch { .. } => {
            "db_schema_version"
        }
        _ => "db_bootstrap_failed",
    }
}
