//! Planning schema definition.
//!
//! # Responsibility
//! - Hold the ordered schema steps for the planning hierarchy and payments.
//! - Build the schema on fixture and in-memory connections.
//! - Compare a provisioned database's version against the known schema.
//!
//! # Invariants
//! - Step versions start at 1 and increase strictly.
//! - The last applied step is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "planning_hierarchy",
        sql: include_str!("0001_planning_hierarchy.sql"),
    },
    SchemaStep {
        version: 2,
        name: "payment_transactions",
        sql: include_str!("0002_payment_transactions.sql"),
    },
];

/// Schema version this binary reads.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Steps newer than `current`, in application order.
fn pending(current: u32) -> &'static [SchemaStep] {
    let applied = SCHEMA_STEPS.partition_point(|step| step.version <= current);
    &SCHEMA_STEPS[applied..]
}

/// Builds or upgrades the planning schema on a writable connection.
///
/// Only fixtures and in-memory databases go through this path; analytics
/// never writes to a provisioned planning file.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let steps = pending(from_version);
    let Some(target) = steps.last().map(|step| step.version) else {
        return reject_newer(from_version);
    };

    let tx = conn.transaction()?;
    for step in steps {
        debug!(
            "event=db_migrate_step module=db status=start version={} name={}",
            step.version, step.name
        );
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from_version, target
    );
    Ok(())
}

/// Accepts only a database already at `latest_version()`.
pub fn ensure_latest_version(conn: &Connection) -> DbResult<()> {
    let db_version = current_user_version(conn)?;
    let expected = latest_version();
    if db_version < expected {
        return Err(DbError::SchemaMismatch {
            db_version,
            expected,
        });
    }
    reject_newer(db_version)
}

fn reject_newer(db_version: u32) -> DbResult<()> {
    let latest_supported = latest_version();
    if db_version > latest_supported {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        });
    }
    Ok(())
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
