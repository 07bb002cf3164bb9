//! SQLite access for the planning analytics core.
//!
//! # Responsibility
//! - Open planning databases for analytics reads.
//! - Own the schema definition used by fixtures and in-memory databases.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A file-backed database is opened read-only and is never created,
//!   migrated or otherwise written by this crate.
//! - A file-backed database must already be at `migrations::latest_version()`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database file does not exist at the configured path.
    MissingDatabase(PathBuf),
    /// Schema was written by a newer release than this binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Schema is older than this binary reads; the database needs to be
    /// provisioned by its owning application first.
    SchemaMismatch { db_version: u32, expected: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::MissingDatabase(path) => {
                write!(f, "planning database not found at `{}`", path.display())
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "planning schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaMismatch {
                db_version,
                expected,
            } => write!(
                f,
                "planning schema version {db_version} does not match expected {expected}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
