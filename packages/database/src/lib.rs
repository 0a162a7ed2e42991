#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `SQLite` storage for road damage reports.
//!
//! All reports live in a single `user_data` table. Uses `switchy_database`
//! with the `rusqlite` backend; every statement is raw SQL via
//! `exec_raw_params()` / `query_raw_params()`. Photos are also written to
//! disk under the images directory (see [`images`]).

pub mod images;
pub mod paths;
pub mod queries;

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database could not be opened.
    #[error("Failed to open database: {message}")]
    Open {
        /// Description of what went wrong.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Opens (or creates) the reports database and ensures the schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or schema creation
/// fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent() {
        paths::ensure_dir(parent)?;
    }

    log::debug!("Opening reports database at {}", path.display());

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Open {
        message: e.to_string(),
    })?;

    ensure_schema(db.as_ref()).await?;

    Ok(db)
}

/// Creates the `user_data` table if it doesn't already exist.
///
/// `datime` defaults to the insert time shifted to UTC+05:30.
///
/// # Errors
///
/// Returns [`DbError`] if the statement fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS user_data (
            slno     INTEGER PRIMARY KEY AUTOINCREMENT,
            email    TEXT NOT NULL,
            ph_no    TEXT NOT NULL,
            address  TEXT,
            lat      REAL,
            long     REAL,
            postcode TEXT,
            city     TEXT,
            state    TEXT,
            country  TEXT,
            img_name TEXT,
            img_blob TEXT,
            breadth  REAL,
            length   REAL,
            height   REAL,
            status   TEXT,
            datime   DATETIME DEFAULT (datetime('now', '+5 hours', '30 minutes'))
        )",
    )
    .await?;

    Ok(())
}
