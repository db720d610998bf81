//! SQLite store utilities.
//!
//! Runtime defaults are intentionally conservative:
//! - `journal_mode = WAL` so report readers never block hour writers
//! - `busy_timeout = 5s` so concurrent writers to the same pair queue up
//!   instead of failing immediately
//! - `foreign_keys = ON` so `works_on` rows can only reference real
//!   employees and projects
//!
//! Every connection also gets [`FOLD_FUNCTION`], a Unicode-aware lowercase
//! used by the name search.

pub mod assign;
pub mod query;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::{Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags, params};
use std::{path::Path, time::Duration};

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQL name of the scalar function that lowercases text with full Unicode
/// rules. SQLite's own `lower()` and `LIKE` only fold ASCII.
pub const FOLD_FUNCTION: &str = "hb_fold";

/// Open (or create) the store, apply runtime pragmas, and make sure the
/// schema exists.
///
/// # Errors
///
/// Returns an error if opening/configuring the database or applying the
/// schema fails.
pub fn open_store(path: &Path, busy_timeout: Duration) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create database directory {}", parent.display()))?;
    }

    let conn =
        Connection::open(path).with_context(|| format!("open database {}", path.display()))?;

    bootstrap(&conn, busy_timeout)
        .with_context(|| format!("prepare database {}", path.display()))?;

    tracing::debug!(path = %path.display(), "store opened");
    Ok(conn)
}

/// Open an existing store without creating it or touching its schema.
///
/// Returns `Ok(None)` when the file is missing, is not a SQLite database,
/// or lacks any of the hourbook tables, so the caller can point the
/// operator at `hb init`.
///
/// # Errors
///
/// Returns an error if the file is an hourbook database but the connection
/// cannot be configured.
pub fn try_open_store(path: &Path, busy_timeout: Duration) -> Result<Option<Connection>> {
    if !path.exists() {
        return Ok(None);
    }

    let conn = match Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    ) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to open database");
            return Ok(None);
        }
    };

    match missing_tables(&conn) {
        Ok(missing) if missing.is_empty() => {}
        Ok(missing) => {
            tracing::warn!(
                path = %path.display(),
                missing = ?missing,
                "not an hourbook database"
            );
            return Ok(None);
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read database");
            return Ok(None);
        }
    }

    configure_connection(&conn, busy_timeout)
        .with_context(|| format!("configure database {}", path.display()))?;

    tracing::debug!(path = %path.display(), "store opened");
    Ok(Some(conn))
}

fn missing_tables(conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
    let mut stmt = conn
        .prepare("SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)")?;
    let mut missing = Vec::new();
    for table in schema::REQUIRED_TABLES {
        let exists: bool = stmt.query_row(params![table], |row| row.get(0))?;
        if !exists {
            missing.push(*table);
        }
    }
    Ok(missing)
}

/// Apply pragmas and schema DDL to an already-open connection.
///
/// Used by [`open_store`] and by tests that work on in-memory databases.
///
/// # Errors
///
/// Returns an error if a pragma or DDL statement fails.
pub fn bootstrap(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    configure_connection(conn, busy_timeout)?;
    conn.execute_batch(schema::SCHEMA_SQL)
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(busy_timeout)?;
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )?;
    Ok(())
}
