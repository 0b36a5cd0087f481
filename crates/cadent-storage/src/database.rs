// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional `Connection` instances for writes.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use cadent_core::CadentError;

use crate::migrations;

/// Handle to the SQLite database behind a single async writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, CadentError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CadentError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| CadentError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            migrations::run_migrations(conn)?;
            Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
        })
        .await
        .map_err(|e| CadentError::Storage {
            source: match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => Box::new(std::io::Error::other(other.to_string())),
            },
        })?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Run a closure against the underlying connection on the writer thread.
    pub async fn call<F, T>(&self, f: F) -> Result<T, CadentError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        self.conn
            .call(move |conn| f(conn))
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint the WAL and release the connection.
    pub async fn close(&self) -> Result<(), CadentError> {
        self.call(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
            Ok(())
        })
        .await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err<E>(err: tokio_rusqlite::Error<E>) -> CadentError
where
    E: std::error::Error + Send + Sync + 'static,
{
    CadentError::Storage {
        source: Box::new(err),
    }
}

/// Format a timestamp the way every TEXT column stores it.
pub(crate) fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp back, surfacing malformed rows as conversion
/// failures on the column they came from.
pub(crate) fn parse_ts(idx: usize, value: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid_column(idx, e))
}

pub(crate) fn parse_ts_opt(
    idx: usize,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    value.map(|v| parse_ts(idx, v)).transpose()
}

/// Wrap a column-level decode error (enum parse, JSON parse, timestamp).
pub(crate) fn invalid_column<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}
