// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management.
//!
//! All access goes through a single [`tokio_rusqlite::Connection`], which
//! serializes writes on one background thread. WAL mode keeps readers from
//! blocking behind the writer.

use std::path::Path;

use parkd_core::ParkdError;
use tokio_rusqlite::Connection;

/// Handle to the parkd SQLite database.
///
/// Cheap to clone; all clones share the same underlying connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode enabled and
    /// all migrations applied.
    pub async fn open(path: &str) -> Result<Self, ParkdError> {
        Self::open_with_options(path, true).await
    }

    /// Open the database, choosing the journal mode explicitly.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, ParkdError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ParkdError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path).await.map_err(|e| ParkdError::Storage {
            source: Box::new(e),
        })?;

        conn.call(move |conn| {
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.pragma_update(None, "journal_mode", journal)?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        let report = conn
            .call(|conn| Ok(crate::migrations::runner().run(conn)))
            .await
            .map_err(map_tr_err)?;
        let report = report.map_err(|e| ParkdError::Storage {
            source: Box::new(e),
        })?;
        tracing::debug!(
            applied = report.applied_migrations().len(),
            "database migrations up to date"
        );

        Ok(Self { conn })
    }

    /// The shared async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the database, flushing the WAL.
    pub async fn close(self) -> Result<(), ParkdError> {
        self.conn
            .call(|conn| {
                conn.pragma_update(None, "wal_checkpoint", "TRUNCATE")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn
            .close()
            .await
            .map_err(|e| ParkdError::Storage {
                source: Box::new(e),
            })
    }
}

/// Map a `tokio_rusqlite` error into the shared error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> ParkdError {
    ParkdError::Storage {
        source: Box::new(e),
    }
}

/// True if the error is a UNIQUE or CHECK constraint violation, which the
/// query layer surfaces as a domain conflict rather than a storage fault.
pub(crate) fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
