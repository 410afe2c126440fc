// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use tokio_rusqlite::Connection;
use tracing::info;

use ventra_core::VentraError;

use crate::migrations::run_migrations;

/// Handle to the conversation log database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, VentraError> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(tokio_rusqlite::Error::Error(e)))?;
        conn.call(|conn| {
            let map = |e: rusqlite::Error| VentraError::Storage {
                source: Box::new(e),
            };
            conn.pragma_update(None, "journal_mode", "WAL").map_err(map)?;
            conn.pragma_update(None, "synchronous", "NORMAL")
                .map_err(map)?;
            conn.pragma_update(None, "foreign_keys", "ON").map_err(map)?;
            conn.busy_timeout(std::time::Duration::from_secs(5))
                .map_err(map)?;
            run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(e) => e,
            other => VentraError::Storage {
                source: Box::new(other),
            },
        })?;
        info!(path, "conversation log database ready");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub async fn close(self) -> Result<(), VentraError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Convert a tokio-rusqlite error into the crate error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> VentraError {
    VentraError::Storage {
        source: Box::new(e),
    }
}
