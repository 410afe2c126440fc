// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the append-only conversation log.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer
//! concurrency model via `tokio-rusqlite`. The log is the only persisted
//! state in the pipeline; sale state is derived from it on read, never
//! stored.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteChatLog;
