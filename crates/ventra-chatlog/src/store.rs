// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ChatLogStore`] backed by the SQLite turns table.

use async_trait::async_trait;

use ventra_core::traits::ChatLogStore;
use ventra_core::{ChatTurn, ConversationKey, VentraError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed conversation log.
#[derive(Clone)]
pub struct SqliteChatLog {
    db: Database,
}

impl SqliteChatLog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database at `path` and wrap it as a chat log.
    pub async fn open(path: &str) -> Result<Self, VentraError> {
        Ok(Self::new(Database::open(path).await?))
    }
}

#[async_trait]
impl ChatLogStore for SqliteChatLog {
    async fn append(&self, key: &ConversationKey, turn: ChatTurn) -> Result<(), VentraError> {
        queries::append_turn(&self.db, key, &turn).await
    }

    async fn read_all(&self, key: &ConversationKey) -> Result<Vec<ChatTurn>, VentraError> {
        queries::read_turns(&self.db, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use ventra_core::state::current_sale;

    #[tokio::test]
    async fn derived_sale_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.db");
        let key = ConversationKey::new("5215550001111", "ventra");

        {
            let log = SqliteChatLog::open(path.to_str().unwrap()).await.unwrap();
            log.append(&key, ChatTurn::bot("hola", 100)).await.unwrap();
            log.append(&key, ChatTurn::sale_event("start_sale", "sale-1", 101))
                .await
                .unwrap();
        }

        let log = SqliteChatLog::open(path.to_str().unwrap()).await.unwrap();
        let turns = log.read_all(&key).await.unwrap();
        let sale = current_sale(&turns).unwrap();
        assert_eq!(sale.sale_id, "sale-1");
        assert!(!sale.awaiting_confirmation);
    }
}
