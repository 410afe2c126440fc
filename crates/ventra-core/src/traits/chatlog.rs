// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only conversation log contract.

use async_trait::async_trait;

use crate::error::VentraError;
use crate::types::{ChatTurn, ConversationKey};

/// The persisted conversation log, keyed per (number, bot).
///
/// The pipeline requires only append and ordered full read; everything
/// else (current sale, pending confirmation, conversation start) is
/// derived by the pure functions in [`crate::state`].
#[async_trait]
pub trait ChatLogStore: Send + Sync + 'static {
    /// Append one turn to a conversation.
    async fn append(&self, key: &ConversationKey, turn: ChatTurn) -> Result<(), VentraError>;

    /// Read all turns of a conversation in recorded order.
    async fn read_all(&self, key: &ConversationKey) -> Result<Vec<ChatTurn>, VentraError>;
}
