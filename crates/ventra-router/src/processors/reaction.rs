// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use tracing::debug;

use ventra_core::{ConversationBatch, MessageKind};

use crate::processor::{ProcessOutcome, ProcessorContext, TypeProcessor};

/// Emoji reactions are acknowledgments, not messages; logged, never
/// answered.
pub struct ReactionProcessor;

#[async_trait]
impl TypeProcessor for ReactionProcessor {
    fn kind(&self) -> MessageKind {
        MessageKind::Reaction
    }

    async fn process(&self, batch: &ConversationBatch, _ctx: &ProcessorContext) -> ProcessOutcome {
        debug!(key = %batch.key(), "reaction batch, no response");
        ProcessOutcome::NoResponse
    }
}
