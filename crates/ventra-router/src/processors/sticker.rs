// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use tracing::debug;

use ventra_core::{ConversationBatch, MessageKind};

use crate::processor::{ProcessOutcome, ProcessorContext, TypeProcessor};

/// Stickers carry no interpretable content; logged, never answered.
pub struct StickerProcessor;

#[async_trait]
impl TypeProcessor for StickerProcessor {
    fn kind(&self) -> MessageKind {
        MessageKind::Sticker
    }

    async fn process(&self, batch: &ConversationBatch, _ctx: &ProcessorContext) -> ProcessOutcome {
        debug!(key = %batch.key(), "sticker batch, no response");
        ProcessOutcome::NoResponse
    }
}
