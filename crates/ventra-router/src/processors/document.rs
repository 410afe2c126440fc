// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use tracing::info;

use ventra_core::{ConversationBatch, MessageKind};

use crate::processor::{ProcessOutcome, ProcessorContext, TypeProcessor};

/// Document batches are logged for audit and never answered; documents
/// are not part of any purchase flow.
pub struct DocumentProcessor;

#[async_trait]
impl TypeProcessor for DocumentProcessor {
    fn kind(&self) -> MessageKind {
        MessageKind::Document
    }

    async fn process(&self, batch: &ConversationBatch, _ctx: &ProcessorContext) -> ProcessOutcome {
        info!(key = %batch.key(), count = batch.of_kind(MessageKind::Document).len(),
            "document batch logged, no response");
        ProcessOutcome::NoResponse
    }
}
