// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use ventra_core::{ConversationBatch, MessageKind};

use crate::processor::{ProcessOutcome, ProcessorContext, TypeProcessor};

/// Plain text batches: the concatenated bodies are the interpretation.
pub struct TextProcessor;

#[async_trait]
impl TypeProcessor for TextProcessor {
    fn kind(&self) -> MessageKind {
        MessageKind::Text
    }

    async fn process(&self, batch: &ConversationBatch, _ctx: &ProcessorContext) -> ProcessOutcome {
        let texts = batch.texts();
        if texts.is_empty() {
            return ProcessOutcome::failed("text batch carried no text bodies");
        }
        ProcessOutcome::Interpreted {
            kind: MessageKind::Text,
            ai_text: texts.join("\n"),
        }
    }
}
