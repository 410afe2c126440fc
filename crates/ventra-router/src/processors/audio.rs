// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use tracing::debug;

use ventra_core::{ConversationBatch, MessageKind};

use crate::classify::additional_text;
use crate::processor::{ProcessOutcome, ProcessorContext, TypeProcessor};

/// Prefix marking a transcription in the AI-ready text.
pub const TRANSCRIPTION_PREFIX: &str = "[audio transcrito]: ";

/// Audio batches: transcribe through the AI collaborator.
///
/// Sends the holding acknowledgment first when a sale is pending, since
/// transcription takes long enough for the person to wonder.
pub struct AudioProcessor;

#[async_trait]
impl TypeProcessor for AudioProcessor {
    fn kind(&self) -> MessageKind {
        MessageKind::Audio
    }

    async fn process(&self, batch: &ConversationBatch, ctx: &ProcessorContext) -> ProcessOutcome {
        let key = batch.key();
        if ctx.current_sale(key).await.is_some() {
            ctx.send_holding(key).await;
        } else {
            debug!(%key, "no pending sale, holding message suppressed");
        }

        let mut transcriptions = Vec::new();
        for msg in batch.of_kind(MessageKind::Audio) {
            let Some(source) = msg.media_reference() else {
                debug!(message_id = %msg.id, "audio without media reference, skipped");
                continue;
            };
            match ctx.ai.transcribe_audio(&source, &ctx.bot).await {
                Ok(text) => transcriptions.push(text),
                Err(e) => return ctx.ai_error(&e),
            }
        }

        if transcriptions.is_empty() {
            return ProcessOutcome::failed("audio batch carried no fetchable audio");
        }

        let mut ai_text = format!("{TRANSCRIPTION_PREFIX}{}", transcriptions.join("\n"));
        if let Some(extra) = additional_text(batch) {
            ai_text.push('\n');
            ai_text.push_str(&extra);
        }
        ProcessOutcome::Interpreted {
            kind: MessageKind::Audio,
            ai_text,
        }
    }
}
