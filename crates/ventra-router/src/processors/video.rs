// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use tracing::debug;

use ventra_core::{ConversationBatch, MessageKind};

use crate::classify::additional_text;
use crate::processor::{ProcessOutcome, ProcessorContext, TypeProcessor};

/// Video batches: captions are the only interpretable content; a
/// captionless video is logged and deliberately unanswered.
pub struct VideoProcessor;

#[async_trait]
impl TypeProcessor for VideoProcessor {
    fn kind(&self) -> MessageKind {
        MessageKind::Video
    }

    async fn process(&self, batch: &ConversationBatch, _ctx: &ProcessorContext) -> ProcessOutcome {
        let captions: Vec<&str> = batch
            .of_kind(MessageKind::Video)
            .into_iter()
            .filter_map(|m| m.caption.as_deref())
            .collect();

        if captions.is_empty() && additional_text(batch).is_none() {
            debug!(key = %batch.key(), "captionless video, no response");
            return ProcessOutcome::NoResponse;
        }

        let mut ai_text = if captions.is_empty() {
            "[video]".to_string()
        } else {
            format!("[video]: {}", captions.join("\n"))
        };
        if let Some(extra) = additional_text(batch) {
            ai_text.push('\n');
            ai_text.push_str(&extra);
        }
        ProcessOutcome::Interpreted {
            kind: MessageKind::Video,
            ai_text,
        }
    }
}
