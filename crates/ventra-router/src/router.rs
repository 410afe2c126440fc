// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch routing: log first, classify, hand to the matching processor.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use ventra_core::{ConversationBatch, MessageKind};

use crate::classify::classify;
use crate::processor::{ProcessOutcome, ProcessorContext, TypeProcessor};
use crate::processors::{
    AudioProcessor, DocumentProcessor, ImageProcessor, ReactionProcessor, StickerProcessor,
    TextProcessor, VideoProcessor,
};

/// Dispatches flushed batches to type processors.
pub struct MessageRouter {
    processors: HashMap<MessageKind, Arc<dyn TypeProcessor>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Router with the full built-in processor set.
    pub fn with_defaults() -> Self {
        let mut router = Self::new();
        router.register(Arc::new(TextProcessor));
        router.register(Arc::new(AudioProcessor));
        router.register(Arc::new(ImageProcessor));
        router.register(Arc::new(VideoProcessor));
        router.register(Arc::new(DocumentProcessor));
        router.register(Arc::new(StickerProcessor));
        router.register(Arc::new(ReactionProcessor));
        router
    }

    pub fn register(&mut self, processor: Arc<dyn TypeProcessor>) {
        self.processors.insert(processor.kind(), processor);
    }

    /// Log every message of the batch, then process it.
    ///
    /// Person turns land in the log before any interpretation happens,
    /// so the audit trail survives AI failures and processor bugs.
    pub async fn route(&self, batch: &ConversationBatch, ctx: &ProcessorContext) -> ProcessOutcome {
        let key = batch.key();
        for msg in batch.messages() {
            ctx.log_person_turn(key, msg).await;
        }

        let kind = classify(batch);
        debug!(%key, %kind, count = batch.len(), "batch classified");
        match self.processors.get(&kind) {
            Some(processor) => processor.process(batch, ctx).await,
            None => {
                warn!(%kind, "no processor registered, batch ignored");
                ProcessOutcome::NoResponse
            }
        }
    }
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
