// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Type processor contract and the shared context handed to processors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use ventra_core::state::{self, CurrentSale};
use ventra_core::traits::outbound::PresenceKind;
use ventra_core::traits::{AiService, ChatLogStore};
use ventra_core::{
    BotProfile, CanonicalMessage, ChatTurn, ConversationBatch, ConversationKey, MessageKind,
    VentraError,
};
use ventra_outbound::OutboundDispatcher;

/// Result of processing one batch.
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// The batch interpreted into AI-ready text for the business layer.
    Interpreted { kind: MessageKind, ai_text: String },
    /// Content was logged and deliberately not answered.
    NoResponse,
    /// Interpretation failed; the inbound content is already logged.
    Failed { error: String },
}

impl ProcessOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn ai_text(&self) -> Option<&str> {
        match self {
            Self::Interpreted { ai_text, .. } => Some(ai_text),
            _ => None,
        }
    }
}

/// Collaborators every processor can reach.
#[derive(Clone)]
pub struct ProcessorContext {
    pub chatlog: Arc<dyn ChatLogStore>,
    pub ai: Arc<dyn AiService>,
    pub outbound: Arc<OutboundDispatcher>,
    pub bot: BotProfile,
    /// Short acknowledgment sent while media is interpreted mid-sale.
    pub holding_message: String,
}

impl ProcessorContext {
    /// Current sale derived from the persisted log, `None` when the log
    /// cannot be read (the caller then behaves as if no sale is pending).
    pub async fn current_sale(&self, key: &ConversationKey) -> Option<CurrentSale> {
        match self.chatlog.read_all(key).await {
            Ok(turns) => state::current_sale(&turns),
            Err(e) => {
                warn!(%key, error = %e, "log read failed, assuming no pending sale");
                None
            }
        }
    }

    /// Send the typing indicator plus the holding acknowledgment.
    /// Callers gate this on a pending sale. Best-effort on every leg.
    pub async fn send_holding(&self, key: &ConversationKey) {
        self.outbound
            .send_presence(&key.number, PresenceKind::Composing, 2_000)
            .await;
        let report = self
            .outbound
            .send(&key.number, &self.holding_message, None)
            .await;
        if report.success {
            let turn = ChatTurn::bot(self.holding_message.clone(), chrono::Utc::now().timestamp());
            if let Err(e) = self.chatlog.append(key, turn).await {
                warn!(%key, error = %e, "failed to log holding message");
            }
        }
    }

    /// Append a person turn, logging failures without propagating them.
    pub async fn log_person_turn(&self, key: &ConversationKey, msg: &CanonicalMessage) {
        let turn = ChatTurn::person(msg, render_inbound(msg));
        if let Err(e) = self.chatlog.append(key, turn).await {
            warn!(%key, message_id = %msg.id, error = %e, "failed to log inbound turn");
        }
    }

    pub fn ai_error(&self, e: &VentraError) -> ProcessOutcome {
        ProcessOutcome::failed(e.to_string())
    }
}

/// Render an inbound message for the conversation log.
pub fn render_inbound(msg: &CanonicalMessage) -> String {
    match msg.kind {
        MessageKind::Text => msg.text.clone().unwrap_or_default(),
        MessageKind::Reaction => format!("[reaccion] {}", msg.text.as_deref().unwrap_or("")),
        MessageKind::Image => match &msg.caption {
            Some(caption) => format!("[imagen] {caption}"),
            None => "[imagen]".to_string(),
        },
        MessageKind::Audio => "[audio]".to_string(),
        MessageKind::Video => match &msg.caption {
            Some(caption) => format!("[video] {caption}"),
            None => "[video]".to_string(),
        },
        MessageKind::Document => "[documento]".to_string(),
        MessageKind::Sticker => "[sticker]".to_string(),
        MessageKind::Location => "[ubicacion]".to_string(),
        MessageKind::Contact => "[contacto]".to_string(),
        MessageKind::Status => "[status]".to_string(),
    }
}

/// One content-type interpreter.
///
/// By the time `process` runs, every message of the batch is already in
/// the conversation log; processors interpret, optionally call the AI
/// collaborator, and never append person turns themselves.
#[async_trait]
pub trait TypeProcessor: Send + Sync + 'static {
    fn kind(&self) -> MessageKind;

    async fn process(&self, batch: &ConversationBatch, ctx: &ProcessorContext) -> ProcessOutcome;
}
