// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business/AI decision layer seam.
//!
//! The decision layer is an external collaborator: it receives the
//! AI-ready text a processor produced plus the conversation log, and
//! answers with a reply and the business actions to dispatch. Only the
//! contract lives here.

use async_trait::async_trait;

use crate::error::VentraError;
use crate::types::{BotProfile, ChatTurn, ConversationKey};

/// What the decision layer wants done for one processed turn.
#[derive(Debug, Clone, Default)]
pub struct Decision {
    /// Outbound reply text, when any.
    pub reply: Option<String>,
    /// Names of business actions to dispatch, in order.
    pub actions: Vec<String>,
    /// Metadata forwarded verbatim into the action context.
    pub metadata: serde_json::Value,
}

/// The external AI/business layer that turns an interpreted message into
/// a reply and a set of action names.
#[async_trait]
pub trait DecisionEngine: Send + Sync + 'static {
    async fn decide(
        &self,
        key: &ConversationKey,
        bot: &BotProfile,
        ai_text: &str,
        history: &[ChatTurn],
    ) -> Result<Decision, VentraError>;
}
