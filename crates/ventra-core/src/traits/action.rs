// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business action handler trait and dispatch context.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::VentraError;
use crate::types::BotProfile;

/// Context passed verbatim to every action handler.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// The bot on whose behalf the action runs.
    pub bot: BotProfile,
    /// Phone-normalized number of the person in the conversation.
    pub person: String,
    /// The processed turn text that led to this action.
    pub message: String,
    /// Conversation data the decision layer attached (current sale, etc.).
    pub chat_data: serde_json::Value,
    /// Free-form metadata from the decision layer.
    pub metadata: serde_json::Value,
}

/// A named business action (create-sale, deliver-product, cancel-sale...).
///
/// Handler instances are constructed lazily, cached for the process
/// lifetime, and shared across dispatches; they must be stateless or
/// externalize their state.
#[async_trait]
pub trait ActionHandler: Send + Sync + 'static {
    /// Execute the action. The returned value is handed back to the
    /// decision layer; it is never interpreted by the dispatcher.
    async fn handle(&self, ctx: &ActionContext) -> Result<serde_json::Value, VentraError>;
}

/// Factory producing a handler instance on first dispatch.
pub type HandlerFactory = Arc<dyn Fn() -> Arc<dyn ActionHandler> + Send + Sync>;
