// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline wiring: normalize, buffer, route, decide, act,
//! reply.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use ventra_actions::{ActionRegistry, register_builtin};
use ventra_ai::AiClient;
use ventra_buffer::{BufferSettings, ConversationBuffer};
use ventra_chatlog::SqliteChatLog;
use ventra_config::model::VentraConfig;
use ventra_core::traits::action::ActionContext;
use ventra_core::{
    BotProfile, ChatLogStore, ChatTurn, ConversationBatch, ConversationKey, DecisionEngine,
    MessageKind, VentraError, state,
};
use ventra_outbound::{OutboundDispatcher, ProviderCache};
use ventra_providers::{
    CloudNormalizer, EvolutionNormalizer, MediaFetcher, NormalizerRegistry, WppConnectNormalizer,
};
use ventra_router::{MessageRouter, ProcessOutcome, ProcessorContext};

/// Everything one webhook needs, wired once at startup.
pub struct Pipeline {
    normalizers: NormalizerRegistry,
    buffer: ConversationBuffer,
    router: MessageRouter,
    actions: ActionRegistry,
    chatlog: Arc<dyn ChatLogStore>,
    decision: Arc<dyn DecisionEngine>,
    outbound: Arc<OutboundDispatcher>,
    ctx: ProcessorContext,
    bot: BotProfile,
}

impl Pipeline {
    /// Build the full pipeline from configuration.
    pub async fn build(config: &VentraConfig) -> Result<Arc<Self>, VentraError> {
        let fetcher = MediaFetcher::new();
        let mut normalizers = NormalizerRegistry::new();
        normalizers.register(Arc::new(EvolutionNormalizer::new(
            fetcher.clone(),
            config.providers.evolution.clone(),
        )));
        normalizers.register(Arc::new(WppConnectNormalizer::new(
            fetcher.clone(),
            config.providers.wppconnect.clone(),
        )));
        normalizers.register(Arc::new(CloudNormalizer::new(
            fetcher.clone(),
            config.providers.cloud.clone(),
        )));

        let chatlog: Arc<dyn ChatLogStore> =
            Arc::new(SqliteChatLog::open(&config.storage.database_path).await?);

        let ai = Arc::new(AiClient::new(&config.ai)?);
        let outbound = ProviderCache::new().dispatcher(&config.providers)?;
        info!(providers = ?outbound.provider_names(), "outbound dispatcher ready");

        let actions = ActionRegistry::new();
        register_builtin(&actions, chatlog.clone(), outbound.clone());

        let bot = config.bot.profile();
        let ctx = ProcessorContext {
            chatlog: chatlog.clone(),
            ai: ai.clone(),
            outbound: outbound.clone(),
            bot: bot.clone(),
            holding_message: config.bot.holding_message.clone(),
        };

        let pipeline = Arc::new(Self {
            normalizers,
            buffer: ConversationBuffer::new(BufferSettings::from(&config.buffer)),
            router: MessageRouter::with_defaults(),
            actions,
            chatlog,
            decision: ai,
            outbound,
            ctx,
            bot,
        });
        pipeline.clone().spawn_flush_consumer();
        Ok(pipeline)
    }

    /// Drain batches flushed outside a webhook waiter (stale-record
    /// claims) so the hard ceiling holds across lost waiters.
    fn spawn_flush_consumer(self: Arc<Self>) {
        let Some(mut flushed) = self.buffer.flushed() else {
            return;
        };
        tokio::spawn(async move {
            while let Some(batch) = flushed.recv().await {
                self.process_batch(batch).await;
            }
        });
    }

    /// Normalize a raw webhook and hand the message to the buffer.
    ///
    /// Returns an error only for payloads no adapter claims; everything
    /// downstream is logged-and-continued.
    pub async fn handle_webhook(self: &Arc<Self>, raw: Value) -> Result<(), VentraError> {
        let Some(message) = self.normalizers.normalize(&raw).await? else {
            debug!("webhook carried nothing to process");
            return Ok(());
        };

        if message.kind == MessageKind::Status {
            debug!(message_id = %message.id, "delivery receipt, skipped");
            return Ok(());
        }
        if message.number.is_empty() {
            warn!(message_id = %message.id, "message without sender number, dropped");
            return Ok(());
        }

        let key = ConversationKey::new(message.number.clone(), self.bot.id.clone());
        let pipeline = self.clone();
        // The submit caller is the debounce waiter; detach it so the
        // webhook response does not wait out the window.
        tokio::spawn(async move {
            if let Some(batch) = pipeline.buffer.submit(key, message).await {
                pipeline.process_batch(batch).await;
            }
        });
        Ok(())
    }

    /// Route one flushed batch and carry out the decision.
    pub async fn process_batch(&self, batch: ConversationBatch) {
        let key = batch.key().clone();
        let outcome = self.router.route(&batch, &self.ctx).await;
        let ai_text = match outcome {
            ProcessOutcome::Interpreted { ai_text, .. } => ai_text,
            ProcessOutcome::NoResponse => return,
            ProcessOutcome::Failed { error } => {
                warn!(%key, error, "batch interpretation failed");
                return;
            }
        };

        let history = match self.chatlog.read_all(&key).await {
            Ok(history) => history,
            Err(e) => {
                warn!(%key, error = %e, "log read failed, deciding without history");
                Vec::new()
            }
        };
        let decision = match self
            .decision
            .decide(&key, &self.bot, &ai_text, &history)
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                warn!(%key, error = %e, "decision layer failed, no reply sent");
                return;
            }
        };

        if !decision.actions.is_empty() {
            let action_ctx = ActionContext {
                bot: self.bot.clone(),
                person: key.number.clone(),
                message: ai_text.clone(),
                chat_data: serde_json::json!({
                    "current_sale": state::current_sale(&history),
                    "conversation_started": state::conversation_started(&history),
                }),
                metadata: decision.metadata.clone(),
            };
            let outcomes = self
                .actions
                .dispatch_multiple(&decision.actions, &action_ctx)
                .await;
            for outcome in &outcomes {
                debug!(%key, action = %outcome.name, error = ?outcome.error, "action dispatched");
            }
        }

        if let Some(reply) = decision.reply {
            let report = self.outbound.send(&key.number, &reply, None).await;
            if report.success {
                let turn = ChatTurn::bot(reply, chrono::Utc::now().timestamp());
                if let Err(e) = self.chatlog.append(&key, turn).await {
                    warn!(%key, error = %e, "failed to log reply turn");
                }
            } else {
                warn!(%key, error = ?report.error, "reply delivery failed on all providers");
            }
        }
    }
}
