// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in sale lifecycle handlers.
//!
//! Each handler appends the corresponding sale event to the conversation
//! log; sale state is never stored anywhere else. Delivery additionally
//! sends the product through the outbound dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use ventra_core::state::{self, CurrentSale};
use ventra_core::traits::action::{ActionContext, HandlerFactory};
use ventra_core::{ActionHandler, ChatLogStore, ChatTurn, ConversationKey, VentraError};
use ventra_outbound::OutboundDispatcher;

fn conversation_key(ctx: &ActionContext) -> ConversationKey {
    ConversationKey::new(ctx.person.clone(), ctx.bot.id.clone())
}

async fn pending_sale(
    chatlog: &Arc<dyn ChatLogStore>,
    key: &ConversationKey,
) -> Result<Option<CurrentSale>, VentraError> {
    let turns = chatlog.read_all(key).await?;
    Ok(state::current_sale(&turns))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Starts a new sale for the conversation.
///
/// A sale already in flight is reused rather than shadowed; stacking
/// `start_sale` events would corrupt the backward-scan derivation.
pub struct CreateSaleHandler {
    chatlog: Arc<dyn ChatLogStore>,
}

#[async_trait]
impl ActionHandler for CreateSaleHandler {
    async fn handle(&self, ctx: &ActionContext) -> Result<Value, VentraError> {
        let key = conversation_key(ctx);
        if let Some(existing) = pending_sale(&self.chatlog, &key).await? {
            warn!(%key, sale_id = %existing.sale_id, "sale already pending, reusing");
            return Ok(serde_json::json!({ "sale_id": existing.sale_id, "created": false }));
        }
        let sale_id = Uuid::new_v4().to_string();
        self.chatlog
            .append(&key, ChatTurn::sale_event("start_sale", &sale_id, now()))
            .await?;
        info!(%key, %sale_id, "sale started");
        Ok(serde_json::json!({ "sale_id": sale_id, "created": true }))
    }
}

/// Marks the pending sale as awaiting payment confirmation.
pub struct AwaitConfirmationHandler {
    chatlog: Arc<dyn ChatLogStore>,
}

#[async_trait]
impl ActionHandler for AwaitConfirmationHandler {
    async fn handle(&self, ctx: &ActionContext) -> Result<Value, VentraError> {
        let key = conversation_key(ctx);
        let Some(sale) = pending_sale(&self.chatlog, &key).await? else {
            return Err(VentraError::Internal(
                "no pending sale to await confirmation for".into(),
            ));
        };
        self.chatlog
            .append(
                &key,
                ChatTurn::sale_event("awaiting_confirmation", &sale.sale_id, now()),
            )
            .await?;
        Ok(serde_json::json!({ "sale_id": sale.sale_id, "awaiting": true }))
    }
}

/// Confirms the pending sale and sends the product to the person.
///
/// The product text/link comes from the decision layer's metadata
/// (`product_message`, optional `product_url`).
pub struct DeliverProductHandler {
    chatlog: Arc<dyn ChatLogStore>,
    outbound: Arc<OutboundDispatcher>,
}

#[async_trait]
impl ActionHandler for DeliverProductHandler {
    async fn handle(&self, ctx: &ActionContext) -> Result<Value, VentraError> {
        let key = conversation_key(ctx);
        let Some(sale) = pending_sale(&self.chatlog, &key).await? else {
            return Err(VentraError::Internal("no pending sale to deliver".into()));
        };

        let message = ctx
            .metadata
            .get("product_message")
            .and_then(Value::as_str)
            .unwrap_or("Aqui tienes tu producto. Gracias por tu compra!");
        let media_url = ctx.metadata.get("product_url").and_then(Value::as_str);

        let report = self.outbound.send(&ctx.person, message, media_url).await;
        if !report.success {
            return Err(VentraError::AllProvidersFailed {
                last_error: report.error.unwrap_or_else(|| "delivery failed".into()),
            });
        }

        self.chatlog
            .append(&key, ChatTurn::bot(message, now()))
            .await?;
        self.chatlog
            .append(
                &key,
                ChatTurn::sale_event("sale_confirmed", &sale.sale_id, now()),
            )
            .await?;
        info!(%key, sale_id = %sale.sale_id, provider = ?report.provider, "product delivered");
        Ok(serde_json::json!({
            "sale_id": sale.sale_id,
            "delivered": true,
            "provider": report.provider,
            "used_fallback": report.used_fallback,
        }))
    }
}

/// Cancels the pending sale, if any.
pub struct CancelSaleHandler {
    chatlog: Arc<dyn ChatLogStore>,
}

#[async_trait]
impl ActionHandler for CancelSaleHandler {
    async fn handle(&self, ctx: &ActionContext) -> Result<Value, VentraError> {
        let key = conversation_key(ctx);
        let Some(sale) = pending_sale(&self.chatlog, &key).await? else {
            warn!(%key, "cancel requested with no pending sale");
            return Ok(serde_json::json!({ "cancelled": false }));
        };
        self.chatlog
            .append(&key, ChatTurn::sale_event("cancelled", &sale.sale_id, now()))
            .await?;
        info!(%key, sale_id = %sale.sale_id, "sale cancelled");
        Ok(serde_json::json!({ "sale_id": sale.sale_id, "cancelled": true }))
    }
}

/// Register the built-in sale lifecycle actions.
pub fn register_builtin(
    registry: &crate::ActionRegistry,
    chatlog: Arc<dyn ChatLogStore>,
    outbound: Arc<OutboundDispatcher>,
) {
    let log = chatlog.clone();
    registry.register(
        "create-sale",
        Arc::new(move || Arc::new(CreateSaleHandler { chatlog: log.clone() }) as Arc<dyn ActionHandler>)
            as HandlerFactory,
    );
    let log = chatlog.clone();
    registry.register(
        "await-confirmation",
        Arc::new(move || {
            Arc::new(AwaitConfirmationHandler { chatlog: log.clone() }) as Arc<dyn ActionHandler>
        })
            as HandlerFactory,
    );
    let log = chatlog.clone();
    let out = outbound.clone();
    registry.register(
        "deliver-product",
        Arc::new(move || {
            Arc::new(DeliverProductHandler {
                chatlog: log.clone(),
                outbound: out.clone(),
            }) as Arc<dyn ActionHandler>
        }) as HandlerFactory,
    );
    registry.register(
        "cancel-sale",
        Arc::new(move || {
            Arc::new(CancelSaleHandler { chatlog: chatlog.clone() }) as Arc<dyn ActionHandler>
        })
            as HandlerFactory,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use ventra_core::{BotProfile, OutboundProvider};
    use ventra_test_utils::{MemoryChatLog, RecordingProvider, SentItem};

    use crate::ActionRegistry;

    struct Harness {
        registry: ActionRegistry,
        chatlog: Arc<MemoryChatLog>,
        provider: Arc<RecordingProvider>,
    }

    fn harness() -> Harness {
        let chatlog = Arc::new(MemoryChatLog::new());
        let provider = Arc::new(RecordingProvider::new("evolution"));
        let outbound = Arc::new(OutboundDispatcher::new(
            vec![provider.clone() as Arc<dyn OutboundProvider>],
            Duration::from_secs(5),
        ));
        let registry = ActionRegistry::new();
        register_builtin(&registry, chatlog.clone() as Arc<dyn ChatLogStore>, outbound);
        Harness {
            registry,
            chatlog,
            provider,
        }
    }

    fn ctx() -> ActionContext {
        ActionContext {
            bot: BotProfile {
                id: "ventra".into(),
                name: "Ventra".into(),
                context: None,
            },
            person: "5215550001111".into(),
            message: "quiero comprar".into(),
            chat_data: Value::Null,
            metadata: serde_json::json!({
                "product_message": "Tu ebook esta listo",
                "product_url": "https://cdn/ebook.pdf"
            }),
        }
    }

    fn key() -> ConversationKey {
        ConversationKey::new("5215550001111", "ventra")
    }

    #[tokio::test]
    async fn full_sale_lifecycle_through_dispatch() {
        let h = harness();
        let created = h.registry.dispatch("create-sale", &ctx()).await.unwrap().unwrap();
        assert_eq!(created["created"], true);
        let sale_id = created["sale_id"].as_str().unwrap().to_string();

        let awaiting = h
            .registry
            .dispatch("await-confirmation", &ctx())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(awaiting["sale_id"].as_str().unwrap(), sale_id);

        let delivered = h
            .registry
            .dispatch("deliver-product", &ctx())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivered["delivered"], true);

        // Product went out with its media link.
        let sent = h.provider.sent_messages();
        assert!(matches!(&sent[0], SentItem::Message { text, media_url, .. }
            if text == "Tu ebook esta listo"
                && media_url.as_deref() == Some("https://cdn/ebook.pdf")));

        // Sale resolved: nothing pending anymore.
        let turns = h.chatlog.turns(&key());
        assert!(state::current_sale(&turns).is_none());
    }

    #[tokio::test]
    async fn create_sale_is_idempotent_while_pending() {
        let h = harness();
        let first = h.registry.dispatch("create-sale", &ctx()).await.unwrap().unwrap();
        let second = h.registry.dispatch("create-sale", &ctx()).await.unwrap().unwrap();
        assert_eq!(second["created"], false);
        assert_eq!(first["sale_id"], second["sale_id"]);
    }

    #[tokio::test]
    async fn cancel_resolves_pending_sale() {
        let h = harness();
        h.registry.dispatch("create-sale", &ctx()).await.unwrap();
        let cancelled = h.registry.dispatch("cancel-sale", &ctx()).await.unwrap().unwrap();
        assert_eq!(cancelled["cancelled"], true);
        let turns = h.chatlog.turns(&key());
        assert!(state::current_sale(&turns).is_none());
    }

    #[tokio::test]
    async fn cancel_without_sale_is_benign() {
        let h = harness();
        let outcome = h.registry.dispatch("cancel-sale", &ctx()).await.unwrap().unwrap();
        assert_eq!(outcome["cancelled"], false);
    }

    #[tokio::test]
    async fn deliver_without_sale_fails() {
        let h = harness();
        let err = h.registry.dispatch("deliver-product", &ctx()).await.unwrap_err();
        assert!(matches!(err, VentraError::ActionFailed { .. }));
    }

    #[tokio::test]
    async fn deliver_with_all_providers_down_fails_and_keeps_sale() {
        let h = harness();
        h.registry.dispatch("create-sale", &ctx()).await.unwrap();
        h.provider.set_failing(true);

        let err = h.registry.dispatch("deliver-product", &ctx()).await.unwrap_err();
        assert!(matches!(err, VentraError::ActionFailed { .. }));

        // Sale still pending, so a retry can deliver later.
        let turns = h.chatlog.turns(&key());
        assert!(state::current_sale(&turns).is_some());
    }
}
