// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evolution API adapter: webhook normalization and outbound send.
//!
//! Evolution wraps Baileys and posts `messages.upsert` events with the
//! message body nested under `data.message` keyed by its Baileys type
//! (`conversation`, `imageMessage`, `audioMessage`, ...). Ack events
//! arrive as `messages.update` and normalize to `Status`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use ventra_config::model::EvolutionConfig;
use ventra_core::traits::outbound::PresenceKind;
use ventra_core::traits::{OutboundProvider, ProviderNormalizer};
use ventra_core::{CanonicalMessage, MessageKind, Provider, VentraError};

use crate::media::MediaFetcher;
use crate::phone::normalize_number;
use crate::registry::heuristic_majority;

/// Normalizes Evolution API webhooks.
pub struct EvolutionNormalizer {
    fetcher: MediaFetcher,
    /// Needed only to authenticate media downloads; detection and text
    /// normalization work without credentials.
    config: Option<EvolutionConfig>,
}

impl EvolutionNormalizer {
    pub fn new(fetcher: MediaFetcher, config: Option<EvolutionConfig>) -> Self {
        Self { fetcher, config }
    }

    fn classify(data: &Value) -> (MessageKind, Option<&Value>) {
        let message = data.get("message");
        let probe = |key: &str| message.and_then(|m| m.get(key)).filter(|v| !v.is_null());

        if let Some(inner) = probe("documentMessage") {
            (MessageKind::Document, Some(inner))
        } else if let Some(inner) = probe("stickerMessage") {
            (MessageKind::Sticker, Some(inner))
        } else if let Some(inner) = probe("reactionMessage") {
            (MessageKind::Reaction, Some(inner))
        } else if let Some(inner) = probe("videoMessage") {
            (MessageKind::Video, Some(inner))
        } else if let Some(inner) = probe("imageMessage") {
            (MessageKind::Image, Some(inner))
        } else if let Some(inner) = probe("audioMessage") {
            (MessageKind::Audio, Some(inner))
        } else if let Some(inner) = probe("locationMessage") {
            (MessageKind::Location, Some(inner))
        } else if let Some(inner) = probe("contactMessage") {
            (MessageKind::Contact, Some(inner))
        } else {
            (MessageKind::Text, None)
        }
    }

    fn text_body(data: &Value) -> Option<String> {
        let message = data.get("message")?;
        if let Some(text) = message.get("conversation").and_then(Value::as_str) {
            return Some(text.to_string());
        }
        message
            .get("extendedTextMessage")
            .and_then(|m| m.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[async_trait]
impl ProviderNormalizer for EvolutionNormalizer {
    fn provider(&self) -> Provider {
        Provider::Evolution
    }

    fn detect(&self, raw: &Value) -> bool {
        let has_instance = raw.get("instance").is_some_and(Value::is_string);
        let has_event = raw
            .get("event")
            .and_then(Value::as_str)
            .is_some_and(|e| e.contains('.'));
        let has_remote_jid = raw
            .pointer("/data/key/remoteJid")
            .is_some_and(Value::is_string);
        heuristic_majority([has_instance, has_event, has_remote_jid])
    }

    async fn normalize(&self, raw: &Value) -> Result<Option<CanonicalMessage>, VentraError> {
        let event = raw.get("event").and_then(Value::as_str).unwrap_or_default();
        let data = raw.get("data").ok_or_else(|| VentraError::MalformedPayload {
            provider: "evolution".into(),
            message: "missing data object".into(),
        })?;

        let jid = data
            .pointer("/key/remoteJid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = data
            .pointer("/key/id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let timestamp = data
            .get("messageTimestamp")
            .and_then(Value::as_i64)
            .unwrap_or_default();

        // Delivery/read receipts carry no conversational content.
        if event == "messages.update" || event == "send.message" {
            return Ok(Some(CanonicalMessage {
                id,
                provider: Provider::Evolution,
                number: normalize_number(&jid),
                from: jid,
                push_name: None,
                kind: MessageKind::Status,
                text: None,
                caption: None,
                media_url: None,
                media_base64: None,
                mime_type: None,
                timestamp,
            }));
        }

        // The bot's own echoes are not inbound messages.
        if data.pointer("/key/fromMe").and_then(Value::as_bool) == Some(true) {
            debug!(message_id = %id, "skipping own echo");
            return Ok(None);
        }

        let push_name = data
            .get("pushName")
            .and_then(Value::as_str)
            .map(str::to_string);
        let (kind, inner) = Self::classify(data);

        let mut text = Self::text_body(data);
        let mut caption = None;
        let mut media_url = None;
        let mut media_base64 = None;
        let mut mime_type = None;

        if let Some(inner) = inner {
            caption = inner
                .get("caption")
                .and_then(Value::as_str)
                .map(str::to_string);
            mime_type = inner
                .get("mimetype")
                .and_then(Value::as_str)
                .map(str::to_string);
            media_url = inner.get("url").and_then(Value::as_str).map(str::to_string);

            if kind == MessageKind::Reaction {
                text = inner.get("text").and_then(Value::as_str).map(str::to_string);
            }

            if matches!(
                kind,
                MessageKind::Image | MessageKind::Audio | MessageKind::Video | MessageKind::Document
            ) && let Some(ref url) = media_url
            {
                let headers: Vec<(&str, &str)> = match &self.config {
                    Some(cfg) => vec![("apikey", cfg.api_key.as_str())],
                    None => vec![],
                };
                media_base64 = self.fetcher.try_embed(url, &headers).await;
            }
        }

        Ok(Some(CanonicalMessage {
            id,
            provider: Provider::Evolution,
            number: normalize_number(&jid),
            from: jid,
            push_name,
            kind,
            text,
            caption,
            media_url,
            media_base64,
            mime_type,
            timestamp,
        }))
    }
}

/// Outbound send half of the Evolution API.
pub struct EvolutionSender {
    client: reqwest::Client,
    config: EvolutionConfig,
}

impl EvolutionSender {
    pub fn new(client: reqwest::Client, config: EvolutionConfig) -> Self {
        Self { client, config }
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<(), VentraError> {
        let url = format!(
            "{}/{}/{}",
            self.config.server_url.trim_end_matches('/'),
            endpoint,
            self.config.instance
        );
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VentraError::Channel {
                message: format!("evolution request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(VentraError::Channel {
                message: format!("evolution returned {}", response.status()),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OutboundProvider for EvolutionSender {
    fn name(&self) -> &str {
        "evolution"
    }

    async fn send_message(
        &self,
        to: &str,
        text: &str,
        media_url: Option<&str>,
    ) -> Result<(), VentraError> {
        match media_url {
            Some(url) => {
                self.post(
                    "message/sendMedia",
                    serde_json::json!({
                        "number": to,
                        "mediatype": "image",
                        "media": url,
                        "caption": text,
                    }),
                )
                .await
            }
            None => {
                self.post(
                    "message/sendText",
                    serde_json::json!({ "number": to, "text": text }),
                )
                .await
            }
        }
    }

    async fn send_presence(
        &self,
        to: &str,
        kind: PresenceKind,
        delay_ms: u64,
    ) -> Result<(), VentraError> {
        self.post(
            "chat/sendPresence",
            serde_json::json!({
                "number": to,
                "presence": kind.to_string(),
                "delay": delay_ms,
            }),
        )
        .await
    }

    async fn send_archive(
        &self,
        chat_id: &str,
        last_message_id: &str,
        archive: bool,
    ) -> Result<(), VentraError> {
        self.post(
            "chat/archiveChat",
            serde_json::json!({
                "chat": chat_id,
                "lastMessage": { "key": { "id": last_message_id } },
                "archive": archive,
            }),
        )
        .await
    }
}
