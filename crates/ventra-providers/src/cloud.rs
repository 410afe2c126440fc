// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Meta WhatsApp Cloud API adapter: webhook normalization and outbound send.
//!
//! Cloud webhooks nest messages under `entry[].changes[].value.messages`;
//! delivery receipts arrive in `value.statuses` and normalize to `Status`.
//! Media is referenced by opaque id and needs a two-step fetch: resolve
//! the id to a signed URL via the Graph API, then download with the
//! bearer token.

use async_trait::async_trait;
use serde_json::Value;

use ventra_config::model::CloudConfig;
use ventra_core::traits::outbound::PresenceKind;
use ventra_core::traits::{OutboundProvider, ProviderNormalizer};
use ventra_core::{CanonicalMessage, MessageKind, Provider, VentraError};

use crate::media::MediaFetcher;
use crate::phone::normalize_number;
use crate::registry::heuristic_majority;

/// Normalizes WhatsApp Cloud API webhooks.
pub struct CloudNormalizer {
    fetcher: MediaFetcher,
    config: Option<CloudConfig>,
}

impl CloudNormalizer {
    pub fn new(fetcher: MediaFetcher, config: Option<CloudConfig>) -> Self {
        Self { fetcher, config }
    }

    fn kind_from_type(cloud_type: &str) -> MessageKind {
        match cloud_type {
            "text" => MessageKind::Text,
            "image" => MessageKind::Image,
            "audio" => MessageKind::Audio,
            "video" => MessageKind::Video,
            "document" => MessageKind::Document,
            "sticker" => MessageKind::Sticker,
            "location" => MessageKind::Location,
            "contacts" => MessageKind::Contact,
            "reaction" => MessageKind::Reaction,
            _ => MessageKind::Text,
        }
    }

    /// Resolve a media id to base64 via the Graph API, degrading to `None`.
    async fn embed_media(&self, media_id: &str) -> Option<String> {
        let cfg = self.config.as_ref()?;
        let meta_url = format!("{}/{media_id}", cfg.graph_base.trim_end_matches('/'));
        let auth = format!("Bearer {}", cfg.access_token);

        let meta = self
            .fetcher
            .client()
            .get(&meta_url)
            .header("Authorization", &auth)
            .send()
            .await
            .ok()?
            .json::<Value>()
            .await
            .ok()?;
        let url = meta.get("url")?.as_str()?;

        self.fetcher
            .try_embed(url, &[("Authorization", auth.as_str())])
            .await
    }
}

#[async_trait]
impl ProviderNormalizer for CloudNormalizer {
    fn provider(&self) -> Provider {
        Provider::Cloud
    }

    fn detect(&self, raw: &Value) -> bool {
        let has_object = raw.get("object").and_then(Value::as_str)
            == Some("whatsapp_business_account");
        let has_entry = raw.get("entry").is_some_and(Value::is_array);
        let has_product = raw
            .pointer("/entry/0/changes/0/value/messaging_product")
            .and_then(Value::as_str)
            == Some("whatsapp");
        heuristic_majority([has_object, has_entry, has_product])
    }

    async fn normalize(&self, raw: &Value) -> Result<Option<CanonicalMessage>, VentraError> {
        let value = raw
            .pointer("/entry/0/changes/0/value")
            .ok_or_else(|| VentraError::MalformedPayload {
                provider: "cloud".into(),
                message: "missing entry[0].changes[0].value".into(),
            })?;

        // Delivery/read/failure receipts.
        if let Some(status) = value.pointer("/statuses/0") {
            let recipient = status
                .get("recipient_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Ok(Some(CanonicalMessage {
                id: status
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                provider: Provider::Cloud,
                number: normalize_number(&recipient),
                from: recipient,
                push_name: None,
                kind: MessageKind::Status,
                text: None,
                caption: None,
                media_url: None,
                media_base64: None,
                mime_type: None,
                timestamp: status
                    .get("timestamp")
                    .and_then(Value::as_str)
                    .and_then(|t| t.parse().ok())
                    .unwrap_or_default(),
            }));
        }

        let Some(message) = value.pointer("/messages/0") else {
            // Valid envelope with nothing to process.
            return Ok(None);
        };

        let from = message
            .get("from")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = message
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let timestamp = message
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|t| t.parse().ok())
            .unwrap_or_default();
        let push_name = value
            .pointer("/contacts/0/profile/name")
            .and_then(Value::as_str)
            .map(str::to_string);

        let cloud_type = message.get("type").and_then(Value::as_str).unwrap_or("text");
        let kind = Self::kind_from_type(cloud_type);

        let mut text = None;
        let mut caption = None;
        let mut media_url = None;
        let mut media_base64 = None;
        let mut mime_type = None;

        match kind {
            MessageKind::Text => {
                text = message
                    .pointer("/text/body")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            MessageKind::Reaction => {
                text = message
                    .pointer("/reaction/emoji")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            MessageKind::Location | MessageKind::Contact | MessageKind::Status => {}
            _ => {
                let inner = message.get(cloud_type);
                caption = inner
                    .and_then(|i| i.get("caption"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                mime_type = inner
                    .and_then(|i| i.get("mime_type"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if let Some(media_id) = inner
                    .and_then(|i| i.get("id"))
                    .and_then(Value::as_str)
                {
                    media_base64 = self.embed_media(media_id).await;
                    // Degraded path carries the opaque id for later retry.
                    media_url = Some(format!("cloud-media:{media_id}"));
                }
            }
        }

        Ok(Some(CanonicalMessage {
            id,
            provider: Provider::Cloud,
            number: normalize_number(&from),
            from,
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

/// Outbound send half of the Cloud API.
pub struct CloudSender {
    client: reqwest::Client,
    config: CloudConfig,
}

impl CloudSender {
    pub fn new(client: reqwest::Client, config: CloudConfig) -> Self {
        Self { client, config }
    }

    async fn post_message(&self, body: Value) -> Result<(), VentraError> {
        let url = format!(
            "{}/{}/messages",
            self.config.graph_base.trim_end_matches('/'),
            self.config.phone_number_id
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| VentraError::Channel {
                message: format!("cloud api request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(VentraError::Channel {
                message: format!("cloud api returned {}", response.status()),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OutboundProvider for CloudSender {
    fn name(&self) -> &str {
        "cloud"
    }

    async fn send_message(
        &self,
        to: &str,
        text: &str,
        media_url: Option<&str>,
    ) -> Result<(), VentraError> {
        let body = match media_url {
            Some(url) => serde_json::json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": to,
                "type": "image",
                "image": { "link": url, "caption": text },
            }),
            None => serde_json::json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": to,
                "type": "text",
                "text": { "body": text, "preview_url": false },
            }),
        };
        self.post_message(body).await
    }

    async fn send_presence(
        &self,
        _to: &str,
        _kind: PresenceKind,
        _delay_ms: u64,
    ) -> Result<(), VentraError> {
        // The Cloud API has no presence endpoint.
        Err(VentraError::Channel {
            message: "cloud api does not support presence".into(),
            source: None,
        })
    }

    async fn send_archive(
        &self,
        _chat_id: &str,
        _last_message_id: &str,
        _archive: bool,
    ) -> Result<(), VentraError> {
        Err(VentraError::Channel {
            message: "cloud api does not support chat archiving".into(),
            source: None,
        })
    }
}
