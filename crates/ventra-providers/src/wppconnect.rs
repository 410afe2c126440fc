// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WPPConnect server adapter: webhook normalization and outbound send.
//!
//! WPPConnect posts flat `onmessage` events with the content type in
//! `type` (`chat`, `image`, `ptt`, ...) and the sender as a `@c.us` JID.
//! Ack events arrive as `onack` and normalize to `Status`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use ventra_config::model::WppConnectConfig;
use ventra_core::traits::outbound::PresenceKind;
use ventra_core::traits::{OutboundProvider, ProviderNormalizer};
use ventra_core::{CanonicalMessage, MessageKind, Provider, VentraError};

use crate::media::MediaFetcher;
use crate::phone::normalize_number;
use crate::registry::heuristic_majority;

const KNOWN_EVENTS: &[&str] = &["onmessage", "onack", "onpresencechanged", "onselfmessage"];

/// Normalizes WPPConnect webhooks.
pub struct WppConnectNormalizer {
    fetcher: MediaFetcher,
    config: Option<WppConnectConfig>,
}

impl WppConnectNormalizer {
    pub fn new(fetcher: MediaFetcher, config: Option<WppConnectConfig>) -> Self {
        Self { fetcher, config }
    }

    fn kind_from_type(wpp_type: &str) -> MessageKind {
        match wpp_type {
            "chat" => MessageKind::Text,
            "image" => MessageKind::Image,
            "ptt" | "audio" => MessageKind::Audio,
            "video" => MessageKind::Video,
            "document" => MessageKind::Document,
            "sticker" => MessageKind::Sticker,
            "location" => MessageKind::Location,
            "vcard" | "multi_vcard" => MessageKind::Contact,
            "react" | "reaction" => MessageKind::Reaction,
            _ => MessageKind::Text,
        }
    }
}

#[async_trait]
impl ProviderNormalizer for WppConnectNormalizer {
    fn provider(&self) -> Provider {
        Provider::WppConnect
    }

    fn detect(&self, raw: &Value) -> bool {
        let has_session = raw.get("session").is_some_and(Value::is_string);
        let has_known_event = raw
            .get("event")
            .and_then(Value::as_str)
            .is_some_and(|e| KNOWN_EVENTS.contains(&e));
        let has_cus_from = raw
            .get("from")
            .and_then(Value::as_str)
            .is_some_and(|f| f.ends_with("@c.us") || f.ends_with("@g.us"));
        heuristic_majority([has_session, has_known_event, has_cus_from])
    }

    async fn normalize(&self, raw: &Value) -> Result<Option<CanonicalMessage>, VentraError> {
        let event = raw.get("event").and_then(Value::as_str).unwrap_or_default();
        let from = raw
            .get("from")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let timestamp = raw
            .get("timestamp")
            .and_then(Value::as_i64)
            .unwrap_or_default();

        if event == "onack" || event == "onpresencechanged" {
            return Ok(Some(CanonicalMessage {
                id,
                provider: Provider::WppConnect,
                number: normalize_number(&from),
                from,
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

        if raw.get("fromMe").and_then(Value::as_bool) == Some(true) || event == "onselfmessage" {
            debug!(message_id = %id, "skipping own echo");
            return Ok(None);
        }

        let wpp_type = raw.get("type").and_then(Value::as_str).unwrap_or("chat");
        let kind = Self::kind_from_type(wpp_type);

        let push_name = raw
            .pointer("/sender/pushname")
            .and_then(Value::as_str)
            .map(str::to_string);
        let body = raw
            .get("body")
            .and_then(Value::as_str)
            .or_else(|| raw.get("content").and_then(Value::as_str))
            .map(str::to_string);
        let caption = raw
            .get("caption")
            .and_then(Value::as_str)
            .map(str::to_string);
        let mime_type = raw
            .get("mimetype")
            .and_then(Value::as_str)
            .map(str::to_string);
        let media_url = raw
            .get("deprecatedMms3Url")
            .and_then(Value::as_str)
            .map(str::to_string);

        let (text, mut media_base64) = if kind == MessageKind::Text {
            (body, None)
        } else {
            // For media events WPPConnect puts base64 in `body` when the
            // server is configured to download; otherwise only a URL.
            let inline = body.filter(|b| !b.starts_with("http") && b.len() > 128);
            (None, inline)
        };

        if media_base64.is_none()
            && matches!(
                kind,
                MessageKind::Image | MessageKind::Audio | MessageKind::Video | MessageKind::Document
            )
            && let Some(ref url) = media_url
        {
            let headers: Vec<(String, String)> = match &self.config {
                Some(cfg) => vec![("Authorization".into(), format!("Bearer {}", cfg.token))],
                None => vec![],
            };
            let header_refs: Vec<(&str, &str)> = headers
                .iter()
                .map(|(n, v)| (n.as_str(), v.as_str()))
                .collect();
            media_base64 = self.fetcher.try_embed(url, &header_refs).await;
        }

        let text = if kind == MessageKind::Reaction {
            raw.get("body").and_then(Value::as_str).map(str::to_string)
        } else {
            text
        };

        Ok(Some(CanonicalMessage {
            id,
            provider: Provider::WppConnect,
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

/// Outbound send half of a WPPConnect server.
pub struct WppConnectSender {
    client: reqwest::Client,
    config: WppConnectConfig,
}

impl WppConnectSender {
    pub fn new(client: reqwest::Client, config: WppConnectConfig) -> Self {
        Self { client, config }
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<(), VentraError> {
        let url = format!(
            "{}/api/{}/{}",
            self.config.server_url.trim_end_matches('/'),
            self.config.session,
            endpoint
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| VentraError::Channel {
                message: format!("wppconnect request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(VentraError::Channel {
                message: format!("wppconnect returned {}", response.status()),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OutboundProvider for WppConnectSender {
    fn name(&self) -> &str {
        "wppconnect"
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
                    "send-file",
                    serde_json::json!({
                        "phone": to,
                        "path": url,
                        "caption": text,
                    }),
                )
                .await
            }
            None => {
                self.post(
                    "send-message",
                    serde_json::json!({ "phone": to, "message": text }),
                )
                .await
            }
        }
    }

    async fn send_presence(
        &self,
        to: &str,
        kind: PresenceKind,
        _delay_ms: u64,
    ) -> Result<(), VentraError> {
        self.post(
            "typing",
            serde_json::json!({
                "phone": to,
                "value": kind != PresenceKind::Paused,
                "isGroup": false,
            }),
        )
        .await
    }

    async fn send_archive(
        &self,
        chat_id: &str,
        _last_message_id: &str,
        archive: bool,
    ) -> Result<(), VentraError> {
        self.post(
            "archive-chat",
            serde_json::json!({ "phone": chat_id, "value": archive }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn normalizer() -> WppConnectNormalizer {
        WppConnectNormalizer::new(MediaFetcher::new(), None)
    }

    fn onmessage(extra: Value) -> Value {
        let mut base = serde_json::json!({
            "event": "onmessage",
            "session": "shop",
            "id": "false_5215550001111@c.us_3EB0",
            "from": "5215550001111@c.us",
            "to": "5215550002222@c.us",
            "type": "chat",
            "isGroupMsg": false,
            "sender": {"pushname": "Ana"},
            "timestamp": 1_700_000_000
        });
        base.as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        base
    }

    #[test]
    fn detects_full_payload() {
        let n = normalizer();
        assert!(n.detect(&onmessage(serde_json::json!({"body": "hola"}))));
    }

    #[test]
    fn detects_without_session() {
        let n = normalizer();
        let raw = serde_json::json!({
            "event": "onmessage",
            "from": "5215550001111@c.us",
        });
        assert!(n.detect(&raw));
    }

    #[test]
    fn does_not_claim_evolution_payload() {
        let n = normalizer();
        let raw = serde_json::json!({
            "event": "messages.upsert",
            "instance": "shop",
            "data": {"key": {"remoteJid": "x@s.whatsapp.net"}}
        });
        assert!(!n.detect(&raw));
    }

    #[tokio::test]
    async fn normalizes_text_message() {
        let n = normalizer();
        let msg = n
            .normalize(&onmessage(serde_json::json!({"body": "hola"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
        assert_eq!(msg.text.as_deref(), Some("hola"));
        assert_eq!(msg.number, "5215550001111");
        assert_eq!(msg.push_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn normalizes_ptt_as_audio() {
        let n = normalizer();
        let msg = n
            .normalize(&onmessage(serde_json::json!({
                "type": "ptt",
                "mimetype": "audio/ogg; codecs=opus",
                "deprecatedMms3Url": "http://127.0.0.1:1/media"
            })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg.kind, MessageKind::Audio);
        assert_eq!(msg.mime_type.as_deref(), Some("audio/ogg; codecs=opus"));
        // Degraded: fetch failed, URL reference survives.
        assert!(msg.media_base64.is_none());
        assert!(msg.media_url.is_some());
    }

    #[tokio::test]
    async fn inline_base64_body_is_kept() {
        let n = normalizer();
        let inline = "A".repeat(256);
        let msg = n
            .normalize(&onmessage(serde_json::json!({
                "type": "image",
                "body": inline,
                "mimetype": "image/jpeg"
            })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg.media_base64.as_deref(), Some(inline.as_str()));
    }

    #[tokio::test]
    async fn onack_is_status() {
        let n = normalizer();
        let raw = serde_json::json!({
            "event": "onack",
            "session": "shop",
            "id": "3EB0",
            "from": "5215550001111@c.us",
            "ack": 3
        });
        let msg = n.normalize(&raw).await.unwrap().unwrap();
        assert_eq!(msg.kind, MessageKind::Status);
    }

    #[tokio::test]
    async fn own_message_is_skipped() {
        let n = normalizer();
        let msg = n
            .normalize(&onmessage(serde_json::json!({"body": "x", "fromMe": true})))
            .await
            .unwrap();
        assert!(msg.is_none());
    }

    #[tokio::test]
    async fn sender_posts_message_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/shop/send-message"))
            .and(header("authorization", "Bearer wpp-token"))
            .and(body_partial_json(
                serde_json::json!({"phone": "5215550001111", "message": "hola"}),
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sender = WppConnectSender::new(
            reqwest::Client::new(),
            WppConnectConfig {
                server_url: server.uri(),
                session: "shop".into(),
                token: "wpp-token".into(),
            },
        );
        sender
            .send_message("5215550001111", "hola", None)
            .await
            .unwrap();
    }
}
