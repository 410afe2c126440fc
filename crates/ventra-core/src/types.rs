// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical message model, conversation batches, and chat-turn types.
//!
//! Every raw provider event is converted into exactly one immutable
//! [`CanonicalMessage`]. Bursts of canonical messages for one conversation
//! are grouped into a [`ConversationBatch`] by the debounce buffer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// WhatsApp-compatible providers known to the normalizer registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// Evolution API (self-hosted Baileys wrapper).
    Evolution,
    /// WPPConnect server.
    WppConnect,
    /// Meta WhatsApp Cloud API.
    Cloud,
}

/// Content type of a canonical message.
///
/// `Status` marks delivery/read/failure receipts which carry no
/// conversational content and are never buffered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Audio,
    Video,
    Document,
    Sticker,
    Location,
    Contact,
    Reaction,
    Status,
}

/// Provider-independent representation of one inbound event.
///
/// Immutable once normalized; one instance per raw provider event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalMessage {
    /// Provider-assigned message id.
    pub id: String,
    /// Which adapter normalized the payload.
    pub provider: Provider,
    /// Opaque sender id as the provider reports it (e.g. a JID).
    pub from: String,
    /// Phone-normalized sender number (digits only, no JID suffix).
    pub number: String,
    /// Sender display name, when the provider carries one.
    pub push_name: Option<String>,
    /// Content type.
    pub kind: MessageKind,
    /// Text body for text messages.
    pub text: Option<String>,
    /// Caption accompanying media.
    pub caption: Option<String>,
    /// Direct or signed URL to the media, when known.
    pub media_url: Option<String>,
    /// Inlined media payload; populated by download-and-embed when the
    /// fetch succeeds, absent when the pipeline degraded to the URL.
    pub media_base64: Option<String>,
    /// MIME type reported by the provider.
    pub mime_type: Option<String>,
    /// Unix timestamp (seconds) of the original event.
    pub timestamp: i64,
}

impl CanonicalMessage {
    /// Returns a `data:` URI for the embedded media, if any.
    pub fn data_uri(&self) -> Option<String> {
        let b64 = self.media_base64.as_deref()?;
        let mime = self.mime_type.as_deref().unwrap_or("application/octet-stream");
        Some(format!("data:{mime};base64,{b64}"))
    }

    /// The best available reference to the media: embedded data URI first,
    /// raw URL as the degraded fallback.
    pub fn media_reference(&self) -> Option<String> {
        self.data_uri().or_else(|| self.media_url.clone())
    }
}

/// Identifies one conversation: a phone number talking to one bot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub number: String,
    pub bot_id: String,
}

impl ConversationKey {
    pub fn new(number: impl Into<String>, bot_id: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            bot_id: bot_id.into(),
        }
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.bot_id, self.number)
    }
}

/// An ordered, non-empty batch of canonical messages flushed from the
/// debounce buffer for one conversation.
///
/// Invariant: all messages share the batch's key; insertion order is
/// arrival order; a batch is consumed exactly once.
#[derive(Debug, Clone)]
pub struct ConversationBatch {
    key: ConversationKey,
    messages: Vec<CanonicalMessage>,
}

impl ConversationBatch {
    /// Build a batch from the messages accumulated for a key.
    ///
    /// Returns `None` for an empty message list; batches are never empty.
    pub fn new(key: ConversationKey, messages: Vec<CanonicalMessage>) -> Option<Self> {
        if messages.is_empty() {
            return None;
        }
        Some(Self { key, messages })
    }

    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    pub fn messages(&self) -> &[CanonicalMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// All text bodies in arrival order, one per text message.
    pub fn texts(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| m.text.as_deref())
            .collect()
    }

    /// Messages of one kind, in arrival order.
    pub fn of_kind(&self, kind: MessageKind) -> Vec<&CanonicalMessage> {
        self.messages.iter().filter(|m| m.kind == kind).collect()
    }
}

/// Who produced a recorded conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnAuthor {
    /// The person on the other end of the conversation.
    Person,
    /// The bot's outbound reply.
    Bot,
    /// A system event (sale lifecycle, holding messages, audit notes).
    System,
}

impl TurnAuthor {
    /// Single-letter code used in the persisted log.
    pub fn code(&self) -> &'static str {
        match self {
            TurnAuthor::Person => "P",
            TurnAuthor::Bot => "B",
            TurnAuthor::System => "S",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(TurnAuthor::Person),
            "B" => Some(TurnAuthor::Bot),
            "S" => Some(TurnAuthor::System),
            _ => None,
        }
    }
}

/// One recorded turn in the append-only conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub author: TurnAuthor,
    /// Content format of the turn (mirrors [`MessageKind`] for inbound turns).
    pub format: MessageKind,
    /// Rendered message text (or a short description for media turns).
    pub message: String,
    /// Free-form event metadata. Sale lifecycle events use
    /// `{"event": "start_sale" | "awaiting_confirmation" | "sale_confirmed"
    /// | "cancelled" | "refunded"}`.
    pub metadata: Option<serde_json::Value>,
    /// Unix timestamp (seconds) the turn was recorded.
    pub date: i64,
    /// Sale this turn belongs to, when any.
    pub sale_id: Option<String>,
}

impl ChatTurn {
    /// A person turn for an inbound canonical message.
    pub fn person(msg: &CanonicalMessage, rendered: impl Into<String>) -> Self {
        Self {
            author: TurnAuthor::Person,
            format: msg.kind,
            message: rendered.into(),
            metadata: None,
            date: msg.timestamp,
            sale_id: None,
        }
    }

    /// A bot text turn recorded at `date`.
    pub fn bot(message: impl Into<String>, date: i64) -> Self {
        Self {
            author: TurnAuthor::Bot,
            format: MessageKind::Text,
            message: message.into(),
            metadata: None,
            date,
            sale_id: None,
        }
    }

    /// A system turn carrying a sale lifecycle event.
    pub fn sale_event(event: &str, sale_id: impl Into<String>, date: i64) -> Self {
        Self {
            author: TurnAuthor::System,
            format: MessageKind::Text,
            message: format!("sale event: {event}"),
            metadata: Some(serde_json::json!({ "event": event })),
            date,
            sale_id: Some(sale_id.into()),
        }
    }

    /// The `event` field of this turn's metadata, if present.
    pub fn event(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("event")?.as_str()
    }
}

/// Sale lifecycle states. Terminal states resolve the sale and stop it from
/// being reported as the conversation's current sale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SaleState {
    Initiated,
    AwaitingConfirmation,
    SaleConfirmed,
    Cancelled,
    Refunded,
}

impl SaleState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SaleState::SaleConfirmed | SaleState::Cancelled | SaleState::Refunded
        )
    }
}

/// Bot identity handed to the AI collaborator and action handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotProfile {
    pub id: String,
    pub name: String,
    /// Free-form context string forwarded to AI calls.
    pub context: Option<String>,
}

/// Result of one outbound delivery through the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub success: bool,
    /// Name of the provider that accepted the message.
    pub provider: Option<String>,
    /// 1-based index of the attempt that settled the delivery.
    pub attempt: u32,
    /// True when a provider other than the first configured one succeeded.
    pub used_fallback: bool,
    /// True when every configured provider failed.
    pub all_providers_failed: bool,
    /// True for best-effort sends (presence) swallowed on total failure.
    pub silent: bool,
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn delivered(provider: impl Into<String>, attempt: u32) -> Self {
        Self {
            success: true,
            provider: Some(provider.into()),
            attempt,
            used_fallback: attempt > 1,
            all_providers_failed: false,
            silent: false,
            error: None,
        }
    }

    pub fn exhausted(attempts: u32, last_error: impl Into<String>) -> Self {
        Self {
            success: false,
            provider: None,
            attempt: attempts,
            used_fallback: false,
            all_providers_failed: true,
            silent: false,
            error: Some(last_error.into()),
        }
    }

    /// Cosmetic send that failed everywhere and was swallowed.
    pub fn silent_ok() -> Self {
        Self {
            success: true,
            provider: None,
            attempt: 0,
            used_fallback: false,
            all_providers_failed: false,
            silent: true,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(kind: MessageKind, text: Option<&str>) -> CanonicalMessage {
        CanonicalMessage {
            id: "m1".into(),
            provider: Provider::Evolution,
            from: "5215550001111@s.whatsapp.net".into(),
            number: "5215550001111".into(),
            push_name: Some("Ana".into()),
            kind,
            text: text.map(Into::into),
            caption: None,
            media_url: None,
            media_base64: None,
            mime_type: None,
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn batch_rejects_empty_message_list() {
        let key = ConversationKey::new("5215550001111", "bot-1");
        assert!(ConversationBatch::new(key, vec![]).is_none());
    }

    #[test]
    fn batch_preserves_arrival_order() {
        let key = ConversationKey::new("5215550001111", "bot-1");
        let batch = ConversationBatch::new(
            key,
            vec![
                msg(MessageKind::Text, Some("hola")),
                msg(MessageKind::Text, Some("que tal")),
            ],
        )
        .unwrap();
        assert_eq!(batch.texts(), vec!["hola", "que tal"]);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn data_uri_prefers_embedded_payload() {
        let mut m = msg(MessageKind::Image, None);
        m.media_url = Some("https://cdn.example/img".into());
        assert_eq!(m.media_reference().as_deref(), Some("https://cdn.example/img"));

        m.media_base64 = Some("aGk=".into());
        m.mime_type = Some("image/jpeg".into());
        assert_eq!(
            m.media_reference().as_deref(),
            Some("data:image/jpeg;base64,aGk=")
        );
    }

    #[test]
    fn turn_author_codes_roundtrip() {
        for author in [TurnAuthor::Person, TurnAuthor::Bot, TurnAuthor::System] {
            assert_eq!(TurnAuthor::from_code(author.code()), Some(author));
        }
        assert_eq!(TurnAuthor::from_code("X"), None);
    }

    #[test]
    fn sale_terminal_states() {
        assert!(!SaleState::Initiated.is_terminal());
        assert!(!SaleState::AwaitingConfirmation.is_terminal());
        assert!(SaleState::SaleConfirmed.is_terminal());
        assert!(SaleState::Cancelled.is_terminal());
        assert!(SaleState::Refunded.is_terminal());
    }

    #[test]
    fn sale_event_turn_exposes_event() {
        let turn = ChatTurn::sale_event("start_sale", "sale-9", 1_700_000_000);
        assert_eq!(turn.event(), Some("start_sale"));
        assert_eq!(turn.sale_id.as_deref(), Some("sale-9"));
        assert_eq!(turn.author, TurnAuthor::System);
    }

    #[test]
    fn delivery_report_constructors() {
        let ok = DeliveryReport::delivered("evolution", 2);
        assert!(ok.success && ok.used_fallback);
        assert_eq!(ok.attempt, 2);

        let failed = DeliveryReport::exhausted(3, "timeout");
        assert!(!failed.success && failed.all_providers_failed);

        let silent = DeliveryReport::silent_ok();
        assert!(silent.success && silent.silent);
    }

    #[test]
    fn kind_parses_from_string() {
        use std::str::FromStr;
        assert_eq!(MessageKind::from_str("audio").unwrap(), MessageKind::Audio);
        assert_eq!(Provider::from_str("wpp-connect").unwrap(), Provider::WppConnect);
    }
}
