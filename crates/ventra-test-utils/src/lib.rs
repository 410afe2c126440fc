// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles: in-memory log, scripted AI, recording provider,
//! and webhook payload builders.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use ventra_core::traits::outbound::PresenceKind;
use ventra_core::{
    AiService, BotProfile, CanonicalMessage, ChatLogStore, ChatTurn, ConversationKey,
    MessageKind, OutboundProvider, Provider, VentraError,
};

/// In-memory [`ChatLogStore`].
#[derive(Default)]
pub struct MemoryChatLog {
    turns: Mutex<HashMap<ConversationKey, Vec<ChatTurn>>>,
}

impl MemoryChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one conversation's turns.
    pub fn turns(&self, key: &ConversationKey) -> Vec<ChatTurn> {
        self.turns
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatLogStore for MemoryChatLog {
    async fn append(&self, key: &ConversationKey, turn: ChatTurn) -> Result<(), VentraError> {
        self.turns
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn read_all(&self, key: &ConversationKey) -> Result<Vec<ChatTurn>, VentraError> {
        Ok(self.turns(key))
    }
}

/// Scripted [`AiService`]: fixed transcription/description or failure.
pub struct MockAi {
    transcription: Option<String>,
    description: Option<String>,
    /// Instructions passed to `analyze_image`, in call order.
    pub instructions: Mutex<Vec<String>>,
}

impl MockAi {
    pub fn new() -> Self {
        Self {
            transcription: Some("transcripcion de prueba".into()),
            description: Some("descripcion de prueba".into()),
            instructions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_transcription(mut self, text: impl Into<String>) -> Self {
        self.transcription = Some(text.into());
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Every call fails with `AiInterpretationFailed`.
    pub fn failing() -> Self {
        Self {
            transcription: None,
            description: None,
            instructions: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MockAi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiService for MockAi {
    async fn transcribe_audio(
        &self,
        _source: &str,
        _bot: &BotProfile,
    ) -> Result<String, VentraError> {
        self.transcription
            .clone()
            .ok_or_else(|| VentraError::AiInterpretationFailed {
                message: "scripted transcription failure".into(),
                source: None,
            })
    }

    async fn analyze_image(
        &self,
        _data_uri: &str,
        instruction: &str,
        _bot: &BotProfile,
    ) -> Result<String, VentraError> {
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());
        self.description
            .clone()
            .ok_or_else(|| VentraError::AiInterpretationFailed {
                message: "scripted vision failure".into(),
                source: None,
            })
    }
}

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentItem {
    Message { to: String, text: String, media_url: Option<String> },
    Presence { to: String, kind: String },
    Archive { chat_id: String, archive: bool },
}

/// [`OutboundProvider`] that records everything it is asked to send.
pub struct RecordingProvider {
    name: &'static str,
    fail: AtomicBool,
    pub sent: Mutex<Vec<SentItem>>,
}

impl RecordingProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fail: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        let p = Self::new(name);
        p.fail.store(true, Ordering::SeqCst);
        p
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent_messages(&self) -> Vec<SentItem> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts of recorded `Message` items, in send order.
    pub fn message_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|i| match i {
                SentItem::Message { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn check(&self) -> Result<(), VentraError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(VentraError::Channel {
                message: format!("{} scripted failure", self.name),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OutboundProvider for RecordingProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn send_message(
        &self,
        to: &str,
        text: &str,
        media_url: Option<&str>,
    ) -> Result<(), VentraError> {
        self.check()?;
        self.sent.lock().unwrap().push(SentItem::Message {
            to: to.to_string(),
            text: text.to_string(),
            media_url: media_url.map(str::to_string),
        });
        Ok(())
    }

    async fn send_presence(
        &self,
        to: &str,
        kind: PresenceKind,
        _delay_ms: u64,
    ) -> Result<(), VentraError> {
        self.check()?;
        self.sent.lock().unwrap().push(SentItem::Presence {
            to: to.to_string(),
            kind: kind.to_string(),
        });
        Ok(())
    }

    async fn send_archive(
        &self,
        chat_id: &str,
        _last_message_id: &str,
        archive: bool,
    ) -> Result<(), VentraError> {
        self.check()?;
        self.sent.lock().unwrap().push(SentItem::Archive {
            chat_id: chat_id.to_string(),
            archive,
        });
        Ok(())
    }
}

/// A canonical message with the given kind and text, for batch assembly.
pub fn canonical(kind: MessageKind, text: Option<&str>) -> CanonicalMessage {
    CanonicalMessage {
        id: format!("m-{}", text.unwrap_or("media")),
        provider: Provider::Evolution,
        from: "5215550001111@s.whatsapp.net".into(),
        number: "5215550001111".into(),
        push_name: Some("Ana".into()),
        kind,
        text: text.map(str::to_string),
        caption: None,
        media_url: None,
        media_base64: None,
        mime_type: None,
        timestamp: 1_700_000_000,
    }
}

/// Evolution API `messages.upsert` webhook for a plain text message.
pub fn evolution_text_webhook(number: &str, text: &str) -> Value {
    serde_json::json!({
        "instance": "main",
        "event": "messages.upsert",
        "data": {
            "key": {
                "remoteJid": format!("{number}@s.whatsapp.net"),
                "fromMe": false,
                "id": "EVO123"
            },
            "pushName": "Ana",
            "messageTimestamp": 1_700_000_000,
            "message": { "conversation": text }
        }
    })
}

/// WPPConnect `onmessage` webhook for a plain text message.
pub fn wppconnect_text_webhook(number: &str, text: &str) -> Value {
    serde_json::json!({
        "session": "main",
        "event": "onmessage",
        "id": "WPP123",
        "from": format!("{number}@c.us"),
        "fromMe": false,
        "type": "chat",
        "body": text,
        "notifyName": "Ana",
        "timestamp": 1_700_000_000
    })
}

/// Meta Cloud API webhook for a plain text message.
pub fn cloud_text_webhook(number: &str, text: &str) -> Value {
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "1234",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": { "phone_number_id": "5678" },
                    "contacts": [{ "profile": { "name": "Ana" }, "wa_id": number }],
                    "messages": [{
                        "from": number,
                        "id": "wamid.1",
                        "timestamp": "1700000000",
                        "type": "text",
                        "text": { "body": text }
                    }]
                }
            }]
        }]
    })
}
