// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch classification by dominant content type.

use ventra_core::{ConversationBatch, MessageKind};

/// Most-specific-first classification order. A batch containing any
/// message of an earlier kind is handled by that kind's processor; text
/// is the fallback.
const PRIORITY: [MessageKind; 6] = [
    MessageKind::Document,
    MessageKind::Sticker,
    MessageKind::Reaction,
    MessageKind::Video,
    MessageKind::Image,
    MessageKind::Audio,
];

/// Pick the processor kind for a batch.
pub fn classify(batch: &ConversationBatch) -> MessageKind {
    for kind in PRIORITY {
        if batch.messages().iter().any(|m| m.kind == kind) {
            return kind;
        }
    }
    MessageKind::Text
}

/// Text bodies riding along in a non-text batch, concatenated for the
/// interpretation. `None` when the batch carries no text.
pub fn additional_text(batch: &ConversationBatch) -> Option<String> {
    let texts = batch.texts();
    if texts.is_empty() {
        return None;
    }
    Some(texts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventra_core::types::Provider;
    use ventra_core::{CanonicalMessage, ConversationKey};

    fn msg(kind: MessageKind, text: Option<&str>) -> CanonicalMessage {
        CanonicalMessage {
            id: "m".into(),
            provider: Provider::Evolution,
            from: "1@s.whatsapp.net".into(),
            number: "1".into(),
            push_name: None,
            kind,
            text: text.map(str::to_string),
            caption: None,
            media_url: None,
            media_base64: None,
            mime_type: None,
            timestamp: 0,
        }
    }

    fn batch(messages: Vec<CanonicalMessage>) -> ConversationBatch {
        ConversationBatch::new(ConversationKey::new("1", "ventra"), messages).unwrap()
    }

    #[test]
    fn pure_text_classifies_text() {
        let b = batch(vec![msg(MessageKind::Text, Some("hola"))]);
        assert_eq!(classify(&b), MessageKind::Text);
    }

    #[test]
    fn audio_beats_text() {
        let b = batch(vec![
            msg(MessageKind::Text, Some("hola")),
            msg(MessageKind::Audio, None),
        ]);
        assert_eq!(classify(&b), MessageKind::Audio);
    }

    #[test]
    fn document_beats_everything() {
        let b = batch(vec![
            msg(MessageKind::Audio, None),
            msg(MessageKind::Image, None),
            msg(MessageKind::Document, None),
            msg(MessageKind::Video, None),
        ]);
        assert_eq!(classify(&b), MessageKind::Document);
    }

    #[test]
    fn sticker_beats_reaction_and_below() {
        let b = batch(vec![
            msg(MessageKind::Reaction, Some("👍")),
            msg(MessageKind::Sticker, None),
            msg(MessageKind::Image, None),
        ]);
        assert_eq!(classify(&b), MessageKind::Sticker);
    }

    #[test]
    fn image_beats_audio() {
        let b = batch(vec![
            msg(MessageKind::Audio, None),
            msg(MessageKind::Image, None),
        ]);
        assert_eq!(classify(&b), MessageKind::Image);
    }

    #[test]
    fn additional_text_joins_in_order() {
        let b = batch(vec![
            msg(MessageKind::Text, Some("mira")),
            msg(MessageKind::Image, None),
            msg(MessageKind::Text, Some("es este")),
        ]);
        assert_eq!(additional_text(&b).unwrap(), "mira\nes este");
    }

    #[test]
    fn additional_text_none_without_text() {
        let b = batch(vec![msg(MessageKind::Image, None)]);
        assert!(additional_text(&b).is_none());
    }
}
