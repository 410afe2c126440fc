// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound provider adapter trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::VentraError;

/// Presence indicator kinds a provider can show to the chat partner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PresenceKind {
    Composing,
    Recording,
    Paused,
}

/// One configured outbound provider (the send half of a channel).
///
/// The dispatcher tries providers in priority order; a provider signals
/// failure by returning an error, which moves the dispatcher to the next
/// one. Providers must not retry internally.
#[async_trait]
pub trait OutboundProvider: Send + Sync + 'static {
    /// Stable provider name used in delivery reports and logs.
    fn name(&self) -> &str;

    /// Send a text message, optionally with attached media by URL.
    async fn send_message(
        &self,
        to: &str,
        text: &str,
        media_url: Option<&str>,
    ) -> Result<(), VentraError>;

    /// Show a typing/recording indicator for roughly `delay_ms`.
    async fn send_presence(
        &self,
        to: &str,
        kind: PresenceKind,
        delay_ms: u64,
    ) -> Result<(), VentraError>;

    /// Archive or unarchive a chat.
    async fn send_archive(
        &self,
        chat_id: &str,
        last_message_id: &str,
        archive: bool,
    ) -> Result<(), VentraError>;
}
