// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider normalizer trait: raw webhook JSON in, canonical message out.

use async_trait::async_trait;

use crate::error::VentraError;
use crate::types::{CanonicalMessage, Provider};

/// Converts provider-specific webhook payloads into the canonical model.
///
/// Detection uses a small set of structural heuristics per provider; a
/// payload belongs to an adapter when at least two of its three heuristics
/// match, which tolerates partial-schema webhooks without single-field
/// false positives. Detection order across adapters is registration order,
/// and the first adapter to claim a payload wins.
#[async_trait]
pub trait ProviderNormalizer: Send + Sync + 'static {
    /// Which provider this adapter speaks for.
    fn provider(&self) -> Provider;

    /// Structural check: does this payload look like ours?
    fn detect(&self, raw: &serde_json::Value) -> bool;

    /// Convert a claimed payload into a canonical message.
    ///
    /// Returns `Ok(None)` for payloads that are valid but carry nothing to
    /// process (e.g. the bot's own echoes). Media embedding happens here
    /// and must degrade to the raw URL on fetch failure rather than erring.
    async fn normalize(
        &self,
        raw: &serde_json::Value,
    ) -> Result<Option<CanonicalMessage>, VentraError>;
}
