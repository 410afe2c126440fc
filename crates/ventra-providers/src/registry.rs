// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalizer registry: deterministic first-claim detection.
//!
//! Adapters are consulted in registration order; the first whose
//! structural heuristics claim the payload normalizes it. A payload no
//! adapter claims is an [`VentraError::UnknownProvider`] and the event is
//! dropped with a logged warning by the caller.

use std::sync::Arc;

use tracing::debug;

use ventra_core::traits::ProviderNormalizer;
use ventra_core::{CanonicalMessage, VentraError};

/// Ordered collection of provider normalizers.
#[derive(Clone, Default)]
pub struct NormalizerRegistry {
    adapters: Vec<Arc<dyn ProviderNormalizer>>,
}

impl NormalizerRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Register an adapter. Registration order is detection order.
    pub fn register(&mut self, adapter: Arc<dyn ProviderNormalizer>) {
        self.adapters.push(adapter);
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Attribute a raw webhook payload and normalize it.
    ///
    /// Returns `Ok(None)` when the claiming adapter found nothing to
    /// process (own echoes, empty envelopes).
    pub async fn normalize(
        &self,
        raw: &serde_json::Value,
    ) -> Result<Option<CanonicalMessage>, VentraError> {
        for adapter in &self.adapters {
            if adapter.detect(raw) {
                debug!(provider = %adapter.provider(), "payload claimed");
                return adapter.normalize(raw).await;
            }
        }
        Err(VentraError::UnknownProvider)
    }
}

/// Count how many of the given heuristics hold; adapters claim a payload
/// at two or more, which tolerates partial-schema webhooks without
/// single-field false positives.
pub(crate) fn heuristic_majority(checks: [bool; 3]) -> bool {
    checks.iter().filter(|c| **c).count() >= 2
}
