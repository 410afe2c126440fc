// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher construction and config-keyed caching.
//!
//! A dispatcher is built once per distinct provider configuration and
//! reused; the cache key is a SHA-256 over the serialized config, so any
//! credential or priority change yields a fresh dispatcher.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use ventra_config::model::ProvidersConfig;
use ventra_core::{OutboundProvider, VentraError};
use ventra_providers::{CloudSender, EvolutionSender, WppConnectSender};

use crate::dispatcher::OutboundDispatcher;

/// Cache of dispatchers keyed by provider-config hash.
#[derive(Default)]
pub struct ProviderCache {
    entries: DashMap<String, Arc<OutboundDispatcher>>,
    client: reqwest::Client,
}

impl ProviderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or build the dispatcher for this provider configuration.
    pub fn dispatcher(
        &self,
        config: &ProvidersConfig,
    ) -> Result<Arc<OutboundDispatcher>, VentraError> {
        let key = config_hash(config)?;
        if let Some(existing) = self.entries.get(&key) {
            debug!(key = %&key[..12], "dispatcher cache hit");
            return Ok(existing.clone());
        }
        let dispatcher = Arc::new(build_dispatcher(config, &self.client));
        self.entries.insert(key, dispatcher.clone());
        Ok(dispatcher)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build a dispatcher honoring the configured priority order.
///
/// Names without a matching credentials section are skipped with a
/// warning; an unknown name is a config typo and also skipped.
pub fn build_dispatcher(config: &ProvidersConfig, client: &reqwest::Client) -> OutboundDispatcher {
    let mut providers: Vec<Arc<dyn OutboundProvider>> = Vec::new();
    for name in &config.priority {
        match name.as_str() {
            "evolution" => match &config.evolution {
                Some(cfg) => providers
                    .push(Arc::new(EvolutionSender::new(client.clone(), cfg.clone()))),
                None => warn!(provider = name.as_str(), "prioritized but not configured, skipping"),
            },
            "wpp-connect" | "wppconnect" => match &config.wppconnect {
                Some(cfg) => providers
                    .push(Arc::new(WppConnectSender::new(client.clone(), cfg.clone()))),
                None => warn!(provider = name.as_str(), "prioritized but not configured, skipping"),
            },
            "cloud" => match &config.cloud {
                Some(cfg) => {
                    providers.push(Arc::new(CloudSender::new(client.clone(), cfg.clone())))
                }
                None => warn!(provider = name.as_str(), "prioritized but not configured, skipping"),
            },
            other => warn!(provider = other, "unknown provider name in priority, skipping"),
        }
    }
    OutboundDispatcher::new(providers, Duration::from_secs(config.send_timeout_secs))
}

fn config_hash(config: &ProvidersConfig) -> Result<String, VentraError> {
    let serialized = serde_json::to_vec(config)
        .map_err(|e| VentraError::Config(format!("unhashable provider config: {e}")))?;
    Ok(hex::encode(Sha256::digest(&serialized)))
}
