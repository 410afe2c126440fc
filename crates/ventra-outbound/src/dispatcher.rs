// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Priority-ordered outbound dispatch with per-attempt timeouts.
//!
//! Providers are tried in configured order; the first acceptance wins and
//! the remaining providers are never called. The report always records
//! which attempt settled the send and whether a fallback was used.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use ventra_core::traits::outbound::PresenceKind;
use ventra_core::{DeliveryReport, OutboundProvider, VentraError};

/// Fans a send across configured providers in priority order.
pub struct OutboundDispatcher {
    providers: Vec<Arc<dyn OutboundProvider>>,
    send_timeout: Duration,
}

impl OutboundDispatcher {
    pub fn new(providers: Vec<Arc<dyn OutboundProvider>>, send_timeout: Duration) -> Self {
        Self {
            providers,
            send_timeout,
        }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Deliver a message through the first provider that accepts it.
    ///
    /// Never returns an error: total failure is reported through
    /// [`DeliveryReport::exhausted`] so the caller can log and decide.
    pub async fn send(&self, to: &str, text: &str, media_url: Option<&str>) -> DeliveryReport {
        self.attempt_each(|provider| {
            let provider = provider.clone();
            let to = to.to_string();
            let text = text.to_string();
            let media_url = media_url.map(str::to_string);
            async move {
                provider
                    .send_message(&to, &text, media_url.as_deref())
                    .await
            }
        })
        .await
    }

    /// Best-effort presence indicator.
    ///
    /// Presence is cosmetic: when every provider fails, the failure is
    /// swallowed and reported as a silent success so it can never break
    /// the pipeline.
    pub async fn send_presence(&self, to: &str, kind: PresenceKind, delay_ms: u64) -> DeliveryReport {
        let report = self
            .attempt_each(|provider| {
                let provider = provider.clone();
                let to = to.to_string();
                async move { provider.send_presence(&to, kind, delay_ms).await }
            })
            .await;
        if report.all_providers_failed {
            debug!(%kind, "presence failed on all providers, swallowed");
            return DeliveryReport::silent_ok();
        }
        report
    }

    /// Archive or unarchive a chat through the first capable provider.
    pub async fn send_archive(
        &self,
        chat_id: &str,
        last_message_id: &str,
        archive: bool,
    ) -> DeliveryReport {
        self.attempt_each(|provider| {
            let provider = provider.clone();
            let chat_id = chat_id.to_string();
            let last_message_id = last_message_id.to_string();
            async move {
                provider
                    .send_archive(&chat_id, &last_message_id, archive)
                    .await
            }
        })
        .await
    }

    async fn attempt_each<F, Fut>(&self, mut op: F) -> DeliveryReport
    where
        F: FnMut(&Arc<dyn OutboundProvider>) -> Fut,
        Fut: Future<Output = Result<(), VentraError>>,
    {
        let mut last_error = VentraError::Channel {
            message: "no outbound providers configured".into(),
            source: None,
        };

        for (index, provider) in self.providers.iter().enumerate() {
            let attempt = (index + 1) as u32;
            let result = match timeout(self.send_timeout, op(provider)).await {
                Ok(result) => result,
                Err(_) => Err(VentraError::Timeout {
                    duration: self.send_timeout,
                }),
            };
            match result {
                Ok(()) => {
                    if attempt > 1 {
                        info!(provider = provider.name(), attempt, "delivered via fallback");
                    } else {
                        debug!(provider = provider.name(), "delivered");
                    }
                    return DeliveryReport::delivered(provider.name(), attempt);
                }
                Err(e) => {
                    warn!(provider = provider.name(), attempt, error = %e,
                        "provider failed, trying next");
                    last_error = e;
                }
            }
        }

        let attempts = self.providers.len() as u32;
        DeliveryReport::exhausted(attempts, VentraError::AllProvidersFailed {
            last_error: last_error.to_string(),
        }
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        name: &'static str,
        fail: bool,
        hang: bool,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn ok(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail: false,
                hang: false,
                calls: AtomicU32::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail: true,
                hang: false,
                calls: AtomicU32::new(0),
            })
        }

        fn hanging(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail: false,
                hang: true,
                calls: AtomicU32::new(0),
            })
        }

        async fn run(&self) -> Result<(), VentraError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail {
                return Err(VentraError::Channel {
                    message: format!("{} down", self.name),
                    source: None,
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl OutboundProvider for ScriptedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn send_message(
            &self,
            _to: &str,
            _text: &str,
            _media_url: Option<&str>,
        ) -> Result<(), VentraError> {
            self.run().await
        }

        async fn send_presence(
            &self,
            _to: &str,
            _kind: PresenceKind,
            _delay_ms: u64,
        ) -> Result<(), VentraError> {
            self.run().await
        }

        async fn send_archive(
            &self,
            _chat_id: &str,
            _last_message_id: &str,
            _archive: bool,
        ) -> Result<(), VentraError> {
            self.run().await
        }
    }

    fn dispatcher(providers: Vec<Arc<ScriptedProvider>>) -> OutboundDispatcher {
        OutboundDispatcher::new(
            providers
                .into_iter()
                .map(|p| p as Arc<dyn OutboundProvider>)
                .collect(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn first_provider_wins_and_rest_untouched() {
        let first = ScriptedProvider::ok("evolution");
        let second = ScriptedProvider::ok("cloud");
        let d = dispatcher(vec![first.clone(), second.clone()]);

        let report = d.send("5215550001111", "hola", None).await;
        assert!(report.success);
        assert_eq!(report.provider.as_deref(), Some("evolution"));
        assert_eq!(report.attempt, 1);
        assert!(!report.used_fallback);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fallback_annotated_on_second_attempt() {
        let d = dispatcher(vec![
            ScriptedProvider::failing("evolution"),
            ScriptedProvider::ok("cloud"),
        ]);
        let report = d.send("5215550001111", "hola", None).await;
        assert!(report.success);
        assert_eq!(report.provider.as_deref(), Some("cloud"));
        assert_eq!(report.attempt, 2);
        assert!(report.used_fallback);
    }

    #[tokio::test]
    async fn total_failure_reports_exhausted() {
        let d = dispatcher(vec![
            ScriptedProvider::failing("evolution"),
            ScriptedProvider::failing("cloud"),
        ]);
        let report = d.send("5215550001111", "hola", None).await;
        assert!(!report.success);
        assert!(report.all_providers_failed);
        assert_eq!(report.attempt, 2);
        assert!(report.error.as_deref().unwrap().contains("cloud down"));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_times_out_into_fallback() {
        let d = OutboundDispatcher::new(
            vec![
                ScriptedProvider::hanging("evolution") as Arc<dyn OutboundProvider>,
                ScriptedProvider::ok("cloud") as Arc<dyn OutboundProvider>,
            ],
            Duration::from_secs(5),
        );
        let report = d.send("5215550001111", "hola", None).await;
        assert!(report.success);
        assert_eq!(report.provider.as_deref(), Some("cloud"));
        assert!(report.used_fallback);
    }

    #[tokio::test]
    async fn presence_total_failure_is_silent_success() {
        let d = dispatcher(vec![ScriptedProvider::failing("evolution")]);
        let report = d
            .send_presence("5215550001111", PresenceKind::Composing, 2000)
            .await;
        assert!(report.success);
        assert!(report.silent);
        assert!(report.provider.is_none());
    }

    #[tokio::test]
    async fn presence_success_is_not_silent() {
        let d = dispatcher(vec![ScriptedProvider::ok("evolution")]);
        let report = d
            .send_presence("5215550001111", PresenceKind::Recording, 2000)
            .await;
        assert!(report.success);
        assert!(!report.silent);
        assert_eq!(report.provider.as_deref(), Some("evolution"));
    }

    #[tokio::test]
    async fn empty_dispatcher_is_exhausted_at_zero_attempts() {
        let d = OutboundDispatcher::new(Vec::new(), Duration::from_secs(5));
        let report = d.send("5215550001111", "hola", None).await;
        assert!(!report.success);
        assert!(report.all_providers_failed);
        assert_eq!(report.attempt, 0);
    }
}
