// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use ventra_config::model::BufferConfig;
use ventra_core::{CanonicalMessage, ConversationBatch, ConversationKey};

/// Timing thresholds for the debounce buffer.
#[derive(Debug, Clone, Copy)]
pub struct BufferSettings {
    /// Idle time after which a pending batch flushes.
    pub debounce: Duration,
    /// Maximum total accumulation time before a forced flush.
    pub hard_ceiling: Duration,
    /// How often a waiter re-checks its record.
    pub poll_interval: Duration,
}

impl From<&BufferConfig> for BufferSettings {
    fn from(config: &BufferConfig) -> Self {
        Self {
            debounce: Duration::from_secs(config.debounce_secs),
            hard_ceiling: Duration::from_secs(config.hard_ceiling_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
        }
    }
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self::from(&BufferConfig::default())
    }
}

struct BufferRecord {
    messages: Vec<CanonicalMessage>,
    first_arrival: Instant,
    last_update: Instant,
}

impl BufferRecord {
    fn new(message: CanonicalMessage, now: Instant) -> Self {
        Self {
            messages: vec![message],
            first_arrival: now,
            last_update: now,
        }
    }

    fn push(&mut self, message: CanonicalMessage, now: Instant) {
        self.messages.push(message);
        self.last_update = now;
    }

    fn idle_expired(&self, now: Instant, settings: &BufferSettings) -> bool {
        now.duration_since(self.last_update) >= settings.debounce
    }

    fn ceiling_reached(&self, now: Instant, settings: &BufferSettings) -> bool {
        now.duration_since(self.first_arrival) >= settings.hard_ceiling
    }

    fn flushable(&self, now: Instant, settings: &BufferSettings) -> bool {
        self.idle_expired(now, settings) || self.ceiling_reached(now, settings)
    }
}

enum Claim {
    Flushed(ConversationBatch),
    Pending,
    Vanished,
}

/// Per-conversation message accumulator with exactly-once flush.
///
/// The first `submit` for a key becomes the waiter: it polls until the
/// record is flushable, claims it atomically, and returns the batch.
/// Later submits for the same key append and return `None`. Claiming goes
/// through [`DashMap::remove_if`], whose predicate runs under the shard
/// lock, so a record is handed to exactly one claimant.
#[derive(Clone)]
pub struct ConversationBuffer {
    records: Arc<DashMap<ConversationKey, BufferRecord>>,
    settings: BufferSettings,
    flush_tx: mpsc::UnboundedSender<ConversationBatch>,
    flush_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<ConversationBatch>>>>,
}

impl ConversationBuffer {
    pub fn new(settings: BufferSettings) -> Self {
        let (flush_tx, flush_rx) = mpsc::unbounded_channel();
        Self {
            records: Arc::new(DashMap::new()),
            settings,
            flush_tx,
            flush_rx: Arc::new(Mutex::new(Some(flush_rx))),
        }
    }

    /// Take the side channel carrying batches flushed outside a `submit`
    /// call (stale records claimed on arrival of a newer message).
    ///
    /// Yields the receiver once; later calls return `None`.
    pub fn flushed(&self) -> Option<mpsc::UnboundedReceiver<ConversationBatch>> {
        self.flush_rx.lock().ok()?.take()
    }

    /// Number of messages currently buffered for a key.
    pub fn pending(&self, key: &ConversationKey) -> usize {
        self.records.get(key).map_or(0, |r| r.messages.len())
    }

    /// Buffer a message and wait for the batch it belongs to.
    ///
    /// Returns `Some(batch)` from exactly one call per batch: the call
    /// that opened the record (after the debounce window closes), or a
    /// call that found the previous record already expired. All other
    /// calls return `None` immediately.
    pub async fn submit(
        &self,
        key: ConversationKey,
        message: CanonicalMessage,
    ) -> Option<ConversationBatch> {
        let now = Instant::now();

        // An expired record must never absorb the new message: between
        // idle expiry and the waiter's next poll (or with the waiter
        // gone entirely) the submit itself claims the old batch and the
        // new message opens a fresh record.
        let stale = self
            .records
            .remove_if(&key, |_, rec| rec.flushable(now, &self.settings));

        let opened_record = match self.records.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().push(message, now);
                debug!(%key, pending = occupied.get().messages.len(), "message appended");
                false
            }
            Entry::Vacant(vacant) => {
                vacant.insert(BufferRecord::new(message, now));
                debug!(%key, "conversation record opened");
                true
            }
        };

        if let Some((stale_key, stale_record)) = stale {
            // This call returns the stale batch, so the record it just
            // opened needs a detached waiter feeding the side channel.
            if opened_record {
                let buffer = self.clone();
                let waited_key = key.clone();
                tokio::spawn(async move {
                    if let Some(batch) = buffer.wait_for_flush(waited_key).await
                        && buffer.flush_tx.send(batch).is_err()
                    {
                        warn!("flush side channel closed, batch dropped");
                    }
                });
            }
            warn!(key = %stale_key, count = stale_record.messages.len(),
                "stale record claimed on submit");
            return ConversationBatch::new(stale_key, stale_record.messages);
        }

        if opened_record {
            return self.wait_for_flush(key).await;
        }
        None
    }

    async fn wait_for_flush(&self, key: ConversationKey) -> Option<ConversationBatch> {
        loop {
            tokio::time::sleep(self.settings.poll_interval).await;
            match self.try_claim(&key) {
                Claim::Flushed(batch) => {
                    info!(%key, count = batch.len(), "batch flushed");
                    return Some(batch);
                }
                Claim::Pending => continue,
                Claim::Vanished => {
                    debug!(%key, "record claimed elsewhere, waiter exiting");
                    return None;
                }
            }
        }
    }

    fn try_claim(&self, key: &ConversationKey) -> Claim {
        let now = Instant::now();
        if let Some((claimed_key, record)) = self
            .records
            .remove_if(key, |_, rec| rec.flushable(now, &self.settings))
        {
            return match ConversationBatch::new(claimed_key, record.messages) {
                Some(batch) => Claim::Flushed(batch),
                None => Claim::Vanished,
            };
        }
        if self.records.contains_key(key) {
            Claim::Pending
        } else {
            Claim::Vanished
        }
    }
}
