//! Broadcaster implementation
//!
//! Registers subscribers, fans records out to them, evicts the ones whose
//! transport failed and keeps the replay history.
//!
//! # Locking
//!
//! The subscriber set has its own lock and is only held while copying or
//! mutating membership. The history lock is held:
//!
//! - by `broadcast`, while taking the membership snapshot and appending the
//!   record to history (never during the fan-out itself);
//! - by `register_with_resume`, while joining the subscriber, reading the
//!   history and replaying it.
//!
//! A broadcast therefore either lands in the history before a resuming
//! subscriber reads it (and skips that subscriber), or snapshots the
//! subscriber after its replay is complete. Either way the record arrives
//! exactly once and after the replayed ones.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::config::BroadcasterConfig;
use crate::error::{Error, HandshakeError, Result, TargetError};
use crate::event::EventRecord;
use crate::registry::{ReplayHistory, Subscriber, SubscriberRegistry, TargetKey};
use crate::stats::{BroadcastMetrics, BroadcastStats};
use crate::target::{Target, TargetId};

/// Listener told about subscribers that left on their own
pub type CloseListener = Arc<dyn Fn(&TargetId) + Send + Sync>;

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Targets the record was written to
    pub delivered: usize,
    /// Targets evicted because the write failed
    pub evicted: usize,
}

/// One-to-many event stream broadcaster
///
/// Safe to share across threads behind an `Arc`; every operation is
/// synchronous.
pub struct Broadcaster {
    registry: Arc<SubscriberRegistry>,
    history: Mutex<ReplayHistory>,
    metrics: Arc<BroadcastMetrics>,
    close_listener: Arc<RwLock<Option<CloseListener>>>,
    config: BroadcasterConfig,
}

impl Broadcaster {
    /// Create a broadcaster with default configuration
    pub fn new() -> Self {
        Self::with_config(BroadcasterConfig::default())
    }

    /// Create a broadcaster with custom configuration
    pub fn with_config(config: BroadcasterConfig) -> Self {
        Self {
            registry: Arc::new(SubscriberRegistry::new()),
            history: Mutex::new(ReplayHistory::with_max_entries(config.max_history)),
            metrics: Arc::new(BroadcastMetrics::new()),
            close_listener: Arc::new(RwLock::new(None)),
            config,
        }
    }

    /// Get the broadcaster configuration
    pub fn config(&self) -> &BroadcasterConfig {
        &self.config
    }

    /// Install a listener for subscribers that disconnect on their own
    pub fn set_close_listener<F>(&self, listener: F)
    where
        F: Fn(&TargetId) + Send + Sync + 'static,
    {
        *self.close_listener.write() = Some(Arc::new(listener));
    }

    /// Register a subscriber
    ///
    /// Acknowledges the target, writes the open sentinel and adds it to the
    /// live pool. On failure the target is never added.
    pub fn register(&self, target: Arc<dyn Target>) -> Result<()> {
        let subscriber = self.handshake(target)?;
        self.join(&subscriber)?;
        self.attach_remote_close(&subscriber);
        self.metrics.record_registration();
        Ok(())
    }

    /// Register a subscriber and send it a welcome record first
    ///
    /// A subscriber that leaves before the welcome record is written is
    /// never added.
    pub fn register_with_welcome(
        &self,
        target: Arc<dyn Target>,
        welcome: &EventRecord,
    ) -> Result<()> {
        let subscriber = self.handshake(target)?;

        if let Err(err) = subscriber.target().send(welcome) {
            subscriber.abandon();
            self.metrics.record_rejected_handshake();
            tracing::warn!(
                target_id = %subscriber.id(),
                error = %err,
                "Subscriber left before welcome"
            );
            return Err(HandshakeError::Welcome(err).into());
        }

        self.join(&subscriber)?;
        self.attach_remote_close(&subscriber);
        self.metrics.record_registration();
        Ok(())
    }

    /// Register a reconnecting subscriber and replay what it missed
    ///
    /// `last_seen_id` is the `Last-Event-ID` the client sent; empty means a
    /// fresh subscription. Returns the number of records replayed.
    ///
    /// If a replayed record cannot be written the subscriber is withdrawn
    /// from the live pool and the error is returned, so the caller can
    /// decide whether to retry.
    pub fn register_with_resume(
        &self,
        target: Arc<dyn Target>,
        last_seen_id: &str,
    ) -> Result<usize> {
        let subscriber = self.handshake(target)?;

        if last_seen_id.is_empty() {
            self.join(&subscriber)?;
            self.attach_remote_close(&subscriber);
            self.metrics.record_registration();
            return Ok(0);
        }

        let history = self.history.lock();
        self.join(&subscriber)?;

        let missed = history.since(last_seen_id);
        for record in &missed {
            if let Err(source) = subscriber.target().send(record) {
                if subscriber.retire() {
                    self.registry.remove(subscriber.key());
                }
                self.metrics.record_rejected_handshake();
                let id = record.id().unwrap_or_default().to_string();
                tracing::debug!(
                    target_id = %subscriber.id(),
                    event_id = %id,
                    error = %source,
                    "Replay failed, subscriber withdrawn"
                );
                return Err(Error::Replay { id, source });
            }
        }
        drop(history);

        // The listener may broadcast, so it must never run under the history lock
        self.attach_remote_close(&subscriber);
        self.metrics.record_registration();
        self.metrics.record_replayed(missed.len());
        tracing::debug!(
            target_id = %subscriber.id(),
            last_seen_id = last_seen_id,
            replayed = missed.len(),
            "Subscriber resumed"
        );

        Ok(missed.len())
    }

    /// Send a record to every live subscriber
    ///
    /// Subscribers whose send fails are evicted and, unless they were
    /// already closed, closed. Records with a non-empty id are kept for
    /// replay. Individual failures never fail the broadcast.
    ///
    /// The record enters the history before any target receives it, so
    /// `history_len` already counts it while the fan-out is running.
    pub fn broadcast(&self, record: &EventRecord) -> BroadcastReport {
        let subscribers = {
            let mut history = self.history.lock();
            let snapshot = self.registry.snapshot();
            let dropped = history.push(record);
            if dropped > 0 {
                tracing::trace!(dropped, "Replay history trimmed");
            }
            snapshot
        };

        let mut report = BroadcastReport::default();
        for subscriber in &subscribers {
            if !subscriber.is_active() {
                continue;
            }

            match subscriber.target().send(record) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    if self.evict(subscriber, &err) {
                        report.evicted += 1;
                    }
                }
            }
        }

        self.metrics
            .record_broadcast(report.delivered, report.evicted);
        report
    }

    /// Broadcast an event/data record built on the fly
    pub fn broadcast_message(&self, event: &str, data: &str) -> BroadcastReport {
        self.broadcast(&EventRecord::message(event, data))
    }

    /// Close every subscriber and clear the replay history
    pub fn close(&self) {
        let mut history = self.history.lock();
        let subscribers = self.registry.drain();

        let mut closed = 0;
        for subscriber in &subscribers {
            if subscriber.retire() {
                subscriber.target().close();
                closed += 1;
            }
        }
        history.clear();

        tracing::info!(closed, "Broadcaster closed");
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Whether any subscriber is live
    pub fn has_subscribers(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Number of records held for replay
    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// Current statistics
    pub fn stats(&self) -> BroadcastStats {
        self.metrics
            .snapshot(self.registry.len(), self.history_len())
    }

    fn handshake(
        &self,
        target: Arc<dyn Target>,
    ) -> std::result::Result<Arc<Subscriber>, HandshakeError> {
        if self.registry.contains(TargetKey::of(&target)) {
            self.metrics.record_rejected_handshake();
            return Err(HandshakeError::AlreadyRegistered(target.id().clone()));
        }

        let subscriber = Arc::new(Subscriber::new(target));
        subscriber.begin_handshake();

        let result = subscriber
            .target()
            .acknowledge()
            .map_err(HandshakeError::Acknowledge)
            .and_then(|()| {
                subscriber
                    .target()
                    .confirm_open()
                    .map_err(HandshakeError::ConfirmOpen)
            });

        if let Err(err) = result {
            subscriber.abandon();
            self.metrics.record_rejected_handshake();
            tracing::warn!(
                target_id = %subscriber.id(),
                error = %err,
                "Subscriber handshake failed"
            );
            return Err(err);
        }

        Ok(subscriber)
    }

    fn join(&self, subscriber: &Arc<Subscriber>) -> Result<()> {
        subscriber.activate();

        if !self.registry.insert(Arc::clone(subscriber)) {
            // Lost a race against a concurrent registration of the same target
            subscriber.retire();
            self.metrics.record_rejected_handshake();
            return Err(HandshakeError::AlreadyRegistered(subscriber.id().clone()).into());
        }

        tracing::info!(
            target_id = %subscriber.id(),
            subscribers = self.registry.len(),
            "Subscriber registered"
        );
        Ok(())
    }

    fn attach_remote_close(&self, subscriber: &Arc<Subscriber>) {
        let weak_subscriber = Arc::downgrade(subscriber);
        let registry = Arc::downgrade(&self.registry);
        let metrics = Arc::clone(&self.metrics);
        let listener = Arc::clone(&self.close_listener);

        subscriber.target().on_remote_close(Box::new(move || {
            let (Some(subscriber), Some(registry)) = (weak_subscriber.upgrade(), registry.upgrade())
            else {
                return;
            };
            if !subscriber.retire() {
                return;
            }

            registry.remove(subscriber.key());
            metrics.record_remote_close();
            tracing::debug!(
                target_id = %subscriber.id(),
                subscribers = registry.len(),
                "Subscriber disconnected"
            );

            let listener = listener.read().clone();
            if let Some(listener) = listener {
                listener(subscriber.id());
            }
        }));
    }

    /// Evict after a failed send; true if this call did the eviction
    fn evict(&self, subscriber: &Subscriber, err: &TargetError) -> bool {
        if !subscriber.retire() {
            return false;
        }

        self.registry.remove(subscriber.key());
        if !err.is_closed() {
            subscriber.target().close();
        }

        tracing::debug!(
            target_id = %subscriber.id(),
            error = %err,
            subscribers = self.registry.len(),
            "Subscriber evicted"
        );
        true
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
