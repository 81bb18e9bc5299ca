//! Statistics and metrics for the broadcaster

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live counters, updated lock-free from any thread
#[derive(Debug)]
pub struct BroadcastMetrics {
    started_at: Instant,
    registrations: AtomicU64,
    rejected_handshakes: AtomicU64,
    broadcasts: AtomicU64,
    deliveries: AtomicU64,
    evictions: AtomicU64,
    remote_closes: AtomicU64,
    replayed: AtomicU64,
}

impl BroadcastMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            registrations: AtomicU64::new(0),
            rejected_handshakes: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            remote_closes: AtomicU64::new(0),
            replayed: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_handshake(&self) {
        self.rejected_handshakes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_broadcast(&self, delivered: usize, evicted: usize) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_remote_close(&self) {
        self.remote_closes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replayed(&self, count: usize) {
        self.replayed.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Copy the counters
    pub fn snapshot(&self, active_subscribers: usize, history_len: usize) -> BroadcastStats {
        BroadcastStats {
            registrations: self.registrations.load(Ordering::Relaxed),
            rejected_handshakes: self.rejected_handshakes.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            remote_closes: self.remote_closes.load(Ordering::Relaxed),
            replayed: self.replayed.load(Ordering::Relaxed),
            active_subscribers,
            history_len,
            uptime: self.started_at.elapsed(),
        }
    }
}

impl Default for BroadcastMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time broadcaster statistics
#[derive(Debug, Clone, Default)]
pub struct BroadcastStats {
    /// Targets that completed registration
    pub registrations: u64,
    /// Registrations that failed before the target went live
    pub rejected_handshakes: u64,
    /// Broadcast calls
    pub broadcasts: u64,
    /// Successful per-target sends during broadcasts
    pub deliveries: u64,
    /// Targets evicted after a failed send
    pub evictions: u64,
    /// Targets removed by a remote-close signal
    pub remote_closes: u64,
    /// Records replayed to resuming subscribers
    pub replayed: u64,
    /// Current live subscribers
    pub active_subscribers: usize,
    /// Records currently held for replay
    pub history_len: usize,
    /// Time since the broadcaster was created
    pub uptime: Duration,
}

impl BroadcastStats {
    /// Average successful deliveries per broadcast
    pub fn fan_out(&self) -> f64 {
        if self.broadcasts > 0 {
            self.deliveries as f64 / self.broadcasts as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let stats = BroadcastMetrics::new().snapshot(0, 0);

        assert_eq!(stats.registrations, 0);
        assert_eq!(stats.broadcasts, 0);
        assert_eq!(stats.deliveries, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.fan_out(), 0.0);
    }

    #[test]
    fn test_record_broadcast() {
        let metrics = BroadcastMetrics::new();

        metrics.record_broadcast(3, 1);
        metrics.record_broadcast(1, 0);
        metrics.record_replayed(2);

        let stats = metrics.snapshot(1, 4);
        assert_eq!(stats.broadcasts, 2);
        assert_eq!(stats.deliveries, 4);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.replayed, 2);
        assert_eq!(stats.active_subscribers, 1);
        assert_eq!(stats.history_len, 4);
        assert_eq!(stats.fan_out(), 2.0);
    }

    #[test]
    fn test_registration_counters() {
        let metrics = BroadcastMetrics::new();

        metrics.record_registration();
        metrics.record_rejected_handshake();
        metrics.record_remote_close();

        let stats = metrics.snapshot(0, 0);
        assert_eq!(stats.registrations, 1);
        assert_eq!(stats.rejected_handshakes, 1);
        assert_eq!(stats.remote_closes, 1);
    }
}
