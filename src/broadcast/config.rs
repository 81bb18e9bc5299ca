//! Broadcaster configuration

use std::time::Duration;

use crate::protocol::constants::*;

/// Broadcaster configuration options
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    /// Maximum number of records kept for replay
    pub max_history: usize,

    /// Interval between keepalive pings
    pub keepalive_interval: Duration,

    /// Event name of keepalive pings
    pub keepalive_event: String,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            keepalive_event: PING_EVENT.to_string(),
        }
    }
}

impl BroadcasterConfig {
    /// Set the replay history bound
    pub fn max_history(mut self, max: usize) -> Self {
        self.max_history = max;
        self
    }

    /// Set the keepalive interval
    ///
    /// Clamped to at least one millisecond.
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the keepalive event name
    pub fn keepalive_event(mut self, event: impl Into<String>) -> Self {
        self.keepalive_event = event.into();
        self
    }
}
