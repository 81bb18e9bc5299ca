//! Broadcaster statistics

pub mod metrics;

pub use metrics::{BroadcastMetrics, BroadcastStats};
