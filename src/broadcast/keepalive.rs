//! Periodic keepalive pings
//!
//! Idle event streams get cut by proxies and load balancers. A ping record
//! keeps bytes flowing and, as a side effect, flushes out subscribers whose
//! connection died without a remote-close signal.

use std::sync::Arc;

use tokio::time::{self, Instant, MissedTickBehavior};

use super::broadcaster::Broadcaster;
use crate::event::EventRecord;

impl Broadcaster {
    /// Spawn a task broadcasting a keepalive record on every interval
    ///
    /// The first ping goes out one interval after the call. The task runs
    /// until the returned handle is aborted or the runtime shuts down.
    ///
    /// Target writes may block, so each fan-out runs on the blocking pool.
    /// The next tick waits for the previous ping to finish.
    pub fn spawn_keepalive_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let broadcaster = Arc::clone(self);
        let period = broadcaster.config().keepalive_interval;
        let ping = Arc::new(EventRecord::event_only(
            broadcaster.config().keepalive_event.as_str(),
        ));

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;

                let fan_out = Arc::clone(&broadcaster);
                let record = Arc::clone(&ping);
                match tokio::task::spawn_blocking(move || fan_out.broadcast(&record)).await {
                    Ok(report) => tracing::trace!(
                        delivered = report.delivered,
                        evicted = report.evicted,
                        "Keepalive sent"
                    ),
                    Err(e) => tracing::warn!(error = %e, "Keepalive broadcast failed"),
                }
            }
        })
    }
}
