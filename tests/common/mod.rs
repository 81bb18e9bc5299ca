#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use sse_broadcast::target::RemoteCloseCallback;
use sse_broadcast::{EventRecord, Target, TargetError, TargetId};
use tracing_subscriber::EnvFilter;

/// Install a test log subscriber once; filter with `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory target that records frames and fails on demand
pub struct MockTarget {
    id: TargetId,
    frames: Mutex<Vec<Bytes>>,
    /// Successful record sends allowed before every later send fails
    fail_after: Option<usize>,
    sent: AtomicUsize,
    force_fail: AtomicBool,
    closes: AtomicUsize,
    remote_close: Mutex<Option<RemoteCloseCallback>>,
}

impl MockTarget {
    pub fn new(id: impl Into<TargetId>) -> Arc<Self> {
        Self::build(id.into(), None)
    }

    /// Target whose sends fail once `sends` records were delivered
    pub fn failing_after(id: impl Into<TargetId>, sends: usize) -> Arc<Self> {
        Self::build(id.into(), Some(sends))
    }

    fn build(id: TargetId, fail_after: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            id,
            frames: Mutex::new(Vec::new()),
            fail_after,
            sent: AtomicUsize::new(0),
            force_fail: AtomicBool::new(false),
            closes: AtomicUsize::new(0),
            remote_close: Mutex::new(None),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.force_fail.store(failing, Ordering::SeqCst);
    }

    /// Simulate the peer going away
    pub fn disconnect(&self) {
        let callback = self.remote_close.lock().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn frames(&self) -> Vec<Bytes> {
        self.frames.lock().clone()
    }

    /// Ids of the received records, in arrival order
    pub fn ids(&self) -> Vec<String> {
        self.frames
            .lock()
            .iter()
            .filter_map(|frame| {
                std::str::from_utf8(frame)
                    .ok()?
                    .lines()
                    .find_map(|line| line.strip_prefix("id: "))
                    .map(str::to_string)
            })
            .collect()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Target for MockTarget {
    fn id(&self) -> &TargetId {
        &self.id
    }

    fn acknowledge(&self) -> Result<(), TargetError> {
        Ok(())
    }

    fn confirm_open(&self) -> Result<(), TargetError> {
        self.frames.lock().push(Bytes::from_static(b"event: open\n\n"));
        Ok(())
    }

    fn send(&self, record: &EventRecord) -> Result<(), TargetError> {
        if self.force_fail.load(Ordering::SeqCst) {
            return Err(TargetError::Transport(io::ErrorKind::BrokenPipe.into()));
        }
        if let Some(limit) = self.fail_after {
            if self.sent.fetch_add(1, Ordering::SeqCst) >= limit {
                return Err(TargetError::Transport(
                    io::ErrorKind::ConnectionReset.into(),
                ));
            }
        }
        self.frames.lock().push(record.encoded().clone());
        Ok(())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_remote_close(&self, callback: RemoteCloseCallback) {
        *self.remote_close.lock() = Some(callback);
    }
}

pub fn numbered(id: u64) -> EventRecord {
    EventRecord::builder()
        .event("test")
        .data(format!("record {id}"))
        .id(id.to_string())
        .build()
}
