//! Channel-backed target
//!
//! [`ChannelTarget::new`] returns the target half, which goes to the
//! broadcaster, and an [`EventStream`] half, which the HTTP layer turns into a
//! streaming response body. Sends never block: frames are queued on an
//! unbounded tokio channel and drained by whoever polls the stream.
//!
//! Dropping the [`EventStream`] (the server noticed the client went away) is
//! the remote-close signal. Closing the target ends the stream once queued
//! frames have been drained.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use super::{RemoteCloseCallback, Target, TargetId};
use crate::error::TargetError;
use crate::event::EventRecord;
use crate::protocol::constants::OPEN_FRAME;
use crate::protocol::ResponseHead;

struct Shared {
    tx: Mutex<Option<mpsc::UnboundedSender<Bytes>>>,
    head: Mutex<Option<ResponseHead>>,
    /// Set by whichever side terminates first
    closed: AtomicBool,
    /// Set when the stream half was dropped
    remote_closed: AtomicBool,
    on_remote_close: Mutex<Option<RemoteCloseCallback>>,
}

impl Shared {
    fn push(&self, frame: Bytes) -> Result<(), TargetError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TargetError::Closed);
        }

        let tx = self.tx.lock();
        match tx.as_ref() {
            Some(tx) => tx.send(frame).map_err(|_| TargetError::Closed),
            None => Err(TargetError::Closed),
        }
    }
}

/// Target half of a channel-backed subscription
pub struct ChannelTarget {
    id: TargetId,
    shared: Arc<Shared>,
}

impl ChannelTarget {
    /// Create a connected target/stream pair
    pub fn new(id: impl Into<TargetId>) -> (Self, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            tx: Mutex::new(Some(tx)),
            head: Mutex::new(None),
            closed: AtomicBool::new(false),
            remote_closed: AtomicBool::new(false),
            on_remote_close: Mutex::new(None),
        });

        let target = Self {
            id: id.into(),
            shared: Arc::clone(&shared),
        };
        let stream = EventStream { rx, shared };

        (target, stream)
    }

    /// Whether the target has been closed from either side
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ChannelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelTarget")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Target for ChannelTarget {
    fn id(&self) -> &TargetId {
        &self.id
    }

    fn acknowledge(&self) -> Result<(), TargetError> {
        if self.is_closed() {
            return Err(TargetError::Closed);
        }
        *self.shared.head.lock() = Some(ResponseHead::event_stream());
        Ok(())
    }

    fn confirm_open(&self) -> Result<(), TargetError> {
        self.shared.push(Bytes::from_static(OPEN_FRAME))
    }

    fn send(&self, record: &EventRecord) -> Result<(), TargetError> {
        self.shared.push(record.encoded().clone())
    }

    fn close(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Dropping the sender ends the stream after queued frames drain
        self.shared.tx.lock().take();
        tracing::debug!(target_id = %self.id, "Channel target closed");
    }

    fn on_remote_close(&self, callback: RemoteCloseCallback) {
        let mut slot = self.shared.on_remote_close.lock();
        if self.shared.remote_closed.load(Ordering::Acquire) {
            drop(slot);
            callback();
        } else {
            *slot = Some(callback);
        }
    }
}

/// Body half of a channel-backed subscription
///
/// Yields the encoded frames in send order. Dropping it reports a remote
/// close to the target.
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<Bytes>,
    shared: Arc<Shared>,
}

impl EventStream {
    /// Receive the next frame, or `None` once the target is closed and drained
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Receive a queued frame without waiting
    ///
    /// Returns `None` when nothing is queued or the stream has ended.
    pub fn try_recv(&mut self) -> Option<Bytes> {
        match self.rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Response head prepared by `acknowledge`, if it has run
    pub fn head(&self) -> Option<ResponseHead> {
        self.shared.head.lock().clone()
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        // A local close already happened; the peer leaving is not news
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.shared.remote_closed.store(true, Ordering::Release);
        self.shared.tx.lock().take();
        let callback = self.shared.on_remote_close.lock().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn test_handshake_frames() {
        let (target, mut stream) = ChannelTarget::new("1");

        assert!(stream.head().is_none());
        target.acknowledge().unwrap();
        target.confirm_open().unwrap();

        assert_eq!(stream.head(), Some(ResponseHead::event_stream()));
        assert_eq!(stream.try_recv().unwrap(), Bytes::from_static(b"event: open\n\n"));
        assert!(stream.try_recv().is_none());
    }

    #[test]
    fn test_send_in_order() {
        let (target, mut stream) = ChannelTarget::new("1");

        target.send(&EventRecord::message("a", "1")).unwrap();
        target.send_message("b", "2").unwrap();

        let first = tokio_test::block_on(stream.recv()).unwrap();
        let second = tokio_test::block_on(stream.recv()).unwrap();
        assert_eq!(&first[..], b"event: a\ndata: 1\n\n");
        assert_eq!(&second[..], b"event: b\ndata: 2\n\n");
    }

    #[test]
    fn test_close_is_idempotent_and_ends_stream() {
        let (target, mut stream) = ChannelTarget::new("1");

        target.send(&EventRecord::event_only("last")).unwrap();
        target.close();
        target.close();

        assert!(target.is_closed());
        assert!(matches!(
            target.send(&EventRecord::event_only("late")),
            Err(TargetError::Closed)
        ));

        // Queued frame still drains, then the stream ends
        assert!(tokio_test::block_on(stream.recv()).is_some());
        assert!(tokio_test::block_on(stream.recv()).is_none());
    }

    #[test]
    fn test_drop_stream_fires_remote_close_once() {
        let (target, stream) = ChannelTarget::new("1");
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        target.on_remote_close(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        drop(stream);
        target.close();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(matches!(
            target.send(&EventRecord::event_only("x")),
            Err(TargetError::Closed)
        ));
    }

    #[test]
    fn test_callback_after_remote_close_runs_immediately() {
        let (target, stream) = ChannelTarget::new("1");
        drop(stream);

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        target.on_remote_close(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_local_close_does_not_fire_remote_close() {
        let (target, stream) = ChannelTarget::new("1");
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        target.on_remote_close(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        target.close();
        drop(stream);

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_acknowledge_after_close_fails() {
        let (target, _stream) = ChannelTarget::new("1");
        target.close();

        assert!(matches!(target.acknowledge(), Err(TargetError::Closed)));
        assert!(matches!(target.confirm_open(), Err(TargetError::Closed)));
    }
}
