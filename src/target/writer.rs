//! Target over a blocking writer
//!
//! Writes straight to anything implementing [`std::io::Write`], typically a
//! `TcpStream` accepted by a hand-rolled HTTP/1.1 server. The response head
//! is prepared by `acknowledge` and flushed together with the open sentinel.
//!
//! A writer has no way to learn that the peer left until a write fails, so
//! the owning server loop reports peer EOF through
//! [`WriterTarget::notify_remote_close`].

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{RemoteCloseCallback, Target, TargetId};
use crate::error::TargetError;
use crate::event::EventRecord;
use crate::protocol::constants::OPEN_FRAME;
use crate::protocol::ResponseHead;

struct WriterState<W> {
    writer: Option<W>,
    pending_head: Option<ResponseHead>,
}

/// Target writing the event stream to a `Write` implementation
pub struct WriterTarget<W: Write + Send> {
    id: TargetId,
    state: Mutex<WriterState<W>>,
    write_head: bool,
    closed: AtomicBool,
    on_remote_close: Mutex<Option<RemoteCloseCallback>>,
    remote_closed: AtomicBool,
}

impl<W: Write + Send> WriterTarget<W> {
    /// Create a target that writes an HTTP/1.1 head before the stream
    pub fn new(id: impl Into<TargetId>, writer: W) -> Self {
        Self::build(id.into(), writer, true)
    }

    /// Create a target for a writer whose HTTP head is handled elsewhere
    pub fn headless(id: impl Into<TargetId>, writer: W) -> Self {
        Self::build(id.into(), writer, false)
    }

    fn build(id: TargetId, writer: W, write_head: bool) -> Self {
        Self {
            id,
            state: Mutex::new(WriterState {
                writer: Some(writer),
                pending_head: None,
            }),
            write_head,
            closed: AtomicBool::new(false),
            on_remote_close: Mutex::new(None),
            remote_closed: AtomicBool::new(false),
        }
    }

    /// Whether the target has been closed from either side
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Report that the peer disconnected
    ///
    /// Releases the writer and runs the remote-close callback, once.
    pub fn notify_remote_close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.remote_closed.store(true, Ordering::Release);
        self.state.lock().writer.take();

        let callback = self.on_remote_close.lock().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn write_frame(&self, frame: &[u8]) -> Result<(), TargetError> {
        if self.is_closed() {
            return Err(TargetError::Closed);
        }

        let mut state = self.state.lock();
        let WriterState {
            writer,
            pending_head,
        } = &mut *state;
        let writer = writer.as_mut().ok_or(TargetError::Closed)?;

        if let Some(head) = pending_head.take() {
            writer.write_all(head.to_http1().as_bytes())?;
        }
        writer.write_all(frame)?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> Target for WriterTarget<W> {
    fn id(&self) -> &TargetId {
        &self.id
    }

    fn acknowledge(&self) -> Result<(), TargetError> {
        if self.is_closed() {
            return Err(TargetError::Closed);
        }
        if self.write_head {
            self.state.lock().pending_head = Some(ResponseHead::event_stream());
        }
        Ok(())
    }

    fn confirm_open(&self) -> Result<(), TargetError> {
        self.write_frame(OPEN_FRAME)
    }

    fn send(&self, record: &EventRecord) -> Result<(), TargetError> {
        self.write_frame(record.encoded())
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(mut writer) = self.state.lock().writer.take() {
            let _ = writer.flush();
        }
        tracing::debug!(target_id = %self.id, "Writer target closed");
    }

    fn on_remote_close(&self, callback: RemoteCloseCallback) {
        let mut slot = self.on_remote_close.lock();
        if self.remote_closed.load(Ordering::Acquire) {
            drop(slot);
            callback();
        } else {
            *slot = Some(callback);
        }
    }
}
