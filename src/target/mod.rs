//! Subscriber transport capability
//!
//! The broadcaster only ever talks to subscribers through [`Target`]. Each
//! transport (a channel feeding an HTTP body, a raw socket, a test double)
//! implements the trait independently; the core never sees a concrete
//! connection type.
//!
//! # Contract
//!
//! - `acknowledge` prepares status `200` and the event stream headers.
//! - `confirm_open` writes the literal `event: open\n\n` sentinel.
//! - `send` writes a record's cached encoding in one piece. It fails with
//!   [`TargetError::Closed`] once the target is terminated and with
//!   [`TargetError::Transport`] for any other write failure.
//! - `close` releases the connection. It is idempotent and safe to call from
//!   any thread, including while a `send` to the same target is in flight.
//! - `on_remote_close` installs a callback run at most once when the peer
//!   disconnects on its own. If the peer is already gone the callback runs
//!   immediately. A local `close` does not trigger it.

pub mod channel;
pub mod id;
pub mod writer;

pub use channel::{ChannelTarget, EventStream};
pub use id::{IdSource, SequentialIds, TargetId};
pub use writer::WriterTarget;

use crate::error::TargetError;
use crate::event::EventRecord;

/// Callback run when the peer disconnects
pub type RemoteCloseCallback = Box<dyn FnOnce() + Send + 'static>;

/// Per-subscriber transport handle
pub trait Target: Send + Sync {
    /// Correlation identifier
    fn id(&self) -> &TargetId;

    /// Prepare the success status and framing headers
    fn acknowledge(&self) -> Result<(), TargetError>;

    /// Write the `event: open` sentinel
    fn confirm_open(&self) -> Result<(), TargetError>;

    /// Write one record
    fn send(&self, record: &EventRecord) -> Result<(), TargetError>;

    /// Write an event/data record built on the fly
    fn send_message(&self, event: &str, data: &str) -> Result<(), TargetError> {
        self.send(&EventRecord::message(event, data))
    }

    /// Release the underlying connection
    fn close(&self);

    /// Install the remote-close callback, replacing any previous one
    fn on_remote_close(&self, callback: RemoteCloseCallback);
}
