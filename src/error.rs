//! Error types
//!
//! Three failure kinds exist:
//!
//! - [`TargetError::Transport`]: a write to a subscriber failed. During a
//!   broadcast this is routine churn and only causes the target to be evicted.
//! - [`TargetError::Closed`]: the target was already terminated (for example the
//!   peer went away concurrently). Evicted without closing it again.
//! - [`HandshakeError`]: registration failed before the target went live.

use std::io;

use crate::target::TargetId;

/// Error returned by a single [`Target`](crate::target::Target) operation
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// Writing to the underlying transport failed
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The target has already been closed
    #[error("connection already closed")]
    Closed,
}

impl TargetError {
    /// Whether this error means the target was already terminated
    pub fn is_closed(&self) -> bool {
        matches!(self, TargetError::Closed)
    }
}

/// Error raised while establishing a subscription
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    /// `acknowledge` failed
    #[error("acknowledge failed: {0}")]
    Acknowledge(#[source] TargetError),

    /// Writing the open sentinel failed
    #[error("open confirmation failed: {0}")]
    ConfirmOpen(#[source] TargetError),

    /// The subscriber went away before the welcome record was delivered
    #[error("welcome delivery failed: {0}")]
    Welcome(#[source] TargetError),

    /// The target is already a live subscriber
    #[error("target already registered: {0}")]
    AlreadyRegistered(TargetId),
}

/// Error type for broadcaster operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Registration failed before the target went live
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// Replaying history to a resuming subscriber failed
    #[error("replay of event {id} failed: {source}")]
    Replay {
        /// Id of the record that could not be delivered
        id: String,
        #[source]
        source: TargetError,
    },
}

/// Result type for broadcaster operations
pub type Result<T> = std::result::Result<T, Error>;
