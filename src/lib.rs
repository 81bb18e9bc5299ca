//! Server-Sent Events broadcast engine
//!
//! Fans event records out to many long-lived `text/event-stream`
//! subscribers, evicts the ones whose connection failed, and replays recent
//! history to clients that reconnect with `Last-Event-ID`.
//!
//! The engine is transport agnostic: subscribers are anything implementing
//! [`Target`]. Two adapters ship with the crate:
//!
//! - [`ChannelTarget`]: frames go through a tokio channel into an
//!   [`EventStream`] that an HTTP server turns into a response body.
//! - [`WriterTarget`]: frames are written to any `std::io::Write`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use sse_broadcast::{Broadcaster, ChannelTarget, EventRecord};
//!
//! let broadcaster = Broadcaster::new();
//!
//! let (target, mut stream) = ChannelTarget::new("client-1");
//! broadcaster.register(Arc::new(target)).unwrap();
//!
//! let record = EventRecord::builder()
//!     .event("message")
//!     .data("hello")
//!     .id("1")
//!     .build();
//! broadcaster.broadcast(&record);
//!
//! assert_eq!(&stream.try_recv().unwrap()[..], b"event: open\n\n");
//! assert_eq!(
//!     &stream.try_recv().unwrap()[..],
//!     b"event: message\ndata: hello\nid: 1\n\n"
//! );
//! ```

pub mod broadcast;
pub mod error;
pub mod event;
pub mod protocol;
pub mod registry;
pub mod stats;
pub mod target;

pub use broadcast::{BroadcastReport, Broadcaster, BroadcasterConfig};
pub use error::{Error, HandshakeError, Result, TargetError};
pub use event::{EventRecord, EventRecordBuilder};
pub use protocol::ResponseHead;
pub use stats::BroadcastStats;
pub use target::{
    ChannelTarget, EventStream, IdSource, SequentialIds, Target, TargetId, WriterTarget,
};
