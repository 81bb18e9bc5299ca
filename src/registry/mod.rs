//! Subscriber registry and replay history
//!
//! The registry is the set of live subscribers a broadcast fans out to. The
//! history keeps the last few records that carried an id, so a client that
//! reconnects with `Last-Event-ID` can catch up without a gap.
//!
//! # Architecture
//!
//! ```text
//!                            Arc<Broadcaster>
//!                     ┌─────────────────────────────┐
//!                     │ registry: SubscriberRegistry│
//!                     │   HashMap<TargetKey,        │
//!                     │     Arc<Subscriber>>        │
//!                     │ history: Mutex<             │
//!                     │   ReplayHistory>            │
//!                     └──────────────┬──────────────┘
//!                                    │ snapshot()
//!         ┌──────────────────────────┼──────────────────────────┐
//!         │                          │                          │
//!         ▼                          ▼                          ▼
//!    [Subscriber]               [Subscriber]               [Subscriber]
//!    target.send()              target.send()              target.send()
//!         │                          │                          │
//!         └──► ChannelTarget ──► EventStream ──► HTTP body ──► client
//! ```
//!
//! # Zero-Copy Design
//!
//! A record is encoded once into `bytes::Bytes`. Every subscriber queue
//! shares that allocation; sending only bumps a reference count.

pub mod entry;
pub mod history;
pub mod store;

pub use entry::{Subscriber, TargetKey, TargetPhase};
pub use history::{HistoryKey, ReplayHistory};
pub use store::SubscriberRegistry;
