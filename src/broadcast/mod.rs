//! Broadcast engine
//!
//! [`Broadcaster`] owns the live subscriber pool and the replay history.
//! Registration runs the handshake (acknowledge, open sentinel, optional
//! welcome or replay) before a target joins; broadcasting writes one encoded
//! record to every live target and evicts the ones that fail.

pub mod broadcaster;
pub mod config;
mod keepalive;

pub use broadcaster::{BroadcastReport, Broadcaster, CloseListener};
pub use config::BroadcasterConfig;
