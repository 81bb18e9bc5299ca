//! Event records and their wire encoding

mod encode;
pub mod record;

pub use record::{EventRecord, EventRecordBuilder};
