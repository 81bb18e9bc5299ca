//! Immutable event records
//!
//! A record is serialized once when it is built. Every send writes the same
//! cached [`Bytes`], so broadcasting a record to many targets only bumps a
//! reference count per target.

use std::fmt;

use bytes::Bytes;

use super::encode::{encode_fields, strip_newlines};

/// One event stream message
///
/// Built through [`EventRecord::builder`] or the convenience constructors.
/// Two records built from the same field values are equal and encode to the
/// same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    event: Option<String>,
    data: Option<String>,
    id: Option<String>,
    retry: Option<u64>,
    encoded: Bytes,
}

impl EventRecord {
    /// Start building a record
    pub fn builder() -> EventRecordBuilder {
        EventRecordBuilder::default()
    }

    /// A record carrying only an event name (keepalive pings)
    pub fn event_only(event: impl Into<String>) -> Self {
        Self::builder().event(event).build()
    }

    /// A record with an event name and a data payload
    pub fn message(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self::builder().event(event).data(data).build()
    }

    /// Event name, line feeds removed
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// Data payload as given, possibly spanning several lines
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Event id, line feeds removed
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Reconnection delay hint in milliseconds
    pub fn retry(&self) -> Option<u64> {
        self.retry
    }

    /// Id of the record if it is present and non-empty
    pub fn replay_id(&self) -> Option<&str> {
        self.id().filter(|id| !id.is_empty())
    }

    /// Cached wire encoding
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    /// Length of the wire encoding in bytes
    pub fn encoded_len(&self) -> usize {
        self.encoded.len()
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Encoding is assembled from `&str` fields only
        f.write_str(&String::from_utf8_lossy(&self.encoded))
    }
}

/// Builder for [`EventRecord`]
#[derive(Debug, Clone, Default)]
pub struct EventRecordBuilder {
    event: Option<String>,
    data: Option<String>,
    id: Option<String>,
    retry: Option<u64>,
}

impl EventRecordBuilder {
    /// Set the event name
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the data payload
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the event id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the reconnection delay in milliseconds
    pub fn retry(mut self, millis: u64) -> Self {
        self.retry = Some(millis);
        self
    }

    /// Serialize and freeze the record
    pub fn build(self) -> EventRecord {
        let event = self.event.as_deref().map(strip_newlines);
        let id = self.id.as_deref().map(strip_newlines);
        let encoded = encode_fields(
            event.as_deref(),
            self.data.as_deref(),
            self.retry,
            id.as_deref(),
        );

        EventRecord {
            event,
            data: self.data,
            id,
            retry: self.retry,
            encoded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record_encoding() {
        let record = EventRecord::builder()
            .event("e")
            .data("l1\nl2")
            .id("5")
            .retry(3000)
            .build();

        assert_eq!(
            &record.encoded()[..],
            b"event: e\ndata: l1\ndata: l2\nretry: 3000\nid: 5\n\n"
        );
    }

    #[test]
    fn test_data_only() {
        let record = EventRecord::builder().data("1 2 3 4").build();

        assert_eq!(record.data(), Some("1 2 3 4"));
        assert!(record.event().is_none());
        assert!(record.id().is_none());
        assert!(record.retry().is_none());
        assert_eq!(record.to_string(), "data: 1 2 3 4\n\n");
    }

    #[test]
    fn test_multiline_data() {
        let record = EventRecord::builder()
            .data("1 2 3 4\n5 6 7 8\n\n9 10 11 12")
            .build();

        assert_eq!(record.data(), Some("1 2 3 4\n5 6 7 8\n\n9 10 11 12"));
        assert_eq!(
            record.to_string(),
            "data: 1 2 3 4\ndata: 5 6 7 8\ndata: \ndata: 9 10 11 12\n\n"
        );
    }

    #[test]
    fn test_event_newlines_stripped() {
        let record = EventRecord::builder().event("1 2\n 3 4").build();

        assert_eq!(record.event(), Some("1 2 3 4"));
        assert_eq!(record.to_string(), "event: 1 2 3 4\n\n");
    }

    #[test]
    fn test_id_newlines_stripped() {
        let record = EventRecord::builder().id("1\n 2 3 4").build();

        assert_eq!(record.id(), Some("1 2 3 4"));
        assert_eq!(record.to_string(), "id: 1 2 3 4\n\n");
    }

    #[test]
    fn test_retry_only() {
        let record = EventRecord::builder().retry(1234).build();

        assert_eq!(record.retry(), Some(1234));
        assert_eq!(record.to_string(), "retry: 1234\n\n");
    }

    #[test]
    fn test_event_only() {
        let record = EventRecord::event_only("ping");

        assert_eq!(record.to_string(), "event: ping\n\n");
        assert!(record.replay_id().is_none());
    }

    #[test]
    fn test_message() {
        let record = EventRecord::message("message", "hi");
        assert_eq!(record.to_string(), "event: message\ndata: hi\n\n");
    }

    #[test]
    fn test_equal_content_equal_records() {
        let a = EventRecord::builder().event("x").data("y").id("1").build();
        let b = EventRecord::builder().event("x").data("y").id("1").build();

        assert_eq!(a, b);
        assert_eq!(a.encoded(), b.encoded());
    }

    #[test]
    fn test_clone_shares_encoding() {
        let record = EventRecord::message("m", "payload");
        let copy = record.clone();

        assert_eq!(record.encoded().as_ptr(), copy.encoded().as_ptr());
        assert_eq!(record.encoded_len(), copy.encoded_len());
    }

    #[test]
    fn test_replay_id_ignores_empty() {
        let record = EventRecord::builder().id("").data("x").build();

        assert_eq!(record.id(), Some(""));
        assert!(record.replay_id().is_none());
    }
}
