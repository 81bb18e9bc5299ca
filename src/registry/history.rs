//! Replay history for reconnecting subscribers
//!
//! A client that reconnects sends the id of the last event it saw. The
//! history keeps the most recent records that carried an id so that the
//! missed ones can be replayed before the client rejoins the live pool.
//!
//! Ids are ordered by [`HistoryKey`]: ids that parse as a non-negative
//! integer compare numerically, everything else compares as a string.

use std::collections::BTreeMap;

use crate::event::EventRecord;
use crate::protocol::constants::DEFAULT_MAX_HISTORY;

/// Normalized event id used to order the history
///
/// Numeric keys sort before literal keys, so a numeric id never lands
/// between two literal ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HistoryKey {
    /// Id made only of ASCII digits that fits in a `u64`
    Numeric(u64),
    /// Any other id
    Literal(String),
}

impl HistoryKey {
    /// Normalize a raw id
    pub fn parse(id: &str) -> Self {
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = id.parse::<u64>() {
                return HistoryKey::Numeric(value);
            }
        }
        HistoryKey::Literal(id.to_string())
    }
}

/// Bounded, id-ordered buffer of broadcast records
#[derive(Debug)]
pub struct ReplayHistory {
    max_entries: usize,
    entries: BTreeMap<HistoryKey, EventRecord>,
}

impl ReplayHistory {
    /// Create a history with the default bound
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_HISTORY)
    }

    /// Create a history holding at most `max_entries` records
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: BTreeMap::new(),
        }
    }

    /// Store a record under its id
    ///
    /// Records without a non-empty id are ignored. A record with an id that
    /// is already present replaces the earlier one. Returns the number of
    /// entries evicted to stay within the bound.
    pub fn push(&mut self, record: &EventRecord) -> usize {
        let Some(id) = record.replay_id() else {
            return 0;
        };

        self.entries.insert(HistoryKey::parse(id), record.clone());

        let mut evicted = 0;
        while self.entries.len() > self.max_entries {
            if self.entries.pop_first().is_none() {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    /// Records a client that last saw `last_seen_id` has missed
    ///
    /// Collects every record whose key is at or after the normalized
    /// `last_seen_id`, in ascending order. The first one is dropped when its
    /// id is exactly `last_seen_id`, since the client already has it.
    pub fn since(&self, last_seen_id: &str) -> Vec<EventRecord> {
        if last_seen_id.is_empty() {
            return Vec::new();
        }

        let mut missed = self.entries.range(HistoryKey::parse(last_seen_id)..).peekable();

        let already_seen = missed
            .peek()
            .map_or(false, |(_, first)| first.id() == Some(last_seen_id));
        if already_seen {
            missed.next();
        }

        missed.map(|(_, record)| record.clone()).collect()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id of the oldest stored record
    pub fn oldest_id(&self) -> Option<&str> {
        self.entries.first_key_value().and_then(|(_, r)| r.id())
    }

    /// Id of the newest stored record
    pub fn newest_id(&self) -> Option<&str> {
        self.entries.last_key_value().and_then(|(_, r)| r.id())
    }
}

impl Default for ReplayHistory {
    fn default() -> Self {
        Self::new()
    }
}
