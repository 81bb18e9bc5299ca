//! Live subscriber set
//!
//! Thread-safe via `RwLock`. Broadcasts only hold the read lock long enough
//! to copy the member handles, so fan-out never runs under the lock and
//! concurrent joins and evictions never disturb an in-flight iteration.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::entry::{Subscriber, TargetKey};

/// Set of live subscribers, unique by target identity
#[derive(Default)]
pub struct SubscriberRegistry {
    members: RwLock<HashMap<TargetKey, Arc<Subscriber>>>,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber
    ///
    /// Returns false, leaving the existing entry in place, if the same
    /// target is already a member.
    pub fn insert(&self, subscriber: Arc<Subscriber>) -> bool {
        let mut members = self.members.write();

        if members.contains_key(&subscriber.key()) {
            return false;
        }

        members.insert(subscriber.key(), subscriber);
        true
    }

    /// Remove a subscriber; removing an absent one is a no-op
    pub fn remove(&self, key: TargetKey) -> Option<Arc<Subscriber>> {
        self.members.write().remove(&key)
    }

    /// Whether the target is a member
    pub fn contains(&self, key: TargetKey) -> bool {
        self.members.read().contains_key(&key)
    }

    /// Point-in-time copy of the members
    pub fn snapshot(&self) -> Vec<Arc<Subscriber>> {
        self.members.read().values().cloned().collect()
    }

    /// Remove and return every member
    pub fn drain(&self) -> Vec<Arc<Subscriber>> {
        let mut members = self.members.write();
        members.drain().map(|(_, subscriber)| subscriber).collect()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Whether there are no members
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}
