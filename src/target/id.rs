//! Target correlation identifiers
//!
//! Identifiers come either from the caller (e.g. derived from the inbound
//! request) or from an [`IdSource`] the caller owns and injects.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Correlation identifier of a target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(Arc<str>);

impl TargetId {
    /// Create an identifier from any string
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<u64> for TargetId {
    fn from(id: u64) -> Self {
        Self::new(id.to_string())
    }
}

/// Source of fresh target identifiers
pub trait IdSource: Send + Sync {
    /// Produce the next identifier
    fn next_id(&self) -> TargetId;
}

/// Monotonic numeric identifiers, starting at 1
///
/// Each instance counts independently.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Create a source starting at 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a source starting at `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> TargetId {
        TargetId::from(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl<F> IdSource for F
where
    F: Fn() -> TargetId + Send + Sync,
{
    fn next_id(&self) -> TargetId {
        self()
    }
}
