//! Subscriber entry and liveness phase
//!
//! Each registered target is wrapped in a [`Subscriber`] that tracks its
//! phase. Leaving `Active` is a single compare-and-swap, so when a
//! broadcast eviction races a remote-close signal exactly one of them wins
//! and performs the removal.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::target::{Target, TargetId};

/// Liveness phase of a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPhase {
    /// Wrapped but no handshake attempted yet
    Unregistered,
    /// Acknowledge/open in progress
    Handshaking,
    /// Live member of the broadcast pool
    Active,
    /// Terminal
    Closed,
}

impl TargetPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TargetPhase::Unregistered,
            1 => TargetPhase::Handshaking,
            2 => TargetPhase::Active,
            _ => TargetPhase::Closed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            TargetPhase::Unregistered => 0,
            TargetPhase::Handshaking => 1,
            TargetPhase::Active => 2,
            TargetPhase::Closed => 3,
        }
    }
}

/// Identity of a target inside the registry
///
/// Derived from the address of the shared target allocation, which stays
/// unique for as long as the registry holds the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetKey(usize);

impl TargetKey {
    /// Key of a shared target handle
    pub fn of(target: &Arc<dyn Target>) -> Self {
        Self(Arc::as_ptr(target) as *const () as usize)
    }
}

/// A target together with its liveness phase
pub struct Subscriber {
    key: TargetKey,
    target: Arc<dyn Target>,
    phase: AtomicU8,
}

impl Subscriber {
    /// Wrap a target in the `Unregistered` phase
    pub fn new(target: Arc<dyn Target>) -> Self {
        Self {
            key: TargetKey::of(&target),
            target,
            phase: AtomicU8::new(TargetPhase::Unregistered.as_u8()),
        }
    }

    /// Registry key
    pub fn key(&self) -> TargetKey {
        self.key
    }

    /// The wrapped target
    pub fn target(&self) -> &Arc<dyn Target> {
        &self.target
    }

    /// Target identifier
    pub fn id(&self) -> &TargetId {
        self.target.id()
    }

    /// Current phase
    pub fn phase(&self) -> TargetPhase {
        TargetPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Whether the subscriber is a live member
    pub fn is_active(&self) -> bool {
        self.phase() == TargetPhase::Active
    }

    /// `Unregistered -> Handshaking`
    pub fn begin_handshake(&self) -> bool {
        self.transition(TargetPhase::Unregistered, TargetPhase::Handshaking)
    }

    /// `Handshaking -> Active`
    pub fn activate(&self) -> bool {
        self.transition(TargetPhase::Handshaking, TargetPhase::Active)
    }

    /// `Handshaking -> Closed`, discarding a failed handshake
    pub fn abandon(&self) -> bool {
        self.transition(TargetPhase::Handshaking, TargetPhase::Closed)
    }

    /// `Active -> Closed`
    ///
    /// Returns true for exactly one caller; that caller owns the cleanup.
    pub fn retire(&self) -> bool {
        self.transition(TargetPhase::Active, TargetPhase::Closed)
    }

    fn transition(&self, from: TargetPhase, to: TargetPhase) -> bool {
        self.phase
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", self.id())
            .field("phase", &self.phase())
            .finish()
    }
}
