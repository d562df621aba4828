//! Identifier types for stack entries.
//!
//! Every frame pushed onto a scope stack and every restart registered with a
//! restart registry receives an identifier. Identifiers are allocated from
//! process-wide monotonic counters, so within one thread a later registration
//! always compares greater than an earlier one. The dispatcher relies on that
//! ordering to resume a handler search below a given frame even when handler
//! callbacks have pushed or popped frames in the meantime.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_RESTART_ID: AtomicU64 = AtomicU64::new(1);

/// A unique identifier for a frame on a [`ScopeStack`](crate::scope::ScopeStack).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    /// Allocates the next frame identifier.
    #[must_use]
    pub(crate) fn next() -> Self {
        Self(NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a frame ID for testing purposes.
    #[doc(hidden)]
    #[must_use]
    pub const fn new_for_test(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FrameId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId({})", self.0)
    }
}

impl fmt::Display for FrameId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// A unique identifier for an entry in a [`RestartRegistry`](crate::restart::RestartRegistry).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RestartId(u64);

impl RestartId {
    /// Allocates the next restart identifier.
    #[must_use]
    pub(crate) fn next() -> Self {
        Self(NEXT_RESTART_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a restart ID for testing purposes.
    #[doc(hidden)]
    #[must_use]
    pub const fn new_for_test(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for RestartId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RestartId({})", self.0)
    }
}

impl fmt::Display for RestartId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}
