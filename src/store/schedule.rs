//! Delayed catch-up reads after a mutation
//!
//! The server applies some changes lazily and a mutation of one type can show
//! up in the others (a new code changes what the book and student views show),
//! so after every mutation all three collections are read again at fixed
//! delays. Schedules are keyed by the mutated item type; arming a key again
//! replaces whatever was still pending for it.

use std::time::{Duration, Instant};

use crate::models::ItemType;

/// Offsets of the catch-up reads, measured from the mutation completing
pub const CATCH_UP_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(3),
    Duration::from_secs(10),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    key: ItemType,
    due: Instant,
}

#[derive(Debug, Default)]
pub struct RefreshSchedule {
    pending: Vec<Pending>,
}

impl RefreshSchedule {
    /// Arm the catch-up reads for a mutation of `key` completed at `now`.
    /// Returns how many pending reads of the same key were superseded.
    pub fn arm(&mut self, key: ItemType, now: Instant) -> usize {
        let cancelled = self.cancel(key);
        self.pending
            .extend(CATCH_UP_DELAYS.iter().map(|delay| Pending {
                key,
                due: now + *delay,
            }));
        cancelled
    }

    /// Drop every pending read armed for `key`
    pub fn cancel(&mut self, key: ItemType) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.key != key);
        before - self.pending.len()
    }

    /// Remove and count the reads due at `now`. Each one stands for a full
    /// refresh of all item types.
    pub fn take_due(&mut self, now: Instant) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.due > now);
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }
}
