//! # Handoff Statistics
//!
//! Relaxed counters for profiling. They never take part in synchronization.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a buffer.
#[derive(Debug, Default)]
pub struct HandoffStats {
    published: AtomicU64,
    consumed: AtomicU64,
    discarded: AtomicU64,
    empty_reads: AtomicU64,
}

/// Point-in-time copy of [`HandoffStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Write scopes released.
    pub published: u64,
    /// Read scopes handed out.
    pub consumed: u64,
    /// Published values replaced before any reader saw them.
    pub discarded: u64,
    /// Reads that found nothing new.
    pub empty_reads: u64,
}

impl HandoffStats {
    #[inline]
    pub(crate) fn record_publish(&self, discarded: bool) {
        self.published.fetch_add(1, Ordering::Relaxed);
        if discarded {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_read(&self, found: bool) {
        let counter = if found { &self.consumed } else { &self.empty_reads };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            empty_reads: self.empty_reads.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Values published but neither consumed nor discarded (0 or 1).
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.published
            .saturating_sub(self.consumed)
            .saturating_sub(self.discarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = HandoffStats::default();
        stats.record_publish(false);
        stats.record_publish(true);
        stats.record_read(true);
        stats.record_read(false);
        stats.record_read(false);

        let snap = stats.snapshot();
        assert_eq!(snap.published, 2);
        assert_eq!(snap.discarded, 1);
        assert_eq!(snap.consumed, 1);
        assert_eq!(snap.empty_reads, 2);
        assert_eq!(snap.pending(), 0);
    }
}
