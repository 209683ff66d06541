//! Slot indices and role tags.

use std::fmt;

/// Number of slots in every buffer.
pub const SLOT_COUNT: usize = 3;

/// Index of one of the three slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// All slot indices in ascending order.
    pub const ALL: [Self; SLOT_COUNT] = [Self(0), Self(1), Self(2)];

    /// Creates an index, returning `None` when `raw` is out of range.
    #[inline]
    #[must_use]
    pub const fn new(raw: u8) -> Option<Self> {
        if (raw as usize) < SLOT_COUNT {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Returns the raw index (0, 1 or 2).
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns the index for array access.
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Role currently carried by a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Holds a stale payload, available to the next writer.
    #[default]
    Free,
    /// Bound to the open write scope.
    Writing,
    /// Most recently published value, not consumed yet.
    Live,
    /// Bound to the open read scope.
    Reading,
}
