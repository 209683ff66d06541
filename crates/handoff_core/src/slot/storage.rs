//! Fixed array of payload cells.
//!
//! Access rights are never checked here. Whoever holds a role for an index
//! (see [`RoleWord`](crate::RoleWord)) is the only party allowed to
//! dereference that cell's pointer.

use std::cell::UnsafeCell;

use super::role::{SlotIndex, SLOT_COUNT};

/// Storage for the three payload values.
pub struct SlotStorage<T> {
    cells: [UnsafeCell<T>; SLOT_COUNT],
}

impl<T> SlotStorage<T> {
    /// Builds the three cells, calling `init` once per slot in index order.
    #[must_use]
    pub fn from_fn(mut init: impl FnMut(SlotIndex) -> T) -> Self {
        let [a, b, c] = SlotIndex::ALL;
        Self {
            cells: [
                UnsafeCell::new(init(a)),
                UnsafeCell::new(init(b)),
                UnsafeCell::new(init(c)),
            ],
        }
    }

    /// Raw pointer to a slot's payload.
    ///
    /// Dereferencing it is only sound while the caller holds the Writing
    /// role (mutable) or the Reading role (shared) for `index`.
    #[inline]
    pub(crate) fn payload_ptr(&self, index: SlotIndex) -> *mut T {
        self.cells[index.get()].get()
    }

    /// Mutable access to a slot through exclusive ownership of the storage.
    #[inline]
    pub fn get_mut(&mut self, index: SlotIndex) -> &mut T {
        self.cells[index.get()].get_mut()
    }

    /// Consumes the storage and returns the payloads in index order.
    #[must_use]
    pub fn into_inner(self) -> [T; SLOT_COUNT] {
        let [a, b, c] = self.cells;
        [a.into_inner(), b.into_inner(), c.into_inner()]
    }
}

impl<T: Default> Default for SlotStorage<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}
