//! # Scoped Slot Access
//!
//! Both handles release their slot on every exit path: normal completion,
//! early return, or unwinding. Releasing consumes the handle, so a double
//! release or a use after release does not compile.

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

use super::buffer::HandoffBuffer;
use super::controller::{AtomicRoles, RoleController};
use crate::slot::SlotIndex;

/// Exclusive mutable access to the slot being written.
///
/// ## Usage
///
/// ```rust
/// use handoff_core::HandoffBuffer;
///
/// let buffer = HandoffBuffer::<Vec<f32>>::new();
///
/// let mut write = buffer.acquire_write();
/// write.clear();
/// write.extend([1.0, 2.0]);
/// // Dropping publishes. `publish` does the same and reports overwrites.
/// let discarded = write.publish();
/// assert!(!discarded);
/// ```
#[must_use = "dropping a write scope publishes it immediately"]
pub struct WriteScope<'a, T, C: RoleController = AtomicRoles> {
    buffer: &'a HandoffBuffer<T, C>,
    slot: SlotIndex,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T, C: RoleController> WriteScope<'a, T, C> {
    pub(crate) fn new(buffer: &'a HandoffBuffer<T, C>, slot: SlotIndex) -> Self {
        Self {
            buffer,
            slot,
            _marker: PhantomData,
        }
    }

    /// Slot this scope writes to (for debugging).
    #[inline]
    #[must_use]
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Publishes now instead of at the end of the scope.
    ///
    /// Returns `true` if an unread value was discarded to make room.
    pub fn publish(self) -> bool {
        let this = ManuallyDrop::new(self);
        this.buffer.finish_write(this.slot)
    }
}

impl<T, C: RoleController> Deref for WriteScope<'_, T, C> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: we hold the Writing role for `slot`; nobody else touches it.
        unsafe { &*self.buffer.payload_ptr(self.slot) }
    }
}

impl<T, C: RoleController> DerefMut for WriteScope<'_, T, C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as above, and `&mut self` rules out aliasing through this scope.
        unsafe { &mut *self.buffer.payload_ptr(self.slot) }
    }
}

impl<T, C: RoleController> Drop for WriteScope<'_, T, C> {
    fn drop(&mut self) {
        self.buffer.finish_write(self.slot);
    }
}

impl<T: fmt::Debug, C: RoleController> fmt::Debug for WriteScope<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteScope")
            .field("slot", &self.slot)
            .field("payload", &**self)
            .finish()
    }
}

/// Shared access to the slot being consumed.
///
/// The producer is always working on a different slot for as long as this
/// scope is alive.
#[must_use = "dropping a read scope releases the value immediately"]
pub struct ReadScope<'a, T, C: RoleController = AtomicRoles> {
    buffer: &'a HandoffBuffer<T, C>,
    slot: SlotIndex,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T, C: RoleController> ReadScope<'a, T, C> {
    pub(crate) fn new(buffer: &'a HandoffBuffer<T, C>, slot: SlotIndex) -> Self {
        Self {
            buffer,
            slot,
            _marker: PhantomData,
        }
    }

    /// Slot this scope reads from (for debugging).
    #[inline]
    #[must_use]
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Releases the slot now instead of at the end of the scope.
    pub fn release(self) {
        let this = ManuallyDrop::new(self);
        this.buffer.finish_read(this.slot);
    }
}

impl<T, C: RoleController> Deref for ReadScope<'_, T, C> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: we hold the Reading role for `slot`; the writer is elsewhere.
        unsafe { &*self.buffer.payload_ptr(self.slot) }
    }
}

impl<T, C: RoleController> Drop for ReadScope<'_, T, C> {
    fn drop(&mut self) {
        self.buffer.finish_read(self.slot);
    }
}

impl<T: fmt::Debug, C: RoleController> fmt::Debug for ReadScope<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadScope")
            .field("slot", &self.slot)
            .field("payload", &**self)
            .finish()
    }
}
