//! # Handoff Buffer
//!
//! Latest-value handoff from one producer thread to one consumer thread.
//!
//! ## Safety Note
//!
//! Payload cells are shared through `UnsafeCell`. Exclusive access is
//! granted by role, never by a lock the caller holds.

#![allow(unsafe_code)]
//!
//! ## Architecture
//!
//! ```text
//!                 ┌────────────────────────────────────┐
//!                 │          HandoffBuffer<T>          │
//!                 │                                    │
//!                 │  ┌────────┐ ┌────────┐ ┌────────┐  │
//!                 │  │ slot 0 │ │ slot 1 │ │ slot 2 │  │
//!                 │  └────────┘ └────────┘ └────────┘  │
//!                 │  ┌──────────────────────────────┐  │
//!                 │  │  RoleWord (writing/live/read) │  │
//!                 │  └──────────────────────────────┘  │
//!                 └────────────────────────────────────┘
//!                          │                  │
//!                          ▼                  ▼
//!                 ┌────────────────┐  ┌────────────────┐
//!                 │   WriteScope   │  │   ReadScope    │
//!                 │   (producer)   │  │   (consumer)   │
//!                 └────────────────┘  └────────────────┘
//! ```
//!
//! The writer always lands on a slot that is neither Live nor Reading, so it
//! never waits for the reader. The reader only ever claims the Live slot, so
//! it never sees a write in progress.

use std::fmt;

use super::controller::{AtomicRoles, RoleController};
use super::scope::{ReadScope, WriteScope};
use super::word::RoleWord;
use crate::error::{UsageError, UsageResult};
use crate::slot::{Role, SlotIndex, SlotStorage, SLOT_COUNT};
use crate::stats::{HandoffStats, StatsSnapshot};

/// Triple-slot handoff buffer.
///
/// ## Usage
///
/// ```rust
/// use handoff_core::HandoffBuffer;
///
/// let buffer = HandoffBuffer::<u64>::new();
/// assert!(buffer.acquire_read().is_none());
///
/// {
///     let mut write = buffer.acquire_write();
///     *write = 42;
/// } // published here
///
/// let read = buffer.acquire_read().unwrap();
/// assert_eq!(*read, 42);
/// drop(read);
///
/// // Each published value is delivered once.
/// assert!(buffer.acquire_read().is_none());
/// ```
pub struct HandoffBuffer<T, C = AtomicRoles> {
    slots: SlotStorage<T>,
    roles: C,
    stats: HandoffStats,
}

// SAFETY: a payload cell is only dereferenced by the holder of its Writing
// or Reading role, and the `unsafe trait RoleController` contract guarantees
// the controller never hands one slot to both. That is the `Mutex<T>`
// contract, so `T: Send` is enough.
unsafe impl<T: Send, C: RoleController> Sync for HandoffBuffer<T, C> {}

impl<T: Default> HandoffBuffer<T> {
    /// Creates a buffer with default payloads and the lock-free controller.
    #[must_use]
    pub fn new() -> Self {
        Self::with_controller()
    }
}

impl<T: Default> Default for HandoffBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default, C: RoleController> HandoffBuffer<T, C> {
    /// Creates a buffer with default payloads and controller `C`.
    #[must_use]
    pub fn with_controller() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T, C: RoleController> HandoffBuffer<T, C> {
    /// Creates a buffer whose slots are initialised by `init`.
    ///
    /// The initial values are never observable by a reader; they only give
    /// the producer something to overwrite (or reuse in place).
    #[must_use]
    pub fn from_fn(init: impl FnMut(SlotIndex) -> T) -> Self {
        Self {
            slots: SlotStorage::from_fn(init),
            roles: C::default(),
            stats: HandoffStats::default(),
        }
    }

    /// Opens a write scope.
    ///
    /// Never blocks. The scope publishes its slot when dropped.
    ///
    /// # Errors
    ///
    /// [`UsageError::WriteAlreadyOpen`] if a write scope is already open.
    pub fn try_acquire_write(&self) -> UsageResult<WriteScope<'_, T, C>> {
        let slot = self.roles.transition(RoleWord::begin_write)?;
        Ok(WriteScope::new(self, slot))
    }

    /// Opens a write scope.
    ///
    /// # Panics
    ///
    /// Panics if a write scope is already open.
    #[must_use]
    #[track_caller]
    pub fn acquire_write(&self) -> WriteScope<'_, T, C> {
        self.try_acquire_write().unwrap_or_else(|err| usage_fault(err))
    }

    /// Claims the latest unread value.
    ///
    /// Never blocks. Returns `Ok(None)` when nothing was published since the
    /// last read.
    ///
    /// # Errors
    ///
    /// [`UsageError::ReadAlreadyOpen`] if a read scope is already open.
    pub fn try_acquire_read(&self) -> UsageResult<Option<ReadScope<'_, T, C>>> {
        let slot = self.roles.transition(RoleWord::begin_read)?;
        self.stats.record_read(slot.is_some());
        Ok(slot.map(|slot| ReadScope::new(self, slot)))
    }

    /// Claims the latest unread value, or `None` if there is nothing new.
    ///
    /// # Panics
    ///
    /// Panics if a read scope is already open.
    #[must_use]
    #[track_caller]
    pub fn acquire_read(&self) -> Option<ReadScope<'_, T, C>> {
        self.try_acquire_read().unwrap_or_else(|err| usage_fault(err))
    }

    /// Replaces the payload wholesale and publishes it.
    ///
    /// Returns `true` if an unread value was discarded.
    ///
    /// # Panics
    ///
    /// Panics if a write scope is already open.
    #[track_caller]
    pub fn publish(&self, value: T) -> bool {
        let mut scope = self.acquire_write();
        *scope = value;
        scope.publish()
    }

    /// Mutates the write slot in place, then publishes it.
    ///
    /// The slot holds whatever stale value it last carried, not the most
    /// recently published one.
    ///
    /// # Panics
    ///
    /// Panics if a write scope is already open.
    #[track_caller]
    pub fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut scope = self.acquire_write();
        f(&mut *scope)
    }

    /// Runs `f` on the latest unread value, if any.
    ///
    /// # Panics
    ///
    /// Panics if a read scope is already open.
    #[track_caller]
    pub fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let scope = self.acquire_read()?;
        Some(f(&*scope))
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Current role assignment.
    #[must_use]
    pub fn role_word(&self) -> RoleWord {
        self.roles.load()
    }

    /// Roles of all three slots in index order.
    #[must_use]
    pub fn roles(&self) -> [Role; SLOT_COUNT] {
        self.role_word().roles()
    }

    /// True when a published value is waiting for the reader.
    ///
    /// Diagnostics only: by the time the caller acts on it, it may be stale.
    #[must_use]
    pub fn has_unread(&self) -> bool {
        self.role_word().live().is_some()
    }

    /// True while a write scope is open.
    #[must_use]
    pub fn is_writing(&self) -> bool {
        self.role_word().writing().is_some()
    }

    /// True while a read scope is open.
    #[must_use]
    pub fn is_reading(&self) -> bool {
        self.role_word().reading().is_some()
    }

    /// Consumes the buffer and returns the unread value, if any.
    #[must_use]
    pub fn into_unread(self) -> Option<T> {
        let live = self.roles.load().live()?;
        self.slots.into_inner().into_iter().nth(live.get())
    }

    #[inline]
    pub(crate) fn payload_ptr(&self, slot: SlotIndex) -> *mut T {
        self.slots.payload_ptr(slot)
    }

    pub(crate) fn finish_write(&self, slot: SlotIndex) -> bool {
        let discarded = self
            .roles
            .transition(RoleWord::end_write)
            .unwrap_or_else(|err| usage_fault(err));
        if let Some(old) = discarded {
            tracing::trace!(
                published = %slot,
                discarded = %old,
                "live value replaced before it was read"
            );
        }
        self.stats.record_publish(discarded.is_some());
        discarded.is_some()
    }

    pub(crate) fn finish_read(&self, slot: SlotIndex) {
        let freed = self
            .roles
            .transition(RoleWord::end_read)
            .unwrap_or_else(|err| usage_fault(err));
        debug_assert_eq!(freed, slot, "read scope released a slot it did not hold");
    }
}

impl<T, C: RoleController> fmt::Debug for HandoffBuffer<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoffBuffer")
            .field("controller", &C::NAME)
            .field("roles", &self.role_word())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Reports invalid usage and stops the caller.
#[cold]
#[track_caller]
fn usage_fault(err: UsageError) -> ! {
    tracing::error!(%err, "invalid handoff usage");
    panic!("invalid handoff usage: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::LockedRoles;

    #[test]
    fn test_buffer_creation() {
        let buffer = HandoffBuffer::<u32>::new();
        assert_eq!(buffer.roles(), [Role::Free; 3]);
        assert!(!buffer.has_unread());
        assert!(!buffer.is_writing());
        assert!(!buffer.is_reading());
        assert_eq!(buffer.stats(), StatsSnapshot::default());
    }

    #[test]
    fn test_write_scope_publishes_on_drop() {
        let buffer = HandoffBuffer::<u32>::new();
        {
            let mut write = buffer.acquire_write();
            assert!(buffer.is_writing());
            assert_eq!(buffer.roles()[write.slot().get()], Role::Writing);
            *write = 7;
        }
        assert!(!buffer.is_writing());
        assert!(buffer.has_unread());
        assert_eq!(buffer.stats().published, 1);
    }

    #[test]
    fn test_read_scope_frees_on_drop() {
        let buffer = HandoffBuffer::<u32>::new();
        buffer.publish(3);
        {
            let read = buffer.acquire_read().unwrap();
            assert!(buffer.is_reading());
            assert!(!buffer.has_unread());
            assert_eq!(*read, 3);
        }
        assert_eq!(buffer.roles(), [Role::Free; 3]);
        assert!(buffer.acquire_read().is_none());
    }

    #[test]
    fn test_write_while_reading_uses_third_slot() {
        let buffer = HandoffBuffer::<u32>::new();
        buffer.publish(1);
        let read = buffer.acquire_read().unwrap();
        buffer.publish(2);
        let write = buffer.acquire_write();

        let mut slots = [read.slot(), write.slot()].to_vec();
        slots.extend(buffer.role_word().live());
        slots.sort();
        assert_eq!(slots, SlotIndex::ALL.to_vec());
        assert_eq!(*read, 1);
    }

    #[test]
    fn test_publish_reports_discard() {
        let buffer = HandoffBuffer::<u32>::new();
        assert!(!buffer.publish(1));
        assert!(buffer.publish(2));
        assert_eq!(buffer.read_with(|v| *v), Some(2));
        assert!(!buffer.publish(3));

        let stats = buffer.stats();
        assert_eq!(stats.published, 3);
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.consumed, 1);
        assert_eq!(stats.pending(), 1);
    }

    #[test]
    fn test_write_with_reuses_slot_in_place() {
        let buffer: HandoffBuffer<Vec<u32>> = HandoffBuffer::new();
        let len = buffer.write_with(|samples| {
            samples.clear();
            samples.extend([1, 2, 3]);
            samples.len()
        });
        assert_eq!(len, 3);
        assert_eq!(buffer.read_with(Vec::clone), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_try_acquire_reports_usage_errors() {
        let buffer = HandoffBuffer::<u32>::new();
        let _write = buffer.acquire_write();
        assert_eq!(
            buffer.try_acquire_write().err(),
            Some(UsageError::WriteAlreadyOpen)
        );
    }

    #[test]
    fn test_into_unread() {
        let buffer = HandoffBuffer::<String>::new();
        buffer.publish("first".to_owned());
        buffer.publish("second".to_owned());
        assert_eq!(buffer.into_unread().as_deref(), Some("second"));

        let empty = HandoffBuffer::<String>::new();
        assert_eq!(empty.into_unread(), None);
    }

    #[test]
    fn test_locked_controller() {
        let buffer = HandoffBuffer::<u8, LockedRoles>::with_controller();
        buffer.publish(9);
        assert_eq!(buffer.read_with(|v| *v), Some(9));
        assert!(format!("{buffer:?}").contains("locked"));
    }

    #[test]
    #[should_panic(expected = "write scope already open")]
    fn test_double_write_panics() {
        let buffer = HandoffBuffer::<u32>::new();
        let _write1 = buffer.acquire_write();
        let _write2 = buffer.acquire_write();
    }

    #[test]
    #[should_panic(expected = "read scope already open")]
    fn test_double_read_panics() {
        let buffer = HandoffBuffer::<u32>::new();
        buffer.publish(1);
        let _read1 = buffer.acquire_read();
        let _read2 = buffer.acquire_read();
    }
}
