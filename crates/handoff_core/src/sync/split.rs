//! # Producer / Consumer Halves
//!
//! Splitting a buffer hands out exactly one producer and one consumer.
//! Both acquire through `&mut self`, so opening a second scope on the same
//! role is rejected by the borrow checker instead of at runtime.

use std::sync::Arc;

use super::buffer::HandoffBuffer;
use super::controller::{AtomicRoles, RoleController};
use super::scope::{ReadScope, WriteScope};
use crate::stats::StatsSnapshot;

impl<T, C: RoleController> HandoffBuffer<T, C> {
    /// Splits the buffer into its producer and consumer halves.
    ///
    /// ```rust
    /// use handoff_core::HandoffBuffer;
    ///
    /// let (mut producer, mut consumer) = HandoffBuffer::<u32>::new().split();
    ///
    /// let worker = std::thread::spawn(move || {
    ///     producer.publish(7);
    /// });
    /// worker.join().unwrap();
    ///
    /// assert_eq!(consumer.read_with(|v| *v), Some(7));
    /// ```
    #[must_use]
    pub fn split(self) -> (Producer<T, C>, Consumer<T, C>) {
        let shared = Arc::new(self);
        (
            Producer {
                buffer: Arc::clone(&shared),
            },
            Consumer { buffer: shared },
        )
    }
}

/// Writing half of a split buffer.
pub struct Producer<T, C: RoleController = AtomicRoles> {
    buffer: Arc<HandoffBuffer<T, C>>,
}

impl<T, C: RoleController> Producer<T, C> {
    /// Opens a write scope. Never blocks.
    #[must_use]
    pub fn acquire(&mut self) -> WriteScope<'_, T, C> {
        self.buffer.acquire_write()
    }

    /// Replaces the payload and publishes it.
    ///
    /// Returns `true` if the consumer had not read the previous value.
    pub fn publish(&mut self, value: T) -> bool {
        self.buffer.publish(value)
    }

    /// Mutates the write slot in place, then publishes it.
    pub fn write_with<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        self.buffer.write_with(f)
    }

    /// True when the last published value has not been consumed yet.
    ///
    /// Diagnostics only. Waiting on this turns the handoff into a spinlock.
    #[must_use]
    pub fn has_unread(&self) -> bool {
        self.buffer.has_unread()
    }

    /// Counter snapshot of the shared buffer.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.buffer.stats()
    }
}

/// Reading half of a split buffer.
pub struct Consumer<T, C: RoleController = AtomicRoles> {
    buffer: Arc<HandoffBuffer<T, C>>,
}

impl<T, C: RoleController> Consumer<T, C> {
    /// Claims the latest unread value, or `None` if there is nothing new.
    #[must_use]
    pub fn acquire(&mut self) -> Option<ReadScope<'_, T, C>> {
        self.buffer.acquire_read()
    }

    /// Runs `f` on the latest unread value, if any.
    pub fn read_with<R>(&mut self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.buffer.read_with(f)
    }

    /// True when a value is waiting to be read.
    #[must_use]
    pub fn has_unread(&self) -> bool {
        self.buffer.has_unread()
    }

    /// Counter snapshot of the shared buffer.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.buffer.stats()
    }
}
