//! # HANDOFF Core
//!
//! Single-producer/single-consumer latest-value handoff designed for:
//! - A producer that never waits on a slow or absent consumer
//! - A consumer that never observes a half-written payload
//! - Zero allocations after construction
//!
//! ## Rules
//!
//! 1. **Exactly one producer and one consumer** - serialize externally if you need more
//! 2. **Latest wins** - an unread value is discarded when a newer one is published
//! 3. **Delivered once** - a value read and released is never returned again
//!
//! ## Example
//!
//! ```rust
//! use handoff_core::HandoffBuffer;
//!
//! let buffer = HandoffBuffer::<u32>::new();
//! for i in 0..10 {
//!     buffer.publish(i);
//! }
//! assert_eq!(buffer.read_with(|v| *v), Some(9));
//! assert_eq!(buffer.read_with(|v| *v), None);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod slot;
pub mod stats;
pub mod sync;

pub use error::{UsageError, UsageResult};
pub use slot::{Role, SlotIndex, SLOT_COUNT};
pub use stats::{HandoffStats, StatsSnapshot};
pub use sync::{
    AtomicRoles, Consumer, HandoffBuffer, LockedRoles, Producer, ReadScope, RoleController,
    RoleWord, WriteScope,
};
