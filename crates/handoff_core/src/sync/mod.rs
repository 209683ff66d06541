//! # Role State Controller and Scoped Access
//!
//! ## The Problem
//!
//! ```text
//! Producer thread:  rewrites a large snapshot every frame
//! Consumer thread:  wants the newest complete snapshot, whenever it looks
//!
//! Shared value + Mutex:  producer stalls behind a slow consumer
//! Double buffer:         swap must wait for the reader to let go
//! ```
//!
//! ## The Solution: Three Slots, Four Roles
//!
//! ```text
//!   Free ──acquire_write──▶ Writing ──drop──▶ Live ──acquire_read──▶ Reading ──drop──▶ Free
//!                                             │
//!                                   newer publish discards it
//! ```
//!
//! Live and Reading occupy at most two slots, so a writer always finds a
//! third. Only the one-byte role word is synchronized; payloads are touched
//! outside of any critical section.

mod buffer;
mod controller;
mod scope;
mod split;
mod word;

pub use buffer::HandoffBuffer;
pub use controller::{AtomicRoles, LockedRoles, RoleController};
pub use scope::{ReadScope, WriteScope};
pub use split::{Consumer, Producer};
pub use word::RoleWord;
