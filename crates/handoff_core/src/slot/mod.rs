//! # Slot Storage
//!
//! Three fixed payload cells and the role vocabulary used to describe them.
//!
//! ```text
//!   ┌────────┐   ┌────────┐   ┌────────┐
//!   │ slot 0 │   │ slot 1 │   │ slot 2 │
//!   └────────┘   └────────┘   └────────┘
//!   Free → Writing → Live → Reading → Free → ...
//! ```
//!
//! A slot never stores its own role. Roles live in the packed state word
//! owned by the controller, so a tag can never disagree with an index.

mod role;
mod storage;

pub use role::{Role, SlotIndex, SLOT_COUNT};
pub use storage::SlotStorage;
