//! # Usage Faults
//!
//! The handoff performs no I/O and never runs out of slots, so the only
//! failures are programmer errors. They are reported here and turned into
//! panics by the infallible entry points.

use thiserror::Error;

/// Invalid use of a [`HandoffBuffer`](crate::HandoffBuffer).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    /// A write scope was requested while another one is still open.
    #[error("write scope already open: only one producer may hold the buffer at a time")]
    WriteAlreadyOpen,

    /// A read scope was requested while another one is still open.
    #[error("read scope already open: only one consumer may hold the buffer at a time")]
    ReadAlreadyOpen,

    /// A write was released but no write scope was open.
    #[error("no write scope is open")]
    NoOpenWrite,

    /// A read was released but no read scope was open.
    #[error("no read scope is open")]
    NoOpenRead,

    /// Two roles resolved to the same slot. This is a controller bug.
    #[error("role collision in state word {word:#04x}")]
    RoleCollision {
        /// The offending packed state word.
        word: u8,
    },
}

/// Result type for role transitions.
pub type UsageResult<T> = Result<T, UsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_fault() {
        assert!(UsageError::WriteAlreadyOpen.to_string().contains("write scope already open"));
        assert!(UsageError::ReadAlreadyOpen.to_string().contains("read scope already open"));
        assert_eq!(
            UsageError::RoleCollision { word: 0x05 }.to_string(),
            "role collision in state word 0x05"
        );
    }
}
