//! # Role State Controllers
//!
//! A controller owns the [`RoleWord`] and applies transitions to it
//! atomically. It is the only synchronization point between the producer
//! and the consumer, and it never covers payload access.
//!
//! - [`AtomicRoles`]: compare-and-swap on an `AtomicU8`. Never blocks.
//! - [`LockedRoles`]: `parking_lot::Mutex` held for the pure step only.

#![allow(unsafe_code)]

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;

use super::word::RoleWord;
use crate::error::UsageResult;

/// Applies role transitions atomically.
///
/// The `Acquire`/`Release` pairing of a successful transition is what makes
/// a published payload visible to the reader that claims it, and what makes
/// a freed slot safe for the next writer.
///
/// # Safety
///
/// [`HandoffBuffer`](super::HandoffBuffer) hands out `&mut T` to a slot on
/// the strength of the word this trait maintains. An implementation must
/// guarantee that:
///
/// - `Default` starts from [`RoleWord::IDLE`];
/// - `transition` applies `step` to the current word and stores the word it
///   returns as one atomic step, so no two transitions observe the same
///   input word;
/// - a failed `step` leaves the stored word unchanged;
/// - a successful transition synchronizes with the next one (`Release` on
///   store, `Acquire` on load), and `load` returns the latest stored word.
///
/// A controller that skips any of these lets two scopes alias one slot, so
/// implementing the trait requires `unsafe impl`:
///
/// ```compile_fail,E0200
/// use handoff_core::{RoleController, RoleWord, UsageResult};
///
/// #[derive(Default)]
/// struct Forgetful;
///
/// impl RoleController for Forgetful {
///     const NAME: &'static str = "forgetful";
///
///     fn load(&self) -> RoleWord {
///         RoleWord::IDLE
///     }
///
///     fn transition<R>(
///         &self,
///         mut step: impl FnMut(RoleWord) -> UsageResult<(RoleWord, R)>,
///     ) -> UsageResult<R> {
///         step(RoleWord::IDLE).map(|(_, out)| out)
///     }
/// }
/// ```
pub unsafe trait RoleController: Default + Send + Sync {
    /// Short name used in logs.
    const NAME: &'static str;

    /// Current role word.
    fn load(&self) -> RoleWord;

    /// Runs `step` against the current word and installs its result.
    ///
    /// `step` may run more than once if another thread wins the race, so it
    /// must be free of side effects.
    ///
    /// # Errors
    ///
    /// Whatever `step` returns; the word is left untouched in that case.
    fn transition<R>(
        &self,
        step: impl FnMut(RoleWord) -> UsageResult<(RoleWord, R)>,
    ) -> UsageResult<R>;
}

/// Lock-free controller: one CAS per transition.
pub struct AtomicRoles {
    word: AtomicU8,
}

impl Default for AtomicRoles {
    fn default() -> Self {
        Self {
            word: AtomicU8::new(RoleWord::IDLE.bits()),
        }
    }
}

// SAFETY: starts at IDLE; each transition is a single CAS from the word
// `step` saw (AcqRel on success), and an `Err` from `step` returns before
// any store.
unsafe impl RoleController for AtomicRoles {
    const NAME: &'static str = "atomic";

    #[inline]
    fn load(&self) -> RoleWord {
        RoleWord::from_bits(self.word.load(Ordering::Acquire))
    }

    fn transition<R>(
        &self,
        mut step: impl FnMut(RoleWord) -> UsageResult<(RoleWord, R)>,
    ) -> UsageResult<R> {
        let mut current = self.word.load(Ordering::Acquire);
        loop {
            let (next, out) = step(RoleWord::from_bits(current))?;
            if next.bits() == current {
                return Ok(out);
            }
            match self.word.compare_exchange_weak(
                current,
                next.bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(out),
                Err(actual) => current = actual,
            }
        }
    }
}

impl fmt::Debug for AtomicRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicRoles").field(&self.load()).finish()
    }
}

/// Mutex-backed controller.
///
/// The lock guards the role word alone. Payload access happens after the
/// guard is dropped.
#[derive(Default)]
pub struct LockedRoles {
    word: Mutex<RoleWord>,
}

// SAFETY: `RoleWord::default()` is IDLE; the lock is held across load,
// `step` and store, and the mutex provides the acquire/release pairing.
unsafe impl RoleController for LockedRoles {
    const NAME: &'static str = "locked";

    #[inline]
    fn load(&self) -> RoleWord {
        *self.word.lock()
    }

    fn transition<R>(
        &self,
        mut step: impl FnMut(RoleWord) -> UsageResult<(RoleWord, R)>,
    ) -> UsageResult<R> {
        let mut word = self.word.lock();
        let (next, out) = step(*word)?;
        *word = next;
        Ok(out)
    }
}

impl fmt::Debug for LockedRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LockedRoles").field(&self.load()).finish()
    }
}
