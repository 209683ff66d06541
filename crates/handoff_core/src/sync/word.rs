//! # Packed Role Word
//!
//! The whole role assignment of a buffer fits in one byte:
//!
//! ```text
//!   bit  7 6 │ 5 4     │ 3 2  │ 1 0
//!        0 0 │ reading │ live │ writing      (0b11 = none)
//! ```
//!
//! Every transition is a pure function from one word to the next. The
//! controllers only decide how that function is applied atomically.

use std::fmt;

use crate::error::{UsageError, UsageResult};
use crate::slot::{Role, SlotIndex, SLOT_COUNT};

/// Field value meaning "no slot carries this role".
const NONE: u8 = 0b11;

const WRITING_SHIFT: u32 = 0;
const LIVE_SHIFT: u32 = 2;
const READING_SHIFT: u32 = 4;

/// Bits that must always be zero.
const RESERVED_MASK: u8 = 0b1100_0000;

/// Snapshot of which slot is Writing, Live and Reading.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleWord(u8);

impl RoleWord {
    /// No open scopes, nothing published.
    pub const IDLE: Self = Self(0b0011_1111);

    /// Reinterprets raw bits. No validation is performed.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Slot bound to the open write scope.
    #[inline]
    #[must_use]
    pub fn writing(self) -> Option<SlotIndex> {
        self.field(WRITING_SHIFT)
    }

    /// Slot holding the latest unconsumed value.
    #[inline]
    #[must_use]
    pub fn live(self) -> Option<SlotIndex> {
        self.field(LIVE_SHIFT)
    }

    /// Slot bound to the open read scope.
    #[inline]
    #[must_use]
    pub fn reading(self) -> Option<SlotIndex> {
        self.field(READING_SHIFT)
    }

    /// Role carried by `index`.
    #[must_use]
    pub fn role_of(self, index: SlotIndex) -> Role {
        let index = Some(index);
        if self.writing() == index {
            Role::Writing
        } else if self.live() == index {
            Role::Live
        } else if self.reading() == index {
            Role::Reading
        } else {
            Role::Free
        }
    }

    /// Roles of all three slots in index order.
    #[must_use]
    pub fn roles(self) -> [Role; SLOT_COUNT] {
        SlotIndex::ALL.map(|index| self.role_of(index))
    }

    /// True when no slot carries two roles and the reserved bits are clear.
    #[must_use]
    pub fn is_consistent(self) -> bool {
        if self.0 & RESERVED_MASK != 0 {
            return false;
        }
        let collides = |a: Option<SlotIndex>, b: Option<SlotIndex>| a.is_some() && a == b;
        let (w, l, r) = (self.writing(), self.live(), self.reading());
        !(collides(w, l) || collides(w, r) || collides(l, r))
    }

    /// Opens a write scope on a slot that is neither Live nor Reading.
    ///
    /// With three slots and at most two of them taken by Live and Reading,
    /// a candidate always exists.
    ///
    /// # Errors
    ///
    /// [`UsageError::WriteAlreadyOpen`] if a write scope is open.
    pub fn begin_write(self) -> UsageResult<(Self, SlotIndex)> {
        let word = self.checked()?;
        if word.writing().is_some() {
            return Err(UsageError::WriteAlreadyOpen);
        }
        let (live, reading) = (word.live(), word.reading());
        let slot = SlotIndex::ALL
            .into_iter()
            .find(|&index| Some(index) != live && Some(index) != reading)
            .ok_or(UsageError::RoleCollision { word: word.0 })?;
        Ok((word.with_field(WRITING_SHIFT, Some(slot)).checked()?, slot))
    }

    /// Publishes the written slot: Writing becomes Live.
    ///
    /// Returns the previous Live slot, whose value is discarded unread.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoOpenWrite`] if no write scope is open.
    pub fn end_write(self) -> UsageResult<(Self, Option<SlotIndex>)> {
        let word = self.checked()?;
        let slot = word.writing().ok_or(UsageError::NoOpenWrite)?;
        let discarded = word.live();
        let next = word
            .with_field(WRITING_SHIFT, None)
            .with_field(LIVE_SHIFT, Some(slot))
            .checked()?;
        Ok((next, discarded))
    }

    /// Claims the Live slot for reading and clears the Live designation.
    ///
    /// Returns the word unchanged and `None` when nothing is Live.
    ///
    /// # Errors
    ///
    /// [`UsageError::ReadAlreadyOpen`] if a read scope is open.
    pub fn begin_read(self) -> UsageResult<(Self, Option<SlotIndex>)> {
        let word = self.checked()?;
        if word.reading().is_some() {
            return Err(UsageError::ReadAlreadyOpen);
        }
        match word.live() {
            None => Ok((word, None)),
            Some(slot) => {
                let next = word
                    .with_field(LIVE_SHIFT, None)
                    .with_field(READING_SHIFT, Some(slot))
                    .checked()?;
                Ok((next, Some(slot)))
            }
        }
    }

    /// Frees the Reading slot. Live is not restored.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoOpenRead`] if no read scope is open.
    pub fn end_read(self) -> UsageResult<(Self, SlotIndex)> {
        let word = self.checked()?;
        let slot = word.reading().ok_or(UsageError::NoOpenRead)?;
        Ok((word.with_field(READING_SHIFT, None), slot))
    }

    #[inline]
    fn field(self, shift: u32) -> Option<SlotIndex> {
        SlotIndex::new((self.0 >> shift) & NONE)
    }

    #[inline]
    fn with_field(self, shift: u32, slot: Option<SlotIndex>) -> Self {
        let raw = slot.map_or(NONE, SlotIndex::raw);
        Self((self.0 & !(NONE << shift)) | (raw << shift))
    }

    fn checked(self) -> UsageResult<Self> {
        if self.is_consistent() {
            Ok(self)
        } else {
            Err(UsageError::RoleCollision { word: self.0 })
        }
    }
}

impl Default for RoleWord {
    fn default() -> Self {
        Self::IDLE
    }
}

impl fmt::Debug for RoleWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleWord")
            .field("writing", &self.writing())
            .field("live", &self.live())
            .field("reading", &self.reading())
            .finish()
    }
}
