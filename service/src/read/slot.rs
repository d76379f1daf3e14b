//! [`Slot`] read model definitions.

use crate::domain::{lesson, slot, teacher};
#[cfg(doc)]
use crate::domain::{Slot, Teacher};

/// Natural key of a [`Slot`].
///
/// A [`Teacher`]'s calendar holds at most one [`Slot`] per such key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ByStart {
    /// ID of the [`Teacher`] hosting a [`Slot`].
    pub teacher_id: teacher::Id,

    /// [`lesson::Kind`] hosted by a [`Slot`].
    pub lesson: lesson::Kind,

    /// Start of a [`Slot`].
    pub start: slot::StartDateTime,
}

/// Selector of [`Slot`]s that have ended by the [`deadline`], but weren't
/// swept yet.
///
/// [`deadline`]: Elapsed::deadline
#[derive(Clone, Copy, Debug)]
pub struct Elapsed {
    /// Moment a [`Slot`]'s end must not exceed.
    ///
    /// Callers bake any grace period into it.
    pub deadline: slot::StartDateTime,
}
