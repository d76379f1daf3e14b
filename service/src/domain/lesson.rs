//! Lesson kind definitions.

use std::time::Duration;

use common::define_kind;
use derive_more::{Display, From, Into};

#[cfg(doc)]
use super::Slot;

define_kind! {
    #[doc = "Kind of a lesson."]
    enum Kind {
        #[doc = "Ordinary one-on-one lesson."]
        Ordinary = 1,

        #[doc = "Lesson for a pair of students."]
        Paired = 2,

        #[doc = "Hosted master class."]
        MasterClass = 3,
    }
}

impl Kind {
    /// Indicates whether lessons of this [`Kind`] may be scheduled only into
    /// a pre-existing timeline [`Slot`] planned by a teacher.
    ///
    /// [`Kind::Ordinary`] lessons generate their [`Slot`] on demand.
    #[must_use]
    pub const fn timeline_entry_required(self) -> bool {
        !matches!(self, Self::Ordinary)
    }

    /// Returns the default student [`Capacity`] of a [`Slot`] hosting a
    /// lesson of this [`Kind`].
    #[must_use]
    pub const fn capacity(self) -> Capacity {
        match self {
            Self::Ordinary => Capacity(1),
            Self::Paired => Capacity(2),
            Self::MasterClass => Capacity(10),
        }
    }

    /// Returns the default [`Duration`] of a lesson of this [`Kind`].
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::Ordinary | Self::Paired => Duration::from_secs(30 * 60),
            Self::MasterClass => Duration::from_secs(60 * 60),
        }
    }
}

/// Number of student seats a [`Slot`] of some lesson [`Kind`] provides.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Capacity(u8);

#[cfg(test)]
mod spec {
    use super::Kind;

    #[test]
    fn ordinary_lessons_dont_require_timeline_entry() {
        assert!(!Kind::Ordinary.timeline_entry_required());
        assert!(Kind::Paired.timeline_entry_required());
        assert!(Kind::MasterClass.timeline_entry_required());
    }

    #[test]
    fn paired_lessons_fit_two_students() {
        assert_eq!(u8::from(Kind::Paired.capacity()), 2);
        assert_eq!(u8::from(Kind::Ordinary.capacity()), 1);
    }
}
