//! Calendar [`Slot`] definitions.

use std::time::Duration;

use common::{DateTimeOf, unit};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{lesson, teacher};
#[cfg(doc)]
use super::{Class, Teacher};

/// Calendar slot of a [`Teacher`], hosting up to [`lesson::Capacity`]
/// [`Class`]es of a single [`lesson::Kind`].
///
/// At most one [`Slot`] may exist per (teacher, lesson kind, start) triple.
#[derive(Clone, Debug)]
pub struct Slot {
    /// ID of this [`Slot`].
    pub id: Id,

    /// ID of the [`Teacher`] hosting this [`Slot`].
    pub teacher_id: teacher::Id,

    /// [`lesson::Kind`] hosted by this [`Slot`].
    pub lesson: lesson::Kind,

    /// [`StartDateTime`] of this [`Slot`].
    pub start: StartDateTime,

    /// Number of seats occupied in this [`Slot`].
    pub taken: u8,

    /// Indicator whether this [`Slot`] has been swept after elapsing, with
    /// its [`Class`]es marked as used.
    pub is_finished: bool,

    /// Indicator whether this [`Slot`] was knowingly placed outside the
    /// [`Teacher`]'s working hours.
    pub allow_besides_working_hours: bool,
}

impl Slot {
    /// Creates a new empty [`Slot`] of the given `lesson` [`lesson::Kind`]
    /// for the given [`Teacher`].
    #[must_use]
    pub fn new(
        teacher_id: teacher::Id,
        lesson: lesson::Kind,
        start: StartDateTime,
        allow_besides_working_hours: bool,
    ) -> Self {
        Self {
            id: Id::new(),
            teacher_id,
            lesson,
            start,
            taken: 0,
            is_finished: false,
            allow_besides_working_hours,
        }
    }

    /// Maximum number of [`Class`]es this [`Slot`] may host.
    #[must_use]
    pub fn capacity(&self) -> lesson::Capacity {
        self.lesson.capacity()
    }

    /// Indicates whether this [`Slot`] has at least one free seat.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.taken < self.capacity().into()
    }

    /// Occupies one seat of this [`Slot`].
    ///
    /// No-op if there are no free seats left.
    pub fn attach(&mut self) {
        if self.is_free() {
            self.taken += 1;
        }
    }

    /// Releases one seat of this [`Slot`].
    pub fn release(&mut self) {
        self.taken = self.taken.saturating_sub(1);
    }

    /// [`StartDateTime`] at which this [`Slot`] ends, as defined by its
    /// [`lesson::Kind`] duration.
    #[must_use]
    pub fn end(&self) -> StartDateTime {
        self.start + self.lesson.duration()
    }

    /// Indicates whether this [`Slot`] has started by the `now` moment.
    #[must_use]
    pub fn has_started(&self, now: StartDateTime) -> bool {
        self.start <= now
    }

    /// Indicates whether this [`Slot`] has ended and the provided `grace`
    /// period past its end has elapsed too.
    #[must_use]
    pub fn has_elapsed(&self, now: StartDateTime, grace: Duration) -> bool {
        self.end() + grace <= now
    }
}

/// ID of a [`Slot`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// [`DateTimeOf`] a [`Slot`] start.
pub type StartDateTime = DateTimeOf<(Slot, unit::Start)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use super::Slot;
    use crate::domain::{lesson, teacher};

    #[test]
    fn seats_are_bounded_by_lesson_capacity() {
        let mut slot = Slot::new(
            teacher::Id::new(),
            lesson::Kind::Paired,
            DateTime::now().coerce(),
            false,
        );

        assert!(slot.is_free());
        slot.attach();
        assert!(slot.is_free());
        slot.attach();
        assert!(!slot.is_free());

        slot.attach();
        assert_eq!(slot.taken, 2);

        slot.release();
        assert!(slot.is_free());
    }

    #[test]
    fn elapses_after_lesson_duration_plus_grace() {
        let now = DateTime::now().coerce();
        let grace = Duration::from_secs(60 * 60);
        let slot = Slot::new(
            teacher::Id::new(),
            lesson::Kind::Ordinary,
            now - Duration::from_secs(30 * 60),
            false,
        );

        assert!(slot.has_started(now));
        assert!(!slot.has_elapsed(now, grace));
        assert!(slot.has_elapsed(now + grace + Duration::from_secs(1), grace));
    }
}
