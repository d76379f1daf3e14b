//! [`Class`] definitions.

use std::time::Duration;

use common::{Money, unit};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ProductContainer, Slot, customer, lesson, slot, subscription};
#[cfg(doc)]
use super::{Subscription, Teacher};

/// Period after a [`Slot`] start during which a non-dangerous cancellation of
/// its [`Class`]es is still allowed.
pub const MARK_USED_AFTER: Duration = Duration::from_secs(60 * 60);

/// Single lesson entitlement, either standalone or materialized from a
/// [`Subscription`].
#[derive(Clone, Debug)]
pub struct Class {
    /// ID of this [`Class`].
    pub id: Id,

    /// ID of the [`customer::Customer`] owning this [`Class`].
    pub customer_id: customer::Id,

    /// ID of the [`Subscription`] this [`Class`] was materialized from, if
    /// it's not a standalone purchase.
    pub subscription_id: Option<subscription::Id>,

    /// [`lesson::Kind`] of this [`Class`].
    pub lesson: lesson::Kind,

    /// Price this [`Class`] was purchased for.
    ///
    /// For a [`Subscription`]-owned [`Class`] it's the [`Subscription`]
    /// price.
    pub price: Money,

    /// [`PurchaseDateTime`] of this [`Class`].
    pub purchased_at: PurchaseDateTime,

    /// ID of the [`Slot`] this [`Class`] is scheduled into, if any.
    pub slot_id: Option<slot::Id>,

    /// Indicator whether this [`Class`] is used up.
    pub is_fully_used: bool,
}

impl Class {
    /// Indicates whether this [`Class`] is scheduled into some [`Slot`].
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.slot_id.is_some()
    }

    /// Indicates whether this [`Class`] may occupy the provided [`Slot`].
    ///
    /// It may not, whenever it's used up or scheduled already, the [`Slot`]
    /// hosts another [`lesson::Kind`], or the [`Slot`] has no free seats
    /// left.
    #[must_use]
    pub fn schedulable_into(&self, slot: &Slot) -> bool {
        !self.is_fully_used
            && !self.is_scheduled()
            && self.lesson == slot.lesson
            && slot.is_free()
    }

    /// Indicates whether the lesson of this [`Class`] has started, as
    /// defined by the provided backing [`Slot`].
    ///
    /// An unscheduled [`Class`] is never started.
    #[must_use]
    pub fn has_started(
        &self,
        slot: &Slot,
        now: slot::StartDateTime,
    ) -> bool {
        self.is_scheduled() && slot.has_started(now)
    }

    /// Indicates whether the provided [`cancellation::Source`] may cancel
    /// this [`Class`] scheduled into a [`Slot`] starting at `slot_start`.
    ///
    /// A customer may not cancel once the [`Slot`] start is strictly in the
    /// past. Any other non-dangerous source gets a [`MARK_USED_AFTER`] grace
    /// window past the start, its last instant included. Dangerous sources
    /// may cancel at any time.
    #[must_use]
    pub fn may_be_cancelled(
        source: super::cancellation::Source,
        slot_start: slot::StartDateTime,
        now: slot::StartDateTime,
    ) -> bool {
        use super::cancellation::Source;

        if source.is_dangerous() {
            return true;
        }
        match source {
            Source::Customer => slot_start >= now,
            Source::Teacher | Source::Backoffice => {
                slot_start + MARK_USED_AFTER >= now
            }
        }
    }
}

impl ProductContainer for Class {
    fn purchased_at(&self) -> common::DateTime {
        self.purchased_at.coerce()
    }

    fn price(&self) -> Money {
        self.price.clone()
    }

    fn is_fully_used(&self) -> bool {
        self.is_fully_used
    }

    fn set_fully_used(&mut self, fully_used: bool) {
        self.is_fully_used = fully_used;
    }

    /// Additionally to clearing the used-up flag, detaches this [`Class`]
    /// from its [`Slot`], making it schedulable again.
    fn renew(&mut self) {
        self.slot_id = None;
        self.set_fully_used(false);
    }
}

/// ID of a [`Class`].
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

/// [`DateTimeOf`] a [`Class`] purchase.
///
/// [`DateTimeOf`]: common::DateTimeOf
pub type PurchaseDateTime = common::DateTimeOf<(Class, unit::Purchase)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use super::{Class, Id, MARK_USED_AFTER};
    use crate::domain::{
        Slot, cancellation::Source, customer, lesson, slot, teacher,
    };

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn customer_cannot_cancel_started_class() {
        let now: slot::StartDateTime = DateTime::now().coerce();

        assert!(Class::may_be_cancelled(
            Source::Customer,
            now + 5 * MINUTE,
            now,
        ));
        assert!(!Class::may_be_cancelled(
            Source::Customer,
            now - 5 * MINUTE,
            now,
        ));
    }

    #[test]
    fn teacher_gets_grace_window_past_start() {
        let now: slot::StartDateTime = DateTime::now().coerce();

        assert!(Class::may_be_cancelled(
            Source::Teacher,
            now - 30 * MINUTE,
            now,
        ));
        assert!(!Class::may_be_cancelled(
            Source::Teacher,
            now - MARK_USED_AFTER - MINUTE,
            now,
        ));
    }

    #[test]
    fn unscheduled_class_is_never_started() {
        let now: slot::StartDateTime = DateTime::now().coerce();
        let slot = Slot::new(
            teacher::Id::new(),
            lesson::Kind::Ordinary,
            now - 5 * MINUTE,
            false,
        );
        let mut class = Class {
            id: Id::new(),
            customer_id: customer::Id::new(),
            subscription_id: None,
            lesson: lesson::Kind::Ordinary,
            price: "25USD".parse().unwrap(),
            purchased_at: DateTime::now().coerce(),
            slot_id: None,
            is_fully_used: false,
        };

        assert!(!class.has_started(&slot, now));

        class.slot_id = Some(slot.id);
        assert!(class.has_started(&slot, now));
        assert!(!class.has_started(&slot, now - 10 * MINUTE));
    }

    #[test]
    fn boundary_instant_still_allows_cancellation() {
        let now: slot::StartDateTime = DateTime::now().coerce();

        assert!(Class::may_be_cancelled(Source::Customer, now, now));
        assert!(Class::may_be_cancelled(
            Source::Teacher,
            now - MARK_USED_AFTER,
            now,
        ));
    }

    #[test]
    fn dangerous_source_cancels_anytime() {
        let now: slot::StartDateTime = DateTime::now().coerce();

        assert!(Class::may_be_cancelled(
            Source::Backoffice,
            now - 10 * MARK_USED_AFTER,
            now,
        ));
    }
}
