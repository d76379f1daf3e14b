//! [`Subscription`] definitions.

use std::time::Duration;

use common::{DateTimeOf, Money, unit};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ProductContainer, customer, product, slot};
#[cfg(doc)]
use super::{Class, Slot};

/// Purchased bundle of [`Class`]es entitling a [`customer::Customer`] to a
/// fixed set of lessons within an entitlement window.
#[derive(Clone, Debug)]
pub struct Subscription {
    /// ID of this [`Subscription`].
    pub id: Id,

    /// ID of the [`customer::Customer`] owning this [`Subscription`].
    pub customer_id: customer::Id,

    /// ID of the [`product::Product`] this [`Subscription`] was purchased
    /// against.
    pub product_id: product::Id,

    /// Price this [`Subscription`] was purchased for.
    pub price: Money,

    /// [`PurchaseDateTime`] of this [`Subscription`].
    pub purchased_at: PurchaseDateTime,

    /// Entitlement window, copied from the [`product::Product`] at purchase
    /// time.
    ///
    /// Later catalog edits don't affect it.
    pub duration: Duration,

    /// [`FirstLessonDateTime`] of this [`Subscription`], set once the first
    /// [`Class`] of it completes.
    ///
    /// Once set, it's never updated again.
    pub first_lesson_date: Option<FirstLessonDateTime>,

    /// [`NotificationDateTime`] when the last idleness reminder regarding
    /// this [`Subscription`] was sent, if ever.
    pub waste_money_notified_at: Option<NotificationDateTime>,

    /// Indicator whether this [`Subscription`] is fully used up.
    pub is_fully_used: bool,
}

impl Subscription {
    /// Anchor date the entitlement window of this [`Subscription`] counts
    /// from.
    ///
    /// It's the [`Subscription::first_lesson_date`] when set, otherwise the
    /// purchase date.
    #[must_use]
    pub fn anchor_date(&self) -> PurchaseDateTime {
        self.first_lesson_date
            .map_or(self.purchased_at, DateTimeOf::coerce)
    }

    /// Indicates whether the entitlement window of this [`Subscription`] has
    /// elapsed by the provided `now` moment.
    #[must_use]
    pub fn is_due(&self, now: PurchaseDateTime) -> bool {
        self.anchor_date() + self.duration <= now
    }

    /// Indicates whether this [`Subscription`] is about to become due soon.
    ///
    /// A [`Subscription`] with scheduled lessons counts as beginning to
    /// expire only when all of its scheduled [`Slot`]s start later than `now`
    /// plus the `horizon`. One without any scheduled lessons counts once its
    /// purchase date falls behind that boundary.
    #[must_use]
    pub fn is_beginning_to_expire(
        &self,
        now: PurchaseDateTime,
        horizon: Duration,
        slot_starts: &[slot::StartDateTime],
    ) -> bool {
        if self.is_due(now) {
            return false;
        }
        let boundary = now + horizon;
        if slot_starts.is_empty() {
            self.purchased_at > boundary
        } else {
            slot_starts.iter().all(|start| start.coerce() > boundary)
        }
    }

    /// Indicates whether an idleness reminder should be sent for this
    /// [`Subscription`] at the `now` moment.
    ///
    /// `last_slot_start` is the latest start among [`Slot`]s any [`Class`] of
    /// this [`Subscription`] ever occupied, if any.
    #[must_use]
    pub fn needs_waste_money_reminder(
        &self,
        now: PurchaseDateTime,
        first_delay: Duration,
        repeat_cooldown: Duration,
        last_slot_start: Option<slot::StartDateTime>,
    ) -> bool {
        if self.is_fully_used
            || self.first_lesson_date.is_some()
            || self.is_due(now)
        {
            return false;
        }
        if let Some(sent) = self.waste_money_notified_at {
            if sent.coerce() + repeat_cooldown >= now {
                return false;
            }
        }
        let idle_since =
            last_slot_start.map_or(self.purchased_at, DateTimeOf::coerce);
        idle_since + first_delay <= now
    }

    /// Records the `completed_at` moment as the
    /// [`Subscription::first_lesson_date`], unless it's set already.
    pub fn record_first_lesson(&mut self, completed_at: FirstLessonDateTime) {
        if self.first_lesson_date.is_none() {
            self.first_lesson_date = Some(completed_at);
        }
    }
}

impl ProductContainer for Subscription {
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
}

/// ID of a [`Subscription`].
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

/// [`DateTimeOf`] a [`Subscription`] purchase.
pub type PurchaseDateTime = DateTimeOf<(Subscription, unit::Purchase)>;

/// [`DateTimeOf`] the first completed lesson of a [`Subscription`].
pub type FirstLessonDateTime = DateTimeOf<(Subscription, unit::Start)>;

/// [`DateTimeOf`] an idleness reminder being sent for a [`Subscription`].
pub type NotificationDateTime = DateTimeOf<(Subscription, Reminded)>;

/// Marker of a [`NotificationDateTime`].
#[derive(Clone, Copy, Debug)]
pub struct Reminded;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use super::{PurchaseDateTime, Subscription};
    use crate::domain::{customer, product, slot};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn subscription(purchased_at: PurchaseDateTime) -> Subscription {
        Subscription {
            id: super::Id::new(),
            customer_id: customer::Id::new(),
            product_id: product::Id::new(),
            price: "100USD".parse().unwrap(),
            purchased_at,
            duration: 30 * DAY,
            first_lesson_date: None,
            waste_money_notified_at: None,
            is_fully_used: false,
        }
    }

    #[test]
    fn due_anchor_moves_to_first_lesson_date() {
        let now = DateTime::now().coerce();
        let mut sub = subscription(now - 40 * DAY);

        assert!(sub.is_due(now));

        sub.record_first_lesson((now - 10 * DAY).coerce());
        assert!(!sub.is_due(now));
    }

    #[test]
    fn first_lesson_date_is_set_once() {
        let now = DateTime::now().coerce();
        let mut sub = subscription(now - DAY);

        sub.record_first_lesson(now.coerce());
        sub.record_first_lesson((now + DAY).coerce());

        assert_eq!(sub.first_lesson_date, Some(now.coerce()));
    }

    #[test]
    fn reminder_waits_for_first_delay() {
        let now = DateTime::now().coerce();
        let fresh = subscription(now - 3 * DAY);
        let idle = subscription(now - 8 * DAY);

        assert!(!fresh.needs_waste_money_reminder(now, 7 * DAY, DAY, None));
        assert!(idle.needs_waste_money_reminder(now, 7 * DAY, DAY, None));
    }

    #[test]
    fn reminder_respects_cooldown() {
        let now = DateTime::now().coerce();
        let mut sub = subscription(now - 10 * DAY);

        sub.waste_money_notified_at = Some((now - DAY / 2).coerce());
        assert!(!sub.needs_waste_money_reminder(now, 7 * DAY, DAY, None));

        sub.waste_money_notified_at = Some((now - 2 * DAY).coerce());
        assert!(sub.needs_waste_money_reminder(now, 7 * DAY, DAY, None));
    }

    #[test]
    fn reminder_counts_idleness_from_last_scheduled_slot() {
        let now = DateTime::now().coerce();
        let sub = subscription(now - 20 * DAY);
        let recent: slot::StartDateTime = (now - 2 * DAY).coerce();
        let stale: slot::StartDateTime = (now - 9 * DAY).coerce();

        assert!(!sub.needs_waste_money_reminder(
            now,
            7 * DAY,
            DAY,
            Some(recent),
        ));
        assert!(sub.needs_waste_money_reminder(now, 7 * DAY, DAY, Some(stale)));
    }

    #[test]
    fn reminder_skips_started_due_and_used_up_subscriptions() {
        let now = DateTime::now().coerce();

        let mut started = subscription(now - 10 * DAY);
        started.record_first_lesson((now - 9 * DAY).coerce());
        assert!(!started.needs_waste_money_reminder(now, 7 * DAY, DAY, None));

        let due = subscription(now - 40 * DAY);
        assert!(!due.needs_waste_money_reminder(now, 7 * DAY, DAY, None));

        let mut used = subscription(now - 10 * DAY);
        used.is_fully_used = true;
        assert!(!used.needs_waste_money_reminder(now, 7 * DAY, DAY, None));
    }

    #[test]
    fn beginning_to_expire_requires_all_slots_beyond_horizon() {
        let now = DateTime::now().coerce();
        let sub = subscription(now - 20 * DAY);
        let soon: slot::StartDateTime = (now + 2 * DAY).coerce();
        let late: slot::StartDateTime = (now + 9 * DAY).coerce();

        assert!(sub.is_beginning_to_expire(now, 7 * DAY, &[late]));
        assert!(!sub.is_beginning_to_expire(now, 7 * DAY, &[soon, late]));
        assert!(!sub.is_beginning_to_expire(now, 7 * DAY, &[]));
    }
}
