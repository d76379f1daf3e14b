//! Accounting [`Event`] definitions.

use common::{DateTimeOf, define_kind, unit};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{cancellation, class, teacher};
#[cfg(doc)]
use super::{Cancellation, Class, Slot, Teacher};

/// Billable event in a [`Teacher`]'s ledger.
///
/// An [`Event`] only references its [`Originator`], so the reportable facts
/// (billing moment, affected customers) are resolved against the originating
/// record at read time.
#[derive(Clone, Debug)]
pub struct Event {
    /// ID of this [`Event`].
    pub id: Id,

    /// [`Kind`] of this [`Event`].
    pub kind: Kind,

    /// ID of the [`Teacher`] this [`Event`] is billed to.
    pub teacher_id: teacher::Id,

    /// [`Originator`] record this [`Event`] was produced by.
    pub originator: Originator,

    /// [`CreationDateTime`] of this [`Event`].
    pub occurred_at: CreationDateTime,
}

define_kind! {
    #[doc = "Kind of an accounting [`Event`]."]
    enum Kind {
        #[doc = "A hosted [`Class`] has completed."]
        ClassCompleted = 1,

        #[doc = "A [`Class`] was cancelled on the customer's initiative."]
        CustomerInspiredCancellation = 2,
    }
}

/// Record an accounting [`Event`] originates from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Originator {
    /// Completed [`Class`].
    Class(class::Id),

    /// [`Cancellation`] performed by a customer.
    Cancellation(cancellation::Id),
}

/// ID of an accounting [`Event`].
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

/// [`DateTimeOf`] an accounting [`Event`] creation.
pub type CreationDateTime = DateTimeOf<(Event, unit::Creation)>;
