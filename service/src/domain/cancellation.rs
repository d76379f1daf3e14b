//! [`Cancellation`] definitions.

use common::{DateTimeOf, define_kind, unit};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{class, customer, teacher};
#[cfg(doc)]
use super::{Class, Slot};

/// Record of a [`Class`] being cancelled, preserved for accounting.
#[derive(Clone, Debug)]
pub struct Cancellation {
    /// ID of this [`Cancellation`].
    pub id: Id,

    /// ID of the cancelled [`Class`].
    pub class_id: class::Id,

    /// ID of the [`customer::Customer`] whose [`Class`] was cancelled.
    pub customer_id: customer::Id,

    /// ID of the [`super::Teacher`] whose [`Slot`] hosted the cancelled
    /// [`Class`].
    pub teacher_id: teacher::Id,

    /// [`Source`] this [`Cancellation`] was initiated by.
    pub source: Source,

    /// [`CreationDateTime`] of this [`Cancellation`].
    pub cancelled_at: CreationDateTime,
}

define_kind! {
    #[doc = "Initiator of a [`Cancellation`]."]
    enum Source {
        #[doc = "[`customer::Customer`] owning the [`Class`]."]
        Customer = 1,

        #[doc = "[`super::Teacher`] hosting the [`Slot`]."]
        Teacher = 2,

        #[doc = "Support staff, allowed to cancel at any time."]
        Backoffice = 3,
    }
}

impl Source {
    /// Indicates whether this [`Source`] bypasses the [`Slot`] timing checks
    /// on cancellation.
    #[must_use]
    pub const fn is_dangerous(self) -> bool {
        matches!(self, Self::Backoffice)
    }
}

/// ID of a [`Cancellation`].
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

/// [`DateTimeOf`] a [`Cancellation`] creation.
pub type CreationDateTime = DateTimeOf<(Cancellation, unit::Creation)>;
