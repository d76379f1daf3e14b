//! [`Teacher`] definitions.

use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::customer;
#[cfg(doc)]
use super::Slot;

/// Tutor hosting calendar [`Slot`]s.
#[derive(Clone, Debug)]
pub struct Teacher {
    /// ID of this [`Teacher`].
    pub id: Id,

    /// Name of this [`Teacher`].
    pub name: customer::Name,

    /// Email address of this [`Teacher`].
    pub email: customer::Email,
}

/// ID of a [`Teacher`].
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
