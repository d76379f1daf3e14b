//! Catalog [`Product`] definitions.

use std::time::Duration;

use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lesson;
#[cfg(doc)]
use super::{Class, Subscription};

/// Catalog product a [`Subscription`] is purchased against.
///
/// A [`Product`] supplies its data (entitlement window, included lesson
/// units) at purchase time only: a [`Subscription`] copies what it needs and
/// never looks back, even if the catalog changes later.
#[derive(Clone, Debug)]
pub struct Product {
    /// ID of this [`Product`].
    pub id: Id,

    /// [`Name`] of this [`Product`].
    pub name: Name,

    /// Entitlement window of this [`Product`].
    ///
    /// A [`Subscription`] becomes due once this [`Duration`] has elapsed
    /// since its anchor date.
    pub duration: Duration,

    /// Lesson [`Unit`]s included into this [`Product`].
    pub units: Vec<Unit>,
}

impl Product {
    /// Returns the total number of [`Class`]es this [`Product`] entitles to.
    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.units.iter().map(|u| usize::from(u.count)).sum()
    }
}

/// Bundle of same-kind lessons included into a [`Product`].
#[derive(Clone, Copy, Debug)]
pub struct Unit {
    /// [`lesson::Kind`] of this [`Unit`].
    pub lesson: lesson::Kind,

    /// Number of lessons of the [`lesson::Kind`] included.
    pub count: u8,
}

/// ID of a [`Product`].
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

/// Name of a [`Product`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}
