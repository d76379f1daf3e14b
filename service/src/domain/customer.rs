//! [`Customer`] definitions.

use std::sync::LazyLock;

use derive_more::{AsRef, Display, From, FromStr, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use super::{Class, Subscription};

/// Student purchasing [`Subscription`]s and attending [`Class`]es.
#[derive(Clone, Debug)]
pub struct Customer {
    /// ID of this [`Customer`].
    pub id: Id,

    /// [`Name`] of this [`Customer`].
    pub name: Name,

    /// [`Email`] address of this [`Customer`].
    pub email: Email,

    /// IANA [`TimeZone`] of this [`Customer`], used for rendering dates in
    /// outgoing mail.
    pub timezone: TimeZone,

    /// Number of [`Class`] cancellations this [`Customer`] has performed.
    pub cancellation_streak: u32,
}

/// ID of a [`Customer`].
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

/// Name of a [`Customer`].
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

/// Email address of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+\\x40[a-zA-Z0-9]\
                 (?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\
                 (?:\\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
            )
            .expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// IANA time zone name of a [`Customer`] (e.g. `Europe/Moscow`).
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct TimeZone(String);

impl TimeZone {
    /// Creates a new [`TimeZone`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`TimeZone`].
    fn check(name: impl AsRef<str>) -> bool {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[A-Za-z_+-]+(?:/[A-Za-z0-9_+-]+){0,2}$")
                .expect("valid regex")
        });

        REGEX.is_match(name.as_ref())
    }
}

impl FromStr for TimeZone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `TimeZone`")
    }
}

#[cfg(test)]
mod spec {
    use super::{Email, TimeZone};

    #[test]
    fn validates_email_address() {
        assert!(Email::new("student@example.com").is_some());
        assert!(Email::new("no-at-sign").is_none());
        assert!(Email::new("spaced @example.com").is_none());
    }

    #[test]
    fn validates_time_zone_name() {
        assert!(TimeZone::new("Europe/Moscow").is_some());
        assert!(TimeZone::new("UTC").is_some());
        assert!(TimeZone::new("not a zone").is_none());
    }
}
