//! [`Subscription`] read model definitions.

#[cfg(doc)]
use crate::domain::Subscription;

/// Selector of [`Subscription`]s that aren't used up and had no lesson
/// completed yet.
///
/// These are the only candidates for idleness reminders.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unstarted;
