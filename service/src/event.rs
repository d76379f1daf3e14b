//! Domain [`Event`] definitions.

use crate::domain::{Cancellation, Class, Subscription, teacher};

/// Event happened in the domain, emitted by commands after their transaction
/// commits.
#[derive(Clone, Debug)]
pub enum Event {
    /// [`Class`] was scheduled into a slot.
    ClassScheduled(ClassScheduled),

    /// [`Class`] was cancelled.
    ClassCancelled(ClassCancelled),

    /// [`Class`] was held and completed.
    ClassCompleted(ClassCompleted),

    /// [`Subscription`] was deactivated.
    SubscriptionDeactivated(SubscriptionDeactivated),
}

/// [`Event`] of a [`Class`] being scheduled into a slot.
#[derive(Clone, Debug)]
pub struct ClassScheduled {
    /// Scheduled [`Class`].
    pub class: Class,

    /// ID of the [`teacher::Teacher`] hosting the slot.
    pub teacher_id: teacher::Id,
}

/// [`Event`] of a [`Class`] being cancelled.
#[derive(Clone, Debug)]
pub struct ClassCancelled {
    /// Cancelled [`Class`].
    pub class: Class,

    /// Produced [`Cancellation`] record.
    pub cancellation: Cancellation,

    /// ID of the [`teacher::Teacher`] whose slot was released.
    pub teacher_id: teacher::Id,
}

/// [`Event`] of a [`Class`] being held and completed.
#[derive(Clone, Debug)]
pub struct ClassCompleted {
    /// Completed [`Class`].
    pub class: Class,

    /// ID of the [`teacher::Teacher`] who hosted it.
    pub teacher_id: teacher::Id,
}

/// [`Event`] of a [`Subscription`] being deactivated.
#[derive(Clone, Debug)]
pub struct SubscriptionDeactivated {
    /// Deactivated [`Subscription`].
    pub subscription: Subscription,
}

impl From<ClassScheduled> for Event {
    fn from(ev: ClassScheduled) -> Self {
        Self::ClassScheduled(ev)
    }
}

impl From<ClassCancelled> for Event {
    fn from(ev: ClassCancelled) -> Self {
        Self::ClassCancelled(ev)
    }
}

impl From<ClassCompleted> for Event {
    fn from(ev: ClassCompleted) -> Self {
        Self::ClassCompleted(ev)
    }
}

impl From<SubscriptionDeactivated> for Event {
    fn from(ev: SubscriptionDeactivated) -> Self {
        Self::SubscriptionDeactivated(ev)
    }
}
