//! [`Command`] definition.

pub mod assign_class;
pub mod cancel_class;
pub mod complete_class;
pub mod create_class;
pub mod create_subscription;
pub mod deactivate_subscription;
pub mod schedule_class;
pub mod unschedule_class;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    assign_class::AssignClass, cancel_class::CancelClass,
    complete_class::CompleteClass, create_class::CreateClass,
    create_subscription::CreateSubscription,
    deactivate_subscription::DeactivateSubscription,
    schedule_class::ScheduleClass, unschedule_class::UnscheduleClass,
};
