//! Outgoing mail implementations.

use common::operations::Deliver;
use derive_more::{Display, Error as StdError};
use tracerr::Traced;
use tracing as log;

use crate::domain::{Subscription, customer};

/// Deliverer of [`Letter`]s.
pub use common::Handler as Mailer;

/// Letter to be delivered to a [`customer::Customer`].
#[derive(Clone, Debug)]
pub struct Letter {
    /// Address to deliver this [`Letter`] to.
    pub to: customer::Email,

    /// Time zone to render dates of this [`Letter`] in.
    pub timezone: customer::TimeZone,

    /// [`Template`] this [`Letter`] is rendered from.
    pub template: Template,
}

/// Template of a [`Letter`].
#[derive(Clone, Debug)]
pub enum Template {
    /// Reminder about an idle [`Subscription`] wasting its owner's money.
    WasteMoneyReminder {
        /// Idle [`Subscription`] being reminded about.
        subscription: Subscription,

        /// Indicator whether such reminder has been sent before.
        is_repeat: bool,
    },
}

/// [`Mailer`] writing [`Letter`]s into the log instead of delivering them.
///
/// Stands in for a real delivery backend in development setups.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl Mailer<Deliver<Letter>> for Log {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Deliver(letter): Deliver<Letter>,
    ) -> Result<Self::Ok, Self::Err> {
        match &letter.template {
            Template::WasteMoneyReminder {
                subscription,
                is_repeat,
            } => {
                log::info!(
                    to = %letter.to,
                    timezone = %letter.timezone,
                    subscription_id = %subscription.id,
                    is_repeat,
                    "waste money reminder",
                );
            }
        }
        Ok(())
    }
}

/// Error of delivering a [`Letter`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {}
