//! [`NotifyWasteMoney`] [`Task`].

use std::{convert::Infallible, error::Error, fmt, time};

use common::{
    DateTime,
    operations::{By, Deliver, Perform, Select, Start, Update},
};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    Service,
    domain::{Customer, Slot, Subscription, customer, subscription},
    infra::{
        Database, Mailer, database,
        mailer::{Letter, Template},
    },
    read,
};

use super::Task;

/// Configuration for [`NotifyWasteMoney`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between idle [`Subscription`]s scans.
    pub interval: time::Duration,

    /// Idle period after which the first reminder is sent.
    pub first_delay: time::Duration,

    /// Cooldown between repeated reminders for the same [`Subscription`].
    pub repeat_cooldown: time::Duration,
}

/// [`Task`] reminding customers about idle [`Subscription`]s wasting their
/// money.
///
/// A scan stamps every reminded [`Subscription`], so re-running it
/// immediately sends nothing new.
#[derive(Clone, Copy, Debug)]
pub struct NotifyWasteMoney<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Ev, Ml> Task<Start<By<NotifyWasteMoney<Self>, Config>>>
    for Service<Db, Ev, Ml>
where
    NotifyWasteMoney<Self>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<NotifyWasteMoney<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = NotifyWasteMoney {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::NotifyWasteMoney` failed: {e}");
            });
        }
    }
}

impl<Db, Ev, Ml> Task<Perform<()>> for NotifyWasteMoney<Service<Db, Ev, Ml>>
where
    Db: Database<
            Select<By<Vec<Subscription>, read::subscription::Unstarted>>,
            Ok = Vec<Subscription>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Slot>, subscription::Id>>,
            Ok = Vec<Slot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<Update<Subscription>, Err = Traced<database::Error>>,
    Ml: Mailer<Deliver<Letter>, Ok = (), Err: fmt::Display>,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let now = DateTime::now().coerce();
        let db = self.service.database();

        let candidates = db
            .execute(Select(By::<Vec<Subscription>, _>::new(
                read::subscription::Unstarted,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;

        for mut subscription in candidates {
            let last_slot_start = db
                .execute(Select(By::<Vec<Slot>, _>::new(subscription.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!())?
                .into_iter()
                .map(|s| s.start)
                .max();

            if !subscription.needs_waste_money_reminder(
                now,
                self.config.first_delay,
                self.config.repeat_cooldown,
                last_slot_start,
            ) {
                continue;
            }

            let Some(customer) = db
                .execute(Select(By::<Option<Customer>, _>::new(
                    subscription.customer_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!())?
            else {
                log::warn!(
                    subscription_id = %subscription.id,
                    "subscription owner is gone, skipping reminder",
                );
                continue;
            };

            let letter = Letter {
                to: customer.email.clone(),
                timezone: customer.timezone.clone(),
                template: Template::WasteMoneyReminder {
                    subscription: subscription.clone(),
                    is_repeat: subscription.waste_money_notified_at.is_some(),
                },
            };
            if let Err(e) =
                self.service.mailer().execute(Deliver(letter)).await
            {
                log::warn!(
                    subscription_id = %subscription.id,
                    "failed to deliver waste money reminder: {e}",
                );
                continue;
            }

            subscription.waste_money_notified_at = Some(now.coerce());
            db.execute(Update(subscription))
                .await
                .map_err(tracerr::map_from_and_wrap!())
                .map(drop)?;
        }

        Ok(())
    }
}

/// Error of [`NotifyWasteMoney`] execution.
pub type ExecutionError = Traced<database::Error>;
