//! [`Command`] for deactivating a [`Subscription`].

use std::fmt;

use common::operations::{
    By, Commit, Lock, Publish, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    Service,
    domain::{
        Class, ProductContainer as _, Slot, Subscription, subscription,
    },
    event,
    infra::{Database, Events, database},
    read::class::Unused,
};

use super::Command;

/// [`Command`] for deactivating a [`Subscription`] instead of deleting it.
///
/// Cascades to all the not-yet-used [`Class`]es of the [`Subscription`],
/// marking them used too. Calendar seats they occupy stay occupied, and the
/// whole history survives deactivation.
#[derive(Clone, Copy, Debug)]
pub struct DeactivateSubscription {
    /// ID of the [`Subscription`] to be deactivated.
    pub subscription_id: subscription::Id,
}

impl<Db, Ev, Ml> Command<DeactivateSubscription> for Service<Db, Ev, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Subscription, subscription::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Subscription>, subscription::Id>>,
            Ok = Option<Subscription>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Unused<Class>>, subscription::Id>>,
            Ok = Vec<Unused<Class>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Slot>, subscription::Id>>,
            Ok = Vec<Slot>,
            Err = Traced<database::Error>,
        > + Database<Update<Class>, Err = Traced<database::Error>>
        + Database<Update<Subscription>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Ev: Events<Publish<event::Event>, Ok = (), Err: fmt::Display>,
{
    type Ok = Subscription;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeactivateSubscription,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeactivateSubscription { subscription_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent deactivations of the same `Subscription`.
        tx.execute(Lock(By::new(subscription_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut subscription = tx
            .execute(Select(By::<Option<Subscription>, _>::new(
                subscription_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SubscriptionNotExists(subscription_id))
            .map_err(tracerr::wrap!())?;

        if subscription.is_fully_used {
            return Err(tracerr::new!(E::AlreadyDeactivated(
                subscription_id,
            )));
        }

        let unused = tx
            .execute(Select(By::<Vec<Unused<Class>>, _>::new(
                subscription_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for Unused(mut class) in unused {
            class.mark_fully_used();
            tx.execute(Update(class))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        if subscription.first_lesson_date.is_none() {
            let first_start = tx
                .execute(Select(By::<Vec<Slot>, _>::new(subscription_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .into_iter()
                .map(|s| s.start)
                .min();
            if let Some(start) = first_start {
                subscription.record_first_lesson(start.coerce());
            }
        }

        subscription.deactivate();
        tx.execute(Update(subscription.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let deactivated = event::SubscriptionDeactivated {
            subscription: subscription.clone(),
        };
        if let Err(e) =
            self.events().execute(Publish(deactivated.into())).await
        {
            log::warn!("failed to publish `SubscriptionDeactivated` event: {e}");
        }

        Ok(subscription)
    }
}

/// Error of [`DeactivateSubscription`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Subscription`] is deactivated already.
    #[display("`Subscription(id: {_0})` is already deactivated")]
    AlreadyDeactivated(#[error(not(source))] subscription::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Subscription`] with the provided ID does not exist.
    #[display("`Subscription(id: {_0})` does not exist")]
    SubscriptionNotExists(#[error(not(source))] subscription::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        DateTime,
        operations::{By, Select},
    };

    use super::{DeactivateSubscription, ExecutionError};
    use crate::{
        command::AssignClass,
        domain::{Class, Slot, lesson},
        fixture::{self, DAY},
        infra::Database as _,
    };

    #[tokio::test]
    async fn burns_remaining_classes_but_keeps_seats_occupied() {
        let world = fixture::world().await;
        let subscription = fixture::seed_subscription(&world).await;
        let classes: Vec<Class> = world
            .service
            .database()
            .execute(Select(By::<Vec<Class>, _>::new(subscription.id)))
            .await
            .unwrap();
        let slot = fixture::seed_slot(
            &world,
            lesson::Kind::Ordinary,
            (DateTime::now() + DAY).coerce(),
        )
        .await;
        world
            .service
            .execute(AssignClass {
                class_id: classes[0].id,
                slot_id: slot.id,
            })
            .await
            .unwrap();

        let subscription = world
            .service
            .execute(DeactivateSubscription {
                subscription_id: subscription.id,
            })
            .await
            .unwrap();

        assert!(subscription.is_fully_used);
        let classes: Vec<Class> = world
            .service
            .database()
            .execute(Select(By::<Vec<Class>, _>::new(subscription.id)))
            .await
            .unwrap();
        assert!(classes.iter().all(|c| c.is_fully_used));
        let slot: Option<Slot> = world
            .service
            .database()
            .execute(Select(By::<Option<Slot>, _>::new(slot.id)))
            .await
            .unwrap();
        assert_eq!(slot.unwrap().taken, 1);
    }

    #[tokio::test]
    async fn anchors_the_entitlement_before_retiring() {
        let world = fixture::world().await;
        let subscription = fixture::seed_subscription(&world).await;
        let classes: Vec<Class> = world
            .service
            .database()
            .execute(Select(By::<Vec<Class>, _>::new(subscription.id)))
            .await
            .unwrap();
        let slot = fixture::seed_slot(
            &world,
            lesson::Kind::Ordinary,
            DateTime::now().coerce(),
        )
        .await;
        world
            .service
            .execute(AssignClass {
                class_id: classes[0].id,
                slot_id: slot.id,
            })
            .await
            .unwrap();

        let subscription = world
            .service
            .execute(DeactivateSubscription {
                subscription_id: subscription.id,
            })
            .await
            .unwrap();

        assert_eq!(
            subscription.first_lesson_date,
            Some(slot.start.coerce()),
        );
    }

    #[tokio::test]
    async fn rejects_a_retired_subscription() {
        let world = fixture::world().await;
        let subscription = fixture::seed_subscription(&world).await;
        world
            .service
            .execute(DeactivateSubscription {
                subscription_id: subscription.id,
            })
            .await
            .unwrap();

        let err = world
            .service
            .execute(DeactivateSubscription {
                subscription_id: subscription.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyDeactivated(id) if *id == subscription.id,
        ));
    }
}
