//! [`Command`] for cancelling a scheduled [`Class`].

use std::fmt;

use common::{
    DateTime,
    operations::{
        By, Commit, Insert, Lock, Publish, Select, Transact, Transacted,
        Update,
    },
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    Service,
    domain::{
        Cancellation, Class, Customer, ProductContainer as _, Slot,
        cancellation, class, customer, slot,
    },
    event,
    infra::{Database, Events, database},
};

use super::Command;

/// [`Command`] for cancelling a scheduled [`Class`].
///
/// Frees the occupied [`Slot`] seat and renews the [`Class`], making it
/// schedulable again. A [`Cancellation`] record is kept forever for
/// accounting.
#[derive(Clone, Copy, Debug)]
pub struct CancelClass {
    /// ID of the [`Class`] to be cancelled.
    pub class_id: class::Id,

    /// [`cancellation::Source`] this cancellation is initiated by.
    pub source: cancellation::Source,
}

impl<Db, Ev, Ml> Command<CancelClass> for Service<Db, Ev, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Lock<By<Slot, slot::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Class>, class::Id>>,
            Ok = Option<Class>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Slot>, slot::Id>>,
            Ok = Option<Slot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<Insert<Cancellation>, Err = Traced<database::Error>>
        + Database<Update<Class>, Err = Traced<database::Error>>
        + Database<Update<Customer>, Err = Traced<database::Error>>
        + Database<Update<Slot>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Ev: Events<Publish<event::Event>, Ok = (), Err: fmt::Display>,
{
    type Ok = Cancellation;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CancelClass) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelClass { class_id, source } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut class = tx
            .execute(Select(By::<Option<Class>, _>::new(class_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClassNotExists(class_id))
            .map_err(tracerr::wrap!())?;

        let slot_id = class
            .slot_id
            .ok_or(E::ClassNotScheduled(class_id))
            .map_err(tracerr::wrap!())?;

        // Avoid concurrent occupancy changes of the same `Slot`.
        tx.execute(Lock(By::new(slot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut slot = tx
            .execute(Select(By::<Option<Slot>, _>::new(slot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SlotNotExists(slot_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now().coerce();
        if !Class::may_be_cancelled(source, slot.start, now) {
            return Err(tracerr::new!(E::CancellationForbidden {
                class_id,
                source,
            }));
        }

        if source == cancellation::Source::Customer {
            let mut customer = tx
                .execute(Select(By::<Option<Customer>, _>::new(
                    class.customer_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::CustomerNotExists(class.customer_id))
                .map_err(tracerr::wrap!())?;
            customer.cancellation_streak += 1;
            tx.execute(Update(customer))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        let cancellation = Cancellation {
            id: cancellation::Id::new(),
            class_id,
            customer_id: class.customer_id,
            teacher_id: slot.teacher_id,
            source,
            cancelled_at: now.coerce(),
        };

        tx.execute(Insert(cancellation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        class.renew();
        tx.execute(Update(class.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        slot.release();
        tx.execute(Update(slot.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let cancelled = event::ClassCancelled {
            class,
            cancellation: cancellation.clone(),
            teacher_id: slot.teacher_id,
        };
        if let Err(e) = self.events().execute(Publish(cancelled.into())).await
        {
            log::warn!("failed to publish `ClassCancelled` event: {e}");
        }

        Ok(cancellation)
    }
}

/// Error of [`CancelClass`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`cancellation::Source`] is not allowed to cancel the [`Class`]
    /// anymore.
    #[display(
        "`Class(id: {class_id})` cannot be cancelled by `{source}` source"
    )]
    CancellationForbidden {
        /// ID of the [`Class`] being cancelled.
        class_id: class::Id,

        /// Rejected [`cancellation::Source`].
        #[error(not(source))]
        source: cancellation::Source,
    },

    /// [`Class`] with the provided ID does not exist.
    #[display("`Class(id: {_0})` does not exist")]
    ClassNotExists(#[error(not(source))] class::Id),

    /// [`Class`] is not scheduled anywhere.
    #[display("`Class(id: {_0})` is not scheduled")]
    ClassNotScheduled(#[error(not(source))] class::Id),

    /// [`Customer`] with the provided ID does not exist.
    #[display("`Customer(id: {_0})` does not exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Slot`] with the provided ID does not exist.
    #[display("`Slot(id: {_0})` does not exist")]
    SlotNotExists(#[error(not(source))] slot::Id),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        DateTime,
        operations::{By, Select},
    };

    use super::{CancelClass, ExecutionError};
    use crate::{
        command::{AssignClass, CreateClass},
        domain::{
            Class, Customer, Slot, accounting, cancellation, lesson,
        },
        fixture::{self, DAY},
        infra::Database as _,
    };

    const HOUR: Duration = Duration::from_secs(60 * 60);

    async fn scheduled_class(
        world: &fixture::World,
        start: DateTime,
    ) -> (Class, Slot) {
        let class = world
            .service
            .execute(CreateClass {
                customer_id: world.customer.id,
                lesson: lesson::Kind::Ordinary,
                price: "25USD".parse().unwrap(),
            })
            .await
            .unwrap();
        let slot = fixture::seed_slot(
            world,
            lesson::Kind::Ordinary,
            start.coerce(),
        )
        .await;
        let class = world
            .service
            .execute(AssignClass { class_id: class.id, slot_id: slot.id })
            .await
            .unwrap();
        (class, slot)
    }

    #[tokio::test]
    async fn frees_the_seat_and_counts_the_streak() {
        let world = fixture::world().await;
        let (class, slot) =
            scheduled_class(&world, DateTime::now() + DAY).await;

        let cancellation = world
            .service
            .execute(CancelClass {
                class_id: class.id,
                source: cancellation::Source::Customer,
            })
            .await
            .unwrap();

        assert_eq!(cancellation.class_id, class.id);
        assert_eq!(cancellation.teacher_id, world.teacher.id);
        assert_eq!(cancellation.source, cancellation::Source::Customer);
        let class: Option<Class> = world
            .service
            .database()
            .execute(Select(By::<Option<Class>, _>::new(class.id)))
            .await
            .unwrap();
        let class = class.unwrap();
        assert_eq!(class.slot_id, None);
        assert!(!class.is_fully_used);
        let slot: Option<Slot> = world
            .service
            .database()
            .execute(Select(By::<Option<Slot>, _>::new(slot.id)))
            .await
            .unwrap();
        assert_eq!(slot.unwrap().taken, 0);
        let customer: Option<Customer> = world
            .service
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(
                world.customer.id,
            )))
            .await
            .unwrap();
        assert_eq!(customer.unwrap().cancellation_streak, 1);
    }

    #[tokio::test]
    async fn records_customer_cancellation_in_the_ledger() {
        let world = fixture::world().await;
        let (class, _) =
            scheduled_class(&world, DateTime::now() + DAY).await;

        let cancellation = world
            .service
            .execute(CancelClass {
                class_id: class.id,
                source: cancellation::Source::Customer,
            })
            .await
            .unwrap();

        let ledger: Vec<accounting::Event> = world
            .service
            .database()
            .execute(Select(By::<Vec<accounting::Event>, _>::new(
                world.teacher.id,
            )))
            .await
            .unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger[0].kind,
            accounting::Kind::CustomerInspiredCancellation,
        );
        assert_eq!(
            ledger[0].originator,
            accounting::Originator::Cancellation(cancellation.id),
        );
    }

    #[tokio::test]
    async fn forbids_customer_cancelling_a_started_class() {
        let world = fixture::world().await;
        let (class, _) =
            scheduled_class(&world, DateTime::now() - HOUR).await;

        let err = world
            .service
            .execute(CancelClass {
                class_id: class.id,
                source: cancellation::Source::Customer,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::CancellationForbidden {
                source: cancellation::Source::Customer,
                ..
            },
        ));
    }

    #[tokio::test]
    async fn allows_teacher_within_the_grace_hour() {
        let world = fixture::world().await;
        let (class, _) = scheduled_class(
            &world,
            DateTime::now() - Duration::from_secs(30 * 60),
        )
        .await;

        world
            .service
            .execute(CancelClass {
                class_id: class.id,
                source: cancellation::Source::Teacher,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn forbids_teacher_after_the_grace_hour() {
        let world = fixture::world().await;
        let (class, _) =
            scheduled_class(&world, DateTime::now() - 2 * HOUR).await;

        let err = world
            .service
            .execute(CancelClass {
                class_id: class.id,
                source: cancellation::Source::Teacher,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::CancellationForbidden { .. },
        ));
    }

    #[tokio::test]
    async fn backoffice_cancels_anytime_without_accounting() {
        let world = fixture::world().await;
        let (class, _) =
            scheduled_class(&world, DateTime::now() - 7 * DAY).await;

        world
            .service
            .execute(CancelClass {
                class_id: class.id,
                source: cancellation::Source::Backoffice,
            })
            .await
            .unwrap();

        let ledger: Vec<accounting::Event> = world
            .service
            .database()
            .execute(Select(By::<Vec<accounting::Event>, _>::new(
                world.teacher.id,
            )))
            .await
            .unwrap();
        assert!(ledger.is_empty());
        let customer: Option<Customer> = world
            .service
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(
                world.customer.id,
            )))
            .await
            .unwrap();
        assert_eq!(customer.unwrap().cancellation_streak, 0);
    }
}
