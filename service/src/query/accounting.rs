//! [`Query`] collection over the accounting ledger.

use common::{
    DateTime,
    operations::{By, Select},
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    Service,
    domain::{
        Cancellation, Class, Slot, accounting, cancellation, class, customer,
        slot, teacher,
    },
    infra::{Database, database},
};

use super::{DatabaseQuery, Query};

/// Queries the accounting ledger of a [`teacher::Teacher`].
///
/// [`teacher::Teacher`]: crate::domain::Teacher
pub type ByTeacher = DatabaseQuery<By<Vec<accounting::Event>, teacher::Id>>;

/// [`Query`] of the billing moment of an [`accounting::Event`].
///
/// For a completed lesson it's the start of the calendar slot the lesson was
/// held in. For a cancellation it's the moment the cancellation happened.
#[derive(Clone, Debug)]
pub struct OriginatorTime(pub accounting::Event);

impl<Db, Ev, Ml> Query<OriginatorTime> for Service<Db, Ev, Ml>
where
    Db: Database<
            Select<By<Option<Class>, class::Id>>,
            Ok = Option<Class>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Slot>, slot::Id>>,
            Ok = Option<Slot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Cancellation>, cancellation::Id>>,
            Ok = Option<Cancellation>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = DateTime;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: OriginatorTime,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let OriginatorTime(event) = query;

        match event.originator {
            accounting::Originator::Class(class_id) => {
                let class = self
                    .database()
                    .execute(Select(By::<Option<Class>, _>::new(class_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ClassNotExists(class_id))
                    .map_err(tracerr::wrap!())?;
                let slot_id = class
                    .slot_id
                    .ok_or(E::ClassNotScheduled(class_id))
                    .map_err(tracerr::wrap!())?;
                let slot = self
                    .database()
                    .execute(Select(By::<Option<Slot>, _>::new(slot_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::SlotNotExists(slot_id))
                    .map_err(tracerr::wrap!())?;
                Ok(slot.start.coerce())
            }
            accounting::Originator::Cancellation(cancellation_id) => {
                let cancellation = self
                    .database()
                    .execute(Select(By::<Option<Cancellation>, _>::new(
                        cancellation_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::CancellationNotExists(cancellation_id))
                    .map_err(tracerr::wrap!())?;
                Ok(cancellation.cancelled_at.coerce())
            }
        }
    }
}

/// [`Query`] of the [`customer::Customer`]s affected by an
/// [`accounting::Event`].
///
/// For a completed lesson these are the owners of all the [`Class`]es held
/// in the same calendar slot. For a cancellation it's the single customer
/// whose [`Class`] was cancelled.
///
/// [`customer::Customer`]: crate::domain::Customer
#[derive(Clone, Debug)]
pub struct OriginatorCustomers(pub accounting::Event);

impl<Db, Ev, Ml> Query<OriginatorCustomers> for Service<Db, Ev, Ml>
where
    Db: Database<
            Select<By<Option<Class>, class::Id>>,
            Ok = Option<Class>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Class>, slot::Id>>,
            Ok = Vec<Class>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Cancellation>, cancellation::Id>>,
            Ok = Option<Cancellation>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<customer::Id>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: OriginatorCustomers,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let OriginatorCustomers(event) = query;

        match event.originator {
            accounting::Originator::Class(class_id) => {
                let class = self
                    .database()
                    .execute(Select(By::<Option<Class>, _>::new(class_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ClassNotExists(class_id))
                    .map_err(tracerr::wrap!())?;
                let Some(slot_id) = class.slot_id else {
                    return Ok(vec![class.customer_id]);
                };
                let attendees = self
                    .database()
                    .execute(Select(By::<Vec<Class>, _>::new(slot_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                Ok(attendees.into_iter().map(|c| c.customer_id).collect())
            }
            accounting::Originator::Cancellation(cancellation_id) => {
                let cancellation = self
                    .database()
                    .execute(Select(By::<Option<Cancellation>, _>::new(
                        cancellation_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::CancellationNotExists(cancellation_id))
                    .map_err(tracerr::wrap!())?;
                Ok(vec![cancellation.customer_id])
            }
        }
    }
}

/// Error of an accounting [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Cancellation`] with the provided ID does not exist.
    #[display("`Cancellation(id: {_0})` does not exist")]
    CancellationNotExists(#[error(not(source))] cancellation::Id),

    /// [`Class`] with the provided ID does not exist.
    #[display("`Class(id: {_0})` does not exist")]
    ClassNotExists(#[error(not(source))] class::Id),

    /// [`Class`] is not scheduled anywhere.
    #[display("`Class(id: {_0})` is not scheduled")]
    ClassNotScheduled(#[error(not(source))] class::Id),

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
    use common::{
        DateTime,
        operations::{By, Select},
    };

    use super::{ByTeacher, OriginatorCustomers, OriginatorTime};
    use crate::{
        command::{AssignClass, CancelClass, CompleteClass},
        domain::{Class, accounting, cancellation, lesson},
        fixture::{self, DAY},
        infra::Database as _,
    };

    async fn ledger(world: &fixture::World) -> Vec<accounting::Event> {
        world
            .service
            .execute(ByTeacher::by(world.teacher.id))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn resolves_a_completed_lesson_to_its_slot() {
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
            (DateTime::now() - DAY).coerce(),
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
        world
            .service
            .execute(CompleteClass { class_id: classes[0].id })
            .await
            .unwrap();
        let event = ledger(&world).await.remove(0);

        let time =
            world.service.execute(OriginatorTime(event.clone())).await.unwrap();
        let customers = world
            .service
            .execute(OriginatorCustomers(event))
            .await
            .unwrap();

        assert_eq!(time, slot.start.coerce());
        assert_eq!(customers, vec![world.customer.id]);
    }

    #[tokio::test]
    async fn resolves_a_cancellation_to_its_moment_and_customer() {
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
        let cancellation = world
            .service
            .execute(CancelClass {
                class_id: classes[0].id,
                source: cancellation::Source::Customer,
            })
            .await
            .unwrap();
        let event = ledger(&world).await.remove(0);

        let time =
            world.service.execute(OriginatorTime(event.clone())).await.unwrap();
        let customers = world
            .service
            .execute(OriginatorCustomers(event))
            .await
            .unwrap();

        assert_eq!(time, cancellation.cancelled_at.coerce());
        assert_eq!(customers, vec![cancellation.customer_id]);
    }
}
