//! [`Command`] for unscheduling a [`Class`] on the teacher's behalf.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    Service,
    domain::{Cancellation, Class, cancellation, class},
    infra::{Database, database},
};

use super::{CancelClass, Command, cancel_class};

/// [`Command`] for unscheduling a [`Class`], as a teacher-initiated
/// [`CancelClass`].
#[derive(Clone, Copy, Debug)]
pub struct UnscheduleClass {
    /// ID of the [`Class`] to be unscheduled.
    pub class_id: class::Id,
}

impl<Db, Ev, Ml> Command<UnscheduleClass> for Service<Db, Ev, Ml>
where
    Db: Database<
            Select<By<Option<Class>, class::Id>>,
            Ok = Option<Class>,
            Err = Traced<database::Error>,
        >,
    Self: Command<
            CancelClass,
            Ok = Cancellation,
            Err = Traced<cancel_class::ExecutionError>,
        >,
{
    type Ok = Cancellation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UnscheduleClass,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UnscheduleClass { class_id } = cmd;

        let class = self
            .database()
            .execute(Select(By::<Option<Class>, _>::new(class_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClassNotExists(class_id))
            .map_err(tracerr::wrap!())?;

        if !class.is_scheduled() {
            return Err(tracerr::new!(E::CannotBeUnscheduled(class_id)));
        }

        self.execute(CancelClass {
            class_id,
            source: cancellation::Source::Teacher,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`UnscheduleClass`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Class`] is not scheduled, so cannot be unscheduled.
    #[display("`Class(id: {_0})` cannot be unscheduled")]
    CannotBeUnscheduled(#[error(not(source))] class::Id),

    /// Underlying [`CancelClass`] [`Command`] failed.
    #[display("Failed to cancel the class: {_0}")]
    #[from]
    Cancel(cancel_class::ExecutionError),

    /// [`Class`] with the provided ID does not exist.
    #[display("`Class(id: {_0})` does not exist")]
    ClassNotExists(#[error(not(source))] class::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::{
        DateTime,
        operations::{By, Select},
    };

    use super::{ExecutionError, UnscheduleClass};
    use crate::{
        command::{AssignClass, CreateClass},
        domain::{Class, Customer, Slot, cancellation, lesson},
        fixture::{self, DAY},
        infra::Database as _,
    };

    #[tokio::test]
    async fn cancels_on_behalf_of_the_teacher() {
        let world = fixture::world().await;
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
            &world,
            lesson::Kind::Ordinary,
            (DateTime::now() + DAY).coerce(),
        )
        .await;
        let class = world
            .service
            .execute(AssignClass { class_id: class.id, slot_id: slot.id })
            .await
            .unwrap();

        let cancellation = world
            .service
            .execute(UnscheduleClass { class_id: class.id })
            .await
            .unwrap();

        assert_eq!(cancellation.source, cancellation::Source::Teacher);
        let class: Option<Class> = world
            .service
            .database()
            .execute(Select(By::<Option<Class>, _>::new(class.id)))
            .await
            .unwrap();
        assert_eq!(class.unwrap().slot_id, None);
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
        assert_eq!(customer.unwrap().cancellation_streak, 0);
    }

    #[tokio::test]
    async fn rejects_an_unscheduled_class() {
        let world = fixture::world().await;
        let class = world
            .service
            .execute(CreateClass {
                customer_id: world.customer.id,
                lesson: lesson::Kind::Ordinary,
                price: "25USD".parse().unwrap(),
            })
            .await
            .unwrap();

        let err = world
            .service
            .execute(UnscheduleClass { class_id: class.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::CannotBeUnscheduled(id) if *id == class.id,
        ));
    }
}
