//! [`Command`] for assigning a [`Class`] into an existing [`Slot`].

use std::fmt;

use common::operations::{
    By, Commit, Lock, Publish, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    Service,
    domain::{Class, Slot, class, slot},
    event,
    infra::{Database, Events, database},
};

use super::Command;

/// [`Command`] for assigning a [`Class`] into an existing [`Slot`].
///
/// The occupancy check and the seat increment happen in a single
/// transaction, so a [`Slot`] can never exceed its capacity, no matter how
/// many assignments race.
#[derive(Clone, Copy, Debug)]
pub struct AssignClass {
    /// ID of the [`Class`] to be assigned.
    pub class_id: class::Id,

    /// ID of the [`Slot`] to assign the [`Class`] into.
    pub slot_id: slot::Id,
}

impl<Db, Ev, Ml> Command<AssignClass> for Service<Db, Ev, Ml>
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
        > + Database<Update<Class>, Err = Traced<database::Error>>
        + Database<Update<Slot>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Ev: Events<Publish<event::Event>, Ok = (), Err: fmt::Display>,
{
    type Ok = Class;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AssignClass) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AssignClass { class_id, slot_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent occupancy changes of the same `Slot`.
        tx.execute(Lock(By::new(slot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut class = tx
            .execute(Select(By::<Option<Class>, _>::new(class_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClassNotExists(class_id))
            .map_err(tracerr::wrap!())?;

        let mut slot = tx
            .execute(Select(By::<Option<Slot>, _>::new(slot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SlotNotExists(slot_id))
            .map_err(tracerr::wrap!())?;

        if !class.schedulable_into(&slot) {
            return Err(tracerr::new!(E::CannotBeScheduled {
                class_id,
                slot_id,
            }));
        }

        class.slot_id = Some(slot.id);
        slot.attach();

        tx.execute(Update(class.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Update(slot.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let scheduled = event::ClassScheduled {
            class: class.clone(),
            teacher_id: slot.teacher_id,
        };
        if let Err(e) = self.events().execute(Publish(scheduled.into())).await
        {
            log::warn!("failed to publish `ClassScheduled` event: {e}");
        }

        Ok(class)
    }
}

/// Error of [`AssignClass`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Class`] cannot be scheduled into the [`Slot`].
    #[display(
        "`Class(id: {class_id})` cannot be scheduled \
         into `Slot(id: {slot_id})`"
    )]
    CannotBeScheduled {
        /// ID of the [`Class`] to be scheduled.
        class_id: class::Id,

        /// ID of the rejecting [`Slot`].
        slot_id: slot::Id,
    },

    /// [`Class`] with the provided ID does not exist.
    #[display("`Class(id: {_0})` does not exist")]
    ClassNotExists(#[error(not(source))] class::Id),

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

    use super::{AssignClass, ExecutionError};
    use crate::{
        command::{CreateClass, CreateSubscription},
        domain::{Class, Slot, lesson, product},
        fixture::{self, DAY},
        infra::Database as _,
    };

    #[tokio::test]
    async fn occupies_a_seat_and_links_the_class() {
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
            DateTime::now().coerce(),
        )
        .await;

        let class = world
            .service
            .execute(AssignClass {
                class_id: class.id,
                slot_id: slot.id,
            })
            .await
            .unwrap();

        assert_eq!(class.slot_id, Some(slot.id));
        let stored: Option<Slot> = world
            .service
            .database()
            .execute(Select(By::<Option<Slot>, _>::new(slot.id)))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().taken, 1);
    }

    #[tokio::test]
    async fn rejects_lesson_kind_mismatch() {
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
            lesson::Kind::MasterClass,
            DateTime::now().coerce(),
        )
        .await;

        let err = world
            .service
            .execute(AssignClass {
                class_id: class.id,
                slot_id: slot.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::CannotBeScheduled { .. },
        ));
    }

    #[tokio::test]
    async fn paired_slot_fits_exactly_two_classes() {
        let world = fixture::world_with(vec![product::Unit {
            lesson: lesson::Kind::Paired,
            count: 3,
        }])
        .await;
        let sub = world
            .service
            .execute(CreateSubscription {
                customer_id: world.customer.id,
                product_id: world.product.id,
                price: "150USD".parse().unwrap(),
            })
            .await
            .unwrap();
        let classes: Vec<Class> = world
            .service
            .database()
            .execute(Select(By::<Vec<Class>, _>::new(sub.id)))
            .await
            .unwrap();
        let slot = fixture::seed_slot(
            &world,
            lesson::Kind::Paired,
            (DateTime::now() + DAY).coerce(),
        )
        .await;

        for class in &classes[..2] {
            world
                .service
                .execute(AssignClass {
                    class_id: class.id,
                    slot_id: slot.id,
                })
                .await
                .unwrap();
        }

        let err = world
            .service
            .execute(AssignClass {
                class_id: classes[2].id,
                slot_id: slot.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::CannotBeScheduled { .. },
        ));

        let stored: Option<Slot> = world
            .service
            .database()
            .execute(Select(By::<Option<Slot>, _>::new(slot.id)))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().taken, 2);
    }

    #[tokio::test]
    async fn rejects_already_scheduled_class() {
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
        let first = fixture::seed_slot(
            &world,
            lesson::Kind::Ordinary,
            DateTime::now().coerce(),
        )
        .await;
        let second = fixture::seed_slot(
            &world,
            lesson::Kind::Ordinary,
            (DateTime::now() + DAY).coerce(),
        )
        .await;

        world
            .service
            .execute(AssignClass {
                class_id: class.id,
                slot_id: first.id,
            })
            .await
            .unwrap();
        let err = world
            .service
            .execute(AssignClass {
                class_id: class.id,
                slot_id: second.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::CannotBeScheduled { .. },
        ));
    }
}
