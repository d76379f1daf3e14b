//! [`Command`] for completing a held [`Class`].

use std::fmt;

use common::operations::{
    By, Commit, Publish, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    Service,
    domain::{
        Class, ProductContainer as _, Slot, Subscription, class, slot,
        subscription,
    },
    event,
    infra::{Database, Events, database},
    read::class::Unused,
};

use super::Command;

/// [`Command`] for completing a held [`Class`].
///
/// Marks the [`Class`] as used and settles its owning [`Subscription`]:
/// anchors the entitlement window to the first completed lesson, and retires
/// the [`Subscription`] once its last [`Class`] is used up.
#[derive(Clone, Copy, Debug)]
pub struct CompleteClass {
    /// ID of the [`Class`] to be completed.
    pub class_id: class::Id,
}

impl<Db, Ev, Ml> Command<CompleteClass> for Service<Db, Ev, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Class>, class::Id>>,
            Ok = Option<Class>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Slot>, slot::Id>>,
            Ok = Option<Slot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Subscription>, subscription::Id>>,
            Ok = Option<Subscription>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Slot>, subscription::Id>>,
            Ok = Vec<Slot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Unused<Class>>, subscription::Id>>,
            Ok = Vec<Unused<Class>>,
            Err = Traced<database::Error>,
        > + Database<Update<Class>, Err = Traced<database::Error>>
        + Database<Update<Subscription>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Ev: Events<Publish<event::Event>, Ok = (), Err: fmt::Display>,
{
    type Ok = Class;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteClass,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteClass { class_id } = cmd;

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

        let slot = tx
            .execute(Select(By::<Option<Slot>, _>::new(slot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SlotNotExists(slot_id))
            .map_err(tracerr::wrap!())?;

        class.mark_fully_used();
        tx.execute(Update(class.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if let Some(sub_id) = class.subscription_id {
            let mut subscription = tx
                .execute(Select(By::<Option<Subscription>, _>::new(sub_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::SubscriptionNotExists(sub_id))
                .map_err(tracerr::wrap!())?;

            if subscription.first_lesson_date.is_none() {
                let first_start = tx
                    .execute(Select(By::<Vec<Slot>, _>::new(sub_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .into_iter()
                    .map(|s| s.start)
                    .min()
                    .unwrap_or(slot.start);
                subscription.record_first_lesson(first_start.coerce());
            }

            let unused = tx
                .execute(Select(By::<Vec<Unused<Class>>, _>::new(sub_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if unused.is_empty() {
                subscription.mark_fully_used();
            }

            tx.execute(Update(subscription))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let completed = event::ClassCompleted {
            class: class.clone(),
            teacher_id: slot.teacher_id,
        };
        if let Err(e) = self.events().execute(Publish(completed.into())).await
        {
            log::warn!("failed to publish `ClassCompleted` event: {e}");
        }

        Ok(class)
    }
}

/// Error of [`CompleteClass`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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

    /// [`Subscription`] with the provided ID does not exist.
    #[display("`Subscription(id: {_0})` does not exist")]
    SubscriptionNotExists(#[error(not(source))] subscription::Id),
}
