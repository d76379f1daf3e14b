//! [`Command`] for scheduling a [`Class`] directly onto a teacher's
//! calendar.

use std::fmt;

use common::operations::{
    By, Commit, Insert, Publish, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    Service,
    domain::{Class, Slot, Teacher, class, slot, teacher},
    event,
    infra::{Database, Events, database},
    read,
};

use super::Command;

/// [`Command`] for scheduling a [`Class`] directly onto a teacher's
/// calendar, at an arbitrary start moment.
///
/// Only lessons not requiring a pre-created timeline entry may be scheduled
/// this way. The backing [`Slot`] is looked up by its natural key and created
/// on demand, so repeated scheduling at the same moment reuses the same
/// [`Slot`].
#[derive(Clone, Copy, Debug)]
pub struct ScheduleClass {
    /// ID of the [`Class`] to be scheduled.
    pub class_id: class::Id,

    /// ID of the [`Teacher`] to host the lesson.
    pub teacher_id: teacher::Id,

    /// Start of the lesson.
    pub start: slot::StartDateTime,

    /// Indicator whether a newly created [`Slot`] may fall outside the
    /// [`Teacher`]'s working hours.
    pub allow_besides_working_hours: bool,
}

impl<Db, Ev, Ml> Command<ScheduleClass> for Service<Db, Ev, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Teacher>, teacher::Id>>,
            Ok = Option<Teacher>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Class>, class::Id>>,
            Ok = Option<Class>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Slot>, read::slot::ByStart>>,
            Ok = Option<Slot>,
            Err = Traced<database::Error>,
        > + Database<Insert<Slot>, Err = Traced<database::Error>>
        + Database<Update<Class>, Err = Traced<database::Error>>
        + Database<Update<Slot>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Ev: Events<Publish<event::Event>, Ok = (), Err: fmt::Display>,
{
    type Ok = Class;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ScheduleClass,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ScheduleClass {
            class_id,
            teacher_id,
            start,
            allow_besides_working_hours,
        } = cmd;

        let teacher = self
            .database()
            .execute(Select(By::<Option<Teacher>, _>::new(teacher_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TeacherNotExists(teacher_id))
            .map_err(tracerr::wrap!())?;

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

        if class.lesson.timeline_entry_required() {
            return Err(tracerr::new!(E::EntryRequired(class_id)));
        }

        let existing = tx
            .execute(Select(By::<Option<Slot>, _>::new(read::slot::ByStart {
                teacher_id: teacher.id,
                lesson: class.lesson,
                start,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let is_new = existing.is_none();
        let mut slot = existing.unwrap_or_else(|| {
            Slot::new(
                teacher.id,
                class.lesson,
                start,
                allow_besides_working_hours,
            )
        });

        if !class.schedulable_into(&slot) {
            return Err(tracerr::new!(E::CannotBeScheduled {
                class_id,
                slot_id: slot.id,
            }));
        }

        class.slot_id = Some(slot.id);
        slot.attach();

        if is_new {
            tx.execute(Insert(slot.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        } else {
            tx.execute(Update(slot.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Update(class.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let scheduled = event::ClassScheduled {
            class: class.clone(),
            teacher_id: teacher.id,
        };
        if let Err(e) = self.events().execute(Publish(scheduled.into())).await
        {
            log::warn!("failed to publish `ClassScheduled` event: {e}");
        }

        Ok(class)
    }
}

/// Error of [`ScheduleClass`] [`Command`] execution.
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

    /// [`Class`] lesson kind cannot be scheduled directly.
    #[display(
        "`Class(id: {_0})` cannot be scheduled directly, \
         its lesson kind requires a timeline entry"
    )]
    EntryRequired(#[error(not(source))] class::Id),

    /// [`Teacher`] with the provided ID does not exist.
    #[display("`Teacher(id: {_0})` does not exist")]
    TeacherNotExists(#[error(not(source))] teacher::Id),
}
