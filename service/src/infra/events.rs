//! Domain [`event::Event`] sink implementations.

use common::operations::{Insert, Publish};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{accounting, cancellation},
    event,
    infra::{Database, database},
};

/// Sink of domain [`event::Event`]s.
pub use common::Handler as Events;

/// [`Events`] sink turning billable domain [`event::Event`]s into
/// [`accounting::Event`]s.
///
/// Non-billable [`event::Event`]s are logged and dropped.
#[derive(Clone, Debug)]
pub struct Recorder<Db> {
    /// [`Database`] the [`accounting::Event`]s ledger lives in.
    database: Db,
}

impl<Db> Recorder<Db> {
    /// Creates a new [`Recorder`] on top of the provided [`Database`].
    #[must_use]
    pub const fn new(database: Db) -> Self {
        Self { database }
    }
}

impl<Db> Events<Publish<event::Event>> for Recorder<Db>
where
    Db: Database<
            Insert<accounting::Event>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Publish(ev): Publish<event::Event>,
    ) -> Result<Self::Ok, Self::Err> {
        let record = match ev {
            event::Event::ClassCompleted(completed) => accounting::Event {
                id: accounting::Id::new(),
                kind: accounting::Kind::ClassCompleted,
                teacher_id: completed.teacher_id,
                originator: accounting::Originator::Class(completed.class.id),
                occurred_at: common::DateTime::now().coerce(),
            },
            event::Event::ClassCancelled(cancelled) => {
                if cancelled.cancellation.source
                    != cancellation::Source::Customer
                {
                    log::debug!(
                        class_id = %cancelled.class.id,
                        source = %cancelled.cancellation.source,
                        "skipping non-billable cancellation",
                    );
                    return Ok(());
                }
                accounting::Event {
                    id: accounting::Id::new(),
                    kind: accounting::Kind::CustomerInspiredCancellation,
                    teacher_id: cancelled.teacher_id,
                    originator: accounting::Originator::Cancellation(
                        cancelled.cancellation.id,
                    ),
                    occurred_at: common::DateTime::now().coerce(),
                }
            }
            event::Event::ClassScheduled(..)
            | event::Event::SubscriptionDeactivated(..) => {
                return Ok(());
            }
        };

        self.database
            .execute(Insert(record))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> Error))
    }
}

/// Error of publishing a domain [`event::Event`].
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
