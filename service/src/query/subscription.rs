//! [`Query`] collection related to a single [`Subscription`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    Service,
    domain::{Class, Subscription, lesson, subscription},
    infra::{Database, database},
};

use super::{DatabaseQuery, Query};

/// Queries a [`Subscription`] by its [`subscription::Id`].
pub type ById = DatabaseQuery<By<Option<Subscription>, subscription::Id>>;

/// [`Query`] of the per-lesson consumption status of a [`Subscription`].
#[derive(Clone, Copy, Debug)]
pub struct Status(pub subscription::Id);

/// Consumption counters of one [`lesson::Kind`] within a [`Subscription`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LessonStatus {
    /// [`lesson::Kind`] these counters describe.
    pub lesson: lesson::Kind,

    /// Number of [`Class`]es not used up yet (scheduled ones included).
    pub available: usize,

    /// Number of [`Class`]es currently sitting on a calendar.
    pub scheduled: usize,

    /// Number of [`Class`]es used up.
    pub used: usize,
}

impl<Db, Ev, Ml> Query<Status> for Service<Db, Ev, Ml>
where
    Db: Database<
            Select<By<Option<Subscription>, subscription::Id>>,
            Ok = Option<Subscription>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Class>, subscription::Id>>,
            Ok = Vec<Class>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<LessonStatus>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Status) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Status(subscription_id) = query;

        self.database()
            .execute(Select(By::<Option<Subscription>, _>::new(
                subscription_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SubscriptionNotExists(subscription_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let classes = self
            .database()
            .execute(Select(By::<Vec<Class>, _>::new(subscription_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut statuses = Vec::<LessonStatus>::new();
        for class in &classes {
            let idx = statuses
                .iter()
                .position(|s| s.lesson == class.lesson)
                .unwrap_or_else(|| {
                    statuses.push(LessonStatus {
                        lesson: class.lesson,
                        available: 0,
                        scheduled: 0,
                        used: 0,
                    });
                    statuses.len() - 1
                });
            let status = &mut statuses[idx];
            if class.is_fully_used {
                status.used += 1;
            } else {
                status.available += 1;
                if class.is_scheduled() {
                    status.scheduled += 1;
                }
            }
        }
        Ok(statuses)
    }
}

/// Error of [`Status`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Subscription`] with the provided ID does not exist.
    #[display("`Subscription(id: {_0})` does not exist")]
    SubscriptionNotExists(#[error(not(source))] subscription::Id),
}
