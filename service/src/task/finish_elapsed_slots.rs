//! [`FinishElapsedSlots`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Select, Start, Update};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    Service,
    command::{CompleteClass, complete_class},
    domain::{Class, Slot, slot},
    infra::{Database, database},
    read,
};

use super::Task;

/// Configuration for [`FinishElapsedSlots`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between elapsed [`Slot`]s sweeps.
    pub interval: time::Duration,

    /// Grace period after a [`Slot`] end before its [`Class`]es are
    /// considered held.
    pub grace: time::Duration,
}

/// [`Task`] sweeping elapsed [`Slot`]s and completing the [`Class`]es held
/// in them.
#[derive(Clone, Copy, Debug)]
pub struct FinishElapsedSlots<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Ev, Ml> Task<Start<By<FinishElapsedSlots<Self>, Config>>>
    for Service<Db, Ev, Ml>
where
    FinishElapsedSlots<Self>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<FinishElapsedSlots<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = FinishElapsedSlots {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::FinishElapsedSlots` failed: {e}");
            });
        }
    }
}

impl<Db, Ev, Ml> Task<Perform<()>> for FinishElapsedSlots<Service<Db, Ev, Ml>>
where
    Db: Database<
            Select<By<Vec<Slot>, read::slot::Elapsed>>,
            Ok = Vec<Slot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Class>, slot::Id>>,
            Ok = Vec<Class>,
            Err = Traced<database::Error>,
        > + Database<Update<Slot>, Err = Traced<database::Error>>,
    Service<Db, Ev, Ml>: crate::command::Command<
            CompleteClass,
            Ok = Class,
            Err = Traced<complete_class::ExecutionError>,
        >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline = slot::StartDateTime::now() - self.config.grace;
        let db = self.service.database();

        let elapsed = db
            .execute(Select(By::<Vec<Slot>, _>::new(read::slot::Elapsed {
                deadline,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;

        for mut slot in elapsed {
            let held = db
                .execute(Select(By::<Vec<Class>, _>::new(slot.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!())?;
            for class in held.into_iter().filter(|c| !c.is_fully_used) {
                _ = self
                    .service
                    .execute(CompleteClass { class_id: class.id })
                    .await
                    .map_err(|e| {
                        log::error!(
                            class_id = %class.id,
                            "failed to complete a held class: {e}",
                        );
                    });
            }

            slot.is_finished = true;
            db.execute(Update(slot))
                .await
                .map_err(tracerr::map_from_and_wrap!())
                .map(drop)?;
        }

        Ok(())
    }
}

/// Error of [`FinishElapsedSlots`] execution.
pub type ExecutionError = Traced<database::Error>;
