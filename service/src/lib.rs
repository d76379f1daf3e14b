//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod event;
#[cfg(test)]
pub(crate) mod fixture;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::error::Error as StdError;

use common::operations::{By, Start};

#[cfg(doc)]
use infra::{Database, Events, Mailer};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// [`task::NotifyWasteMoney`] configuration.
    pub notify_waste_money: task::notify_waste_money::Config,

    /// [`task::FinishElapsedSlots`] configuration.
    pub finish_elapsed_slots: task::finish_elapsed_slots::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Ev, Ml> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Events`] sink of this [`Service`].
    events: Ev,

    /// [`Mailer`] of this [`Service`].
    mailer: Ml,
}

impl<Db, Ev, Ml> Service<Db, Ev, Ml> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        events: Ev,
        mailer: Ml,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::NotifyWasteMoney<Self>,
                        task::notify_waste_money::Config,
                    >,
                >,
                Ok = (),
                Err: StdError,
            > + Task<
                Start<
                    By<
                        task::FinishElapsedSlots<Self>,
                        task::finish_elapsed_slots::Config,
                    >,
                >,
                Ok = (),
                Err: StdError,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            events,
            mailer,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().notify_waste_money)))
                .await
        });
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().finish_elapsed_slots)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Events`] sink of this [`Service`].
    #[must_use]
    pub fn events(&self) -> &Ev {
        &self.events
    }

    /// Returns [`Mailer`] of this [`Service`].
    #[must_use]
    pub fn mailer(&self) -> &Ml {
        &self.mailer
    }
}
