//! Infrastructure layer.

pub mod database;
pub mod events;
pub mod mailer;

pub use self::{
    database::{Database, InMem},
    events::{Events, Recorder},
    mailer::{Letter, Mailer},
};
