//! [`Database`]-related implementations.

pub mod inmem;

use derive_more::{Display, Error as StdError, From};

pub use self::inmem::InMem;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`InMem`] error.
    InMem(inmem::Error),
}
