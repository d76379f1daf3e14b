//! [`Database`] implementations.

mod accounting;
mod cancellation;
mod class;
mod customer;
mod product;
mod slot;
mod subscription;
mod teacher;

use std::sync::Arc;

use common::operations::{Commit, Transact};
use tracerr::Traced;

use crate::infra::{Database, database};

use super::{Error, InMem, NonTx, Tx};

impl Database<Transact> for InMem<NonTx> {
    type Ok = InMem<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        // Single permit, so transactions are fully serialized.
        let permit = Arc::clone(&self.0.tx_permit)
            .acquire_owned()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(InMem(Tx::new(&self.0, permit)))
    }
}

impl Database<Transact> for InMem<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for InMem<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        // Mutations land into the shared state right away, so committing
        // only releases the transaction permit (on drop).
        Ok(())
    }
}
