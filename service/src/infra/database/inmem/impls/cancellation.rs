//! [`Cancellation`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{Cancellation, cancellation},
    infra::{
        Database,
        database::{
            self,
            inmem::{InMem, Store},
        },
    },
};

impl<S: Store> Database<Insert<Cancellation>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(cancellation): Insert<Cancellation>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self
            .0
            .state()
            .cancellations
            .insert(cancellation.id, cancellation);
        Ok(())
    }
}

impl<S: Store> Database<Select<By<Option<Cancellation>, cancellation::Id>>>
    for InMem<S>
{
    type Ok = Option<Cancellation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Cancellation>, cancellation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.state().cancellations.get(&by.into_inner()).cloned())
    }
}
