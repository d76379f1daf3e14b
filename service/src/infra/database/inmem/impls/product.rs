//! [`Product`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{Product, product},
    infra::{
        Database,
        database::{
            self,
            inmem::{InMem, Store},
        },
    },
};

impl<S: Store> Database<Insert<Product>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(product): Insert<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.0.state().products.insert(product.id, product);
        Ok(())
    }
}

impl<S: Store> Database<Select<By<Option<Product>, product::Id>>>
    for InMem<S>
{
    type Ok = Option<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Product>, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.state().products.get(&by.into_inner()).cloned())
    }
}
