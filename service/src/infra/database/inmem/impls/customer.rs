//! [`Customer`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{Customer, customer},
    infra::{
        Database,
        database::{
            self,
            inmem::{Error, InMem, Store},
        },
    },
};

impl<S: Store> Database<Insert<Customer>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(customer): Insert<Customer>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.0.state().customers.insert(customer.id, customer);
        Ok(())
    }
}

impl<S: Store> Database<Update<Customer>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(customer): Update<Customer>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.state();
        if !state.customers.contains_key(&customer.id) {
            return Err(tracerr::new!(database::Error::InMem(
                Error::UpdateOfMissing { entity: "Customer" },
            )));
        }
        _ = state.customers.insert(customer.id, customer);
        Ok(())
    }
}

impl<S: Store> Database<Select<By<Option<Customer>, customer::Id>>>
    for InMem<S>
{
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.state().customers.get(&by.into_inner()).cloned())
    }
}
