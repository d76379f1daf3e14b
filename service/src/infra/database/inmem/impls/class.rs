//! [`Class`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{Class, class, slot, subscription},
    infra::{
        Database,
        database::{
            self,
            inmem::{Error, InMem, Store},
        },
    },
    read::class::Unused,
};

impl<S: Store> Database<Insert<Class>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(class): Insert<Class>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.0.state().classes.insert(class.id, class);
        Ok(())
    }
}

impl<S: Store> Database<Update<Class>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(class): Update<Class>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.state();
        if !state.classes.contains_key(&class.id) {
            return Err(tracerr::new!(database::Error::InMem(
                Error::UpdateOfMissing { entity: "Class" },
            )));
        }
        _ = state.classes.insert(class.id, class);
        Ok(())
    }
}

impl<S: Store> Database<Select<By<Option<Class>, class::Id>>> for InMem<S> {
    type Ok = Option<Class>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Class>, class::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.state().classes.get(&by.into_inner()).cloned())
    }
}

impl<S: Store> Database<Select<By<Vec<Class>, subscription::Id>>>
    for InMem<S>
{
    type Ok = Vec<Class>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Class>, subscription::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sub_id = by.into_inner();
        Ok(self
            .0
            .state()
            .classes
            .values()
            .filter(|c| c.subscription_id == Some(sub_id))
            .cloned()
            .collect())
    }
}

impl<S: Store> Database<Select<By<Vec<Unused<Class>>, subscription::Id>>>
    for InMem<S>
{
    type Ok = Vec<Unused<Class>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unused<Class>>, subscription::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sub_id = by.into_inner();
        Ok(self
            .0
            .state()
            .classes
            .values()
            .filter(|c| c.subscription_id == Some(sub_id) && !c.is_fully_used)
            .cloned()
            .map(Unused)
            .collect())
    }
}

impl<S: Store> Database<Select<By<Vec<Class>, slot::Id>>> for InMem<S> {
    type Ok = Vec<Class>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Class>, slot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slot_id = by.into_inner();
        Ok(self
            .0
            .state()
            .classes
            .values()
            .filter(|c| c.slot_id == Some(slot_id))
            .cloned()
            .collect())
    }
}
