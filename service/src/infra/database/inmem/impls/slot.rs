//! [`Slot`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{Slot, slot, subscription},
    infra::{
        Database,
        database::{
            self,
            inmem::{Error, InMem, Store, Tx},
        },
    },
    read,
};

impl<S: Store> Database<Insert<Slot>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(slot): Insert<Slot>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.0.state().slots.insert(slot.id, slot);
        Ok(())
    }
}

impl<S: Store> Database<Update<Slot>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(slot): Update<Slot>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.state();
        if !state.slots.contains_key(&slot.id) {
            return Err(tracerr::new!(database::Error::InMem(
                Error::UpdateOfMissing { entity: "Slot" },
            )));
        }
        _ = state.slots.insert(slot.id, slot);
        Ok(())
    }
}

impl<S: Store> Database<Select<By<Option<Slot>, slot::Id>>> for InMem<S> {
    type Ok = Option<Slot>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Slot>, slot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.state().slots.get(&by.into_inner()).cloned())
    }
}

impl<S: Store> Database<Select<By<Option<Slot>, read::slot::ByStart>>>
    for InMem<S>
{
    type Ok = Option<Slot>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Slot>, read::slot::ByStart>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();
        Ok(self
            .0
            .state()
            .slots
            .values()
            .find(|s| {
                s.teacher_id == key.teacher_id
                    && s.lesson == key.lesson
                    && s.start == key.start
            })
            .cloned())
    }
}

impl<S: Store> Database<Select<By<Vec<Slot>, subscription::Id>>> for InMem<S> {
    type Ok = Vec<Slot>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Slot>, subscription::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sub_id = by.into_inner();
        let state = self.0.state();
        Ok(state
            .classes
            .values()
            .filter(|c| c.subscription_id == Some(sub_id))
            .filter_map(|c| c.slot_id)
            .filter_map(|id| state.slots.get(&id))
            .cloned()
            .collect())
    }
}

impl<S: Store> Database<Select<By<Vec<Slot>, read::slot::Elapsed>>>
    for InMem<S>
{
    type Ok = Vec<Slot>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Slot>, read::slot::Elapsed>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::slot::Elapsed { deadline } = by.into_inner();
        Ok(self
            .0
            .state()
            .slots
            .values()
            .filter(|s| !s.is_finished && s.end() <= deadline)
            .cloned()
            .collect())
    }
}

impl Database<Lock<By<Slot, slot::Id>>> for InMem<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Slot, slot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}
