//! [`Subscription`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{Subscription, subscription},
    infra::{
        Database,
        database::{
            self,
            inmem::{Error, InMem, Store, Tx},
        },
    },
    read,
};

impl<S: Store> Database<Insert<Subscription>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sub): Insert<Subscription>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.0.state().subscriptions.insert(sub.id, sub);
        Ok(())
    }
}

impl<S: Store> Database<Update<Subscription>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(sub): Update<Subscription>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.state();
        if !state.subscriptions.contains_key(&sub.id) {
            return Err(tracerr::new!(database::Error::InMem(
                Error::UpdateOfMissing {
                    entity: "Subscription",
                },
            )));
        }
        _ = state.subscriptions.insert(sub.id, sub);
        Ok(())
    }
}

impl<S: Store> Database<Select<By<Option<Subscription>, subscription::Id>>>
    for InMem<S>
{
    type Ok = Option<Subscription>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Subscription>, subscription::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.state().subscriptions.get(&by.into_inner()).cloned())
    }
}

impl<S: Store>
    Database<
        Select<By<Vec<Subscription>, read::subscription::Unstarted>>,
    > for InMem<S>
{
    type Ok = Vec<Subscription>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Subscription>, read::subscription::Unstarted>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .0
            .state()
            .subscriptions
            .values()
            .filter(|s| !s.is_fully_used && s.first_lesson_date.is_none())
            .cloned()
            .collect())
    }
}

impl Database<Lock<By<Subscription, subscription::Id>>> for InMem<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Subscription, subscription::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // The single transaction permit already grants exclusivity.
        Ok(())
    }
}
