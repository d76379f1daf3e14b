//! [`accounting::Event`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{accounting, teacher},
    infra::{
        Database,
        database::{
            self,
            inmem::{InMem, Store},
        },
    },
};

impl<S: Store> Database<Insert<accounting::Event>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(event): Insert<accounting::Event>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.state().accounting_events.push(event);
        Ok(())
    }
}

impl<S: Store> Database<Select<By<Vec<accounting::Event>, teacher::Id>>>
    for InMem<S>
{
    type Ok = Vec<accounting::Event>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<accounting::Event>, teacher::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let teacher_id = by.into_inner();
        Ok(self
            .0
            .state()
            .accounting_events
            .iter()
            .filter(|ev| ev.teacher_id == teacher_id)
            .cloned()
            .collect())
    }
}
