//! [`Teacher`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{Teacher, teacher},
    infra::{
        Database,
        database::{
            self,
            inmem::{InMem, Store},
        },
    },
};

impl<S: Store> Database<Insert<Teacher>> for InMem<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(teacher): Insert<Teacher>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.0.state().teachers.insert(teacher.id, teacher);
        Ok(())
    }
}

impl<S: Store> Database<Select<By<Option<Teacher>, teacher::Id>>>
    for InMem<S>
{
    type Ok = Option<Teacher>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Teacher>, teacher::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.state().teachers.get(&by.into_inner()).cloned())
    }
}
