//! [`Command`] for purchasing a single [`Class`].

use common::{
    DateTime, Money,
    operations::{By, Insert, Select},
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    Service,
    domain::{Class, Customer, class, customer, lesson},
    infra::{Database, database},
};

use super::Command;

/// [`Command`] for purchasing a single [`Class`] not backed by any
/// subscription.
#[derive(Clone, Debug)]
pub struct CreateClass {
    /// ID of the [`Customer`] purchasing the [`Class`].
    pub customer_id: customer::Id,

    /// [`lesson::Kind`] of the purchased [`Class`].
    pub lesson: lesson::Kind,

    /// Price the [`Class`] is purchased for.
    pub price: Money,
}

impl<Db, Ev, Ml> Command<CreateClass> for Service<Db, Ev, Ml>
where
    Db: Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<Insert<Class>, Err = Traced<database::Error>>,
{
    type Ok = Class;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateClass) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateClass {
            customer_id,
            lesson,
            price,
        } = cmd;

        let customer = self
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        let class = Class {
            id: class::Id::new(),
            customer_id: customer.id,
            subscription_id: None,
            lesson,
            price,
            purchased_at: DateTime::now().coerce(),
            slot_id: None,
            is_fully_used: false,
        };

        self.database()
            .execute(Insert(class.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(class)
    }
}

/// Error of [`CreateClass`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Customer`] with the provided ID does not exist.
    #[display("`Customer(id: {_0})` does not exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
