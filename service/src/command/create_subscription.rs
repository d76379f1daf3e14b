//! [`Command`] for purchasing a new [`Subscription`].

use common::{
    DateTime, Money,
    operations::{By, Commit, Insert, Select, Transact, Transacted},
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    Service,
    domain::{
        Class, Customer, Product, Subscription, class, customer, product,
        subscription,
    },
    infra::{Database, database},
};

use super::Command;

/// [`Command`] for purchasing a new [`Subscription`] against a catalog
/// [`Product`].
///
/// Materializes one [`Class`] per lesson included into the [`Product`], all
/// owned by the created [`Subscription`].
#[derive(Clone, Debug)]
pub struct CreateSubscription {
    /// ID of the [`Customer`] purchasing the [`Subscription`].
    pub customer_id: customer::Id,

    /// ID of the [`Product`] being purchased.
    pub product_id: product::Id,

    /// Price the [`Subscription`] is purchased for.
    pub price: Money,
}

impl<Db, Ev, Ml> Command<CreateSubscription> for Service<Db, Ev, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Product>, product::Id>>,
            Ok = Option<Product>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Insert<Subscription>, Err = Traced<database::Error>>
        + Database<Insert<Class>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Subscription;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateSubscription,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateSubscription {
            customer_id,
            product_id,
            price,
        } = cmd;

        let customer = self
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        let product = self
            .database()
            .execute(Select(By::<Option<Product>, _>::new(product_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ProductNotExists(product_id))
            .map_err(tracerr::wrap!())?;

        if product.total_lessons() == 0 {
            return Err(tracerr::new!(E::ProductHasNoLessons(product_id)));
        }

        let subscription = Subscription {
            id: subscription::Id::new(),
            customer_id: customer.id,
            product_id: product.id,
            price,
            purchased_at: DateTime::now().coerce(),
            duration: product.duration,
            first_lesson_date: None,
            waste_money_notified_at: None,
            is_fully_used: false,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Insert(subscription.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        for unit in &product.units {
            for _ in 0..unit.count {
                let class = Class {
                    id: class::Id::new(),
                    customer_id: customer.id,
                    subscription_id: Some(subscription.id),
                    lesson: unit.lesson,
                    price: subscription.price.clone(),
                    purchased_at: subscription.purchased_at.coerce(),
                    slot_id: None,
                    is_fully_used: false,
                };
                tx.execute(Insert(class))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(subscription)
    }
}

/// Error of [`CreateSubscription`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Customer`] with the provided ID does not exist.
    #[display("`Customer(id: {_0})` does not exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Product`] includes no lessons to materialize.
    #[display("`Product(id: {_0})` includes no lessons")]
    ProductHasNoLessons(#[error(not(source))] product::Id),

    /// [`Product`] with the provided ID does not exist.
    #[display("`Product(id: {_0})` does not exist")]
    ProductNotExists(#[error(not(source))] product::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use super::{CreateSubscription, ExecutionError};
    use crate::{
        domain::{Class, lesson, product},
        fixture,
        infra::Database as _,
    };

    #[tokio::test]
    async fn materializes_one_class_per_included_lesson() {
        let world = fixture::world_with(vec![
            product::Unit {
                lesson: lesson::Kind::Ordinary,
                count: 3,
            },
            product::Unit {
                lesson: lesson::Kind::MasterClass,
                count: 1,
            },
        ])
        .await;

        let sub = world
            .service
            .execute(CreateSubscription {
                customer_id: world.customer.id,
                product_id: world.product.id,
                price: "150USD".parse().unwrap(),
            })
            .await
            .unwrap();

        let classes: Vec<Class> = world
            .service
            .database()
            .execute(Select(By::<Vec<Class>, _>::new(sub.id)))
            .await
            .unwrap();
        assert_eq!(classes.len(), 4);
        assert_eq!(
            classes
                .iter()
                .filter(|c| c.lesson == lesson::Kind::Ordinary)
                .count(),
            3,
        );
        assert!(classes.iter().all(|c| {
            c.subscription_id == Some(sub.id)
                && c.customer_id == world.customer.id
                && !c.is_fully_used
                && c.slot_id.is_none()
        }));
        assert_eq!(sub.duration, world.product.duration);
    }

    #[tokio::test]
    async fn rejects_product_without_lessons() {
        let world = fixture::world_with(vec![]).await;

        let err = world
            .service
            .execute(CreateSubscription {
                customer_id: world.customer.id,
                product_id: world.product.id,
                price: "150USD".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ProductHasNoLessons(id) if *id == world.product.id,
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_customer() {
        let world = fixture::world().await;

        let err = world
            .service
            .execute(CreateSubscription {
                customer_id: crate::domain::customer::Id::new(),
                product_id: world.product.id,
                price: "150USD".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::CustomerNotExists(..),
        ));
    }
}
