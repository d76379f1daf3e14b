//! Fixtures for testing the [`Service`].

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use common::operations::{Deliver, Insert};
use tracerr::Traced;

use crate::{
    Config, Service,
    command::CreateSubscription,
    domain::{
        Customer, Product, Slot, Subscription, Teacher, customer, lesson,
        product, slot, teacher,
    },
    infra::{
        InMem, Mailer, Recorder,
        mailer::{self, Letter},
    },
    task,
};

/// [`Mailer`] capturing [`Letter`]s instead of delivering them.
#[derive(Clone, Debug, Default)]
pub(crate) struct Outbox(pub(crate) Arc<Mutex<Vec<Letter>>>);

impl Outbox {
    /// Returns all the [`Letter`]s captured so far.
    pub(crate) fn letters(&self) -> Vec<Letter> {
        self.0.lock().unwrap().clone()
    }
}

impl Mailer<Deliver<Letter>> for Outbox {
    type Ok = ();
    type Err = Traced<mailer::Error>;

    async fn execute(
        &self,
        Deliver(letter): Deliver<Letter>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.lock().unwrap().push(letter);
        Ok(())
    }
}

/// [`Service`] with in-memory infrastructure dependencies.
pub(crate) type TestService = Service<InMem, Recorder<InMem>, Outbox>;

/// Assembled [`TestService`] with its seeded entities.
pub(crate) struct World {
    pub(crate) service: TestService,
    pub(crate) outbox: Outbox,
    pub(crate) customer: Customer,
    pub(crate) teacher: Teacher,
    pub(crate) product: Product,
}

/// Day as a [`Duration`].
pub(crate) const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Default [`Config`] used by [`world()`].
pub(crate) fn config() -> Config {
    Config {
        notify_waste_money: task::notify_waste_money::Config {
            interval: Duration::from_secs(60 * 60),
            first_delay: 7 * DAY,
            repeat_cooldown: DAY,
        },
        finish_elapsed_slots: task::finish_elapsed_slots::Config {
            interval: Duration::from_secs(5 * 60),
            grace: Duration::from_secs(60 * 60),
        },
    }
}

/// Assembles a [`World`] with the default catalog [`Product`] of 4 ordinary
/// lessons.
pub(crate) async fn world() -> World {
    world_with(vec![product::Unit {
        lesson: lesson::Kind::Ordinary,
        count: 4,
    }])
    .await
}

/// Assembles a [`World`] with a catalog [`Product`] of the provided `units`.
pub(crate) async fn world_with(units: Vec<product::Unit>) -> World {
    let db = InMem::new();

    let customer = Customer {
        id: customer::Id::new(),
        name: "Hermione Granger".parse().unwrap(),
        email: "hermione@example.com".parse().unwrap(),
        timezone: "Europe/London".parse().unwrap(),
        cancellation_streak: 0,
    };
    db.execute(Insert(customer.clone())).await.unwrap();

    let teacher = Teacher {
        id: teacher::Id::new(),
        name: "Severus Snape".parse().unwrap(),
        email: "severus@example.com".parse().unwrap(),
    };
    db.execute(Insert(teacher.clone())).await.unwrap();

    let product = Product {
        id: product::Id::new(),
        name: "Monthly bundle".parse().unwrap(),
        duration: 30 * DAY,
        units,
    };
    db.execute(Insert(product.clone())).await.unwrap();

    let events = Recorder::new(db.clone());
    let outbox = Outbox::default();
    let (service, _background) =
        Service::new(config(), db, events, outbox.clone());

    World {
        service,
        outbox,
        customer,
        teacher,
        product,
    }
}

/// Purchases a [`Subscription`] of the [`World`]'s catalog [`Product`].
pub(crate) async fn seed_subscription(world: &World) -> Subscription {
    world
        .service
        .execute(CreateSubscription {
            customer_id: world.customer.id,
            product_id: world.product.id,
            price: "150USD".parse().unwrap(),
        })
        .await
        .unwrap()
}

/// Creates an empty [`Slot`] of the provided `teacher` and persists it.
pub(crate) async fn seed_slot(
    world: &World,
    lesson: lesson::Kind,
    start: slot::StartDateTime,
) -> Slot {
    let slot = Slot::new(world.teacher.id, lesson, start, false);
    world
        .service
        .database()
        .execute(Insert(slot.clone()))
        .await
        .unwrap();
    slot
}
