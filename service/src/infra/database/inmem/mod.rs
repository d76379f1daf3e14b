//! In-memory [`Database`] implementation.

mod impls;

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use derive_more::{Deref, Display, Error as StdError, From};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::domain::{
    Cancellation, Class, Customer, Product, Slot, Subscription, Teacher,
    accounting, cancellation, class, customer, product, slot, subscription,
    teacher,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
///
/// Entities that must never be deleted physically ([`Subscription`]s,
/// [`Class`]es, [`Cancellation`]s, [`accounting::Event`]s) have no deletion
/// operation implemented at all, so deactivation is the only way to retire
/// them.
#[derive(Clone, Debug, Deref)]
pub struct InMem<T = NonTx>(pub(crate) T);

impl InMem {
    /// Creates a new empty [`InMem`] client.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx {
            state: Arc::new(Mutex::new(State::default())),
            tx_permit: Arc::new(Semaphore::new(1)),
        })
    }
}

impl Default for InMem {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole state held by an [`InMem`] client.
#[derive(Debug, Default)]
pub(crate) struct State {
    /// All the stored [`Subscription`]s.
    pub(crate) subscriptions: HashMap<subscription::Id, Subscription>,

    /// All the stored [`Class`]es.
    pub(crate) classes: HashMap<class::Id, Class>,

    /// All the stored [`Slot`]s.
    pub(crate) slots: HashMap<slot::Id, Slot>,

    /// All the stored [`Customer`]s.
    pub(crate) customers: HashMap<customer::Id, Customer>,

    /// All the stored [`Teacher`]s.
    pub(crate) teachers: HashMap<teacher::Id, Teacher>,

    /// All the stored [`Product`]s.
    pub(crate) products: HashMap<product::Id, Product>,

    /// All the stored [`Cancellation`]s.
    pub(crate) cancellations: HashMap<cancellation::Id, Cancellation>,

    /// Append-only ledger of [`accounting::Event`]s.
    pub(crate) accounting_events: Vec<accounting::Event>,
}

/// Client handle over the [`State`] of an [`InMem`] [`Database`].
pub trait Store: Clone + fmt::Debug {
    /// Acquires the [`State`] behind this handle.
    fn state(&self) -> MutexGuard<'_, State>;
}

/// Non-transactional [`InMem`] client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// Shared [`State`] of the [`InMem`] [`Database`].
    state: Arc<Mutex<State>>,

    /// Permit gating transactional access to the [`State`].
    tx_permit: Arc<Semaphore>,
}

impl Store for NonTx {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

/// Transactional [`InMem`] client.
///
/// At most one [`Tx`] exists at any moment, so everything done through it is
/// serialized with all other transactions. Occupancy checks done inside a
/// [`Tx`] cannot race.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Shared [`State`] of the [`InMem`] [`Database`].
    state: Arc<Mutex<State>>,

    /// Exclusive transaction permit held until all the clones of this [`Tx`]
    /// are dropped.
    _permit: Arc<OwnedSemaphorePermit>,
}

impl Tx {
    /// Creates a new [`Tx`] client on top of the provided `non_tx` one,
    /// holding the provided exclusive `permit`.
    pub(crate) fn new(non_tx: &NonTx, permit: OwnedSemaphorePermit) -> Self {
        Self {
            state: Arc::clone(&non_tx.state),
            _permit: Arc::new(permit),
        }
    }
}

impl Store for Tx {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

/// In-memory database [`Error`].
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Transactions are not available anymore.
    #[display("Failed to start a transaction: {_0}")]
    TxUnavailable(tokio::sync::AcquireError),

    /// Update of an entity that was never inserted.
    #[display("Cannot update missing `{entity}`")]
    UpdateOfMissing {
        /// Name of the missing entity.
        #[error(not(source))]
        entity: &'static str,
    },
}
