//! Domain definitions.

pub mod accounting;
pub mod cancellation;
pub mod class;
pub mod customer;
pub mod lesson;
pub mod product;
pub mod slot;
pub mod subscription;
pub mod teacher;

use common::{DateTime, Money};

pub use self::{
    cancellation::Cancellation, class::Class, customer::Customer,
    product::Product, slot::Slot, subscription::Subscription, teacher::Teacher,
};

/// Common lifecycle of anything a customer pays for.
///
/// Implementors are never deleted physically: the storage layer exposes no
/// deletion operation for them, so every deletion request must be expressed
/// as [`ProductContainer::deactivate()`]. This keeps the accounting history
/// intact forever.
pub trait ProductContainer {
    /// Returns [`DateTime`] when this product was purchased.
    fn purchased_at(&self) -> DateTime;

    /// Returns the price this product was purchased for.
    fn price(&self) -> Money;

    /// Indicates whether the consumption lifecycle of this product is
    /// complete.
    fn is_fully_used(&self) -> bool;

    /// Sets the "fully used" flag of this product.
    fn set_fully_used(&mut self, used: bool);

    /// Marks this product as fully used.
    fn mark_fully_used(&mut self) {
        self.set_fully_used(true);
    }

    /// Makes this product brand new, like it was never used before.
    fn renew(&mut self) {
        self.set_fully_used(false);
    }

    /// Makes this product inactive, used instead of deletion.
    fn deactivate(&mut self) {
        self.mark_fully_used();
    }
}
