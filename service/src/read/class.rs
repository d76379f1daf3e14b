//! [`Class`] read model definition.

#[cfg(doc)]
use crate::domain::Class;

/// Wrapper around [`Class`] indicating that it's not [`is_fully_used()`].
///
/// [`is_fully_used()`]: crate::domain::ProductContainer::is_fully_used
#[derive(Clone, Debug)]
pub struct Unused<T>(pub T);
