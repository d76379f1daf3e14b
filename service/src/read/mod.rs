//! Read entities definitions.

pub mod class;
pub mod slot;
pub mod subscription;
