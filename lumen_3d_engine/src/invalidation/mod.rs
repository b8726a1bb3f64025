//! Invalidation module
//!
//! Reusable dependent sets for objects whose derived data can go stale.

mod invalidatable_container;

pub use invalidatable_container::{Invalidatable, InvalidatableContainer};
