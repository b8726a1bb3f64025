//! Parameter module
//!
//! Typed, hook-bearing slots through which global render state is published.

mod parameter;
mod parameter_container;
pub mod keys;

pub use parameter::{Parameter, ParameterHooks, ParameterKey, Validator};
pub use parameter_container::ParameterContainer;
