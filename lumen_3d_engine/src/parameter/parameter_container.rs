/// ParameterContainer - keyed store of typed parameters.
///
/// Used for pipeline-level state (gamma, MSAA level, work texture) and
/// scene-level state (main camera, main directional light). Every change
/// is broadcast to the container's invalidation dependents.

use std::any::Any;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use crate::invalidation::InvalidatableContainer;
use super::{Parameter, ParameterKey};

/// Type-erased view of a `Parameter<T>`
trait AnyParameter: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn notify_removed(&self);
    fn type_name(&self) -> &'static str;
}

impl<T: Send + Sync + 'static> AnyParameter for Parameter<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn notify_removed(&self) {
        Parameter::notify_removed(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

#[derive(Default)]
pub struct ParameterContainer {
    parameters: FxHashMap<&'static str, Box<dyn AnyParameter>>,
    invalidation: InvalidatableContainer,
}

impl ParameterContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dependents notified whenever a parameter is installed, changed or removed
    pub fn invalidation(&self) -> &InvalidatableContainer {
        &self.invalidation
    }

    fn check_type<T: 'static>(&self, key: &ParameterKey<T>) -> Result<()> {
        if let Some(existing) = self.parameters.get(key.name()) {
            if !existing.as_any().is::<Parameter<T>>() {
                engine_bail!(InvalidArgument, "lumen3d::ParameterContainer",
                    "Parameter '{}' holds {}, not {}",
                    key.name(), existing.type_name(), std::any::type_name::<T>());
            }
        }
        Ok(())
    }

    /// Install a parameter under `key`, returning the one it replaces
    ///
    /// The new parameter's `added_to_parameters` hook fires before the old
    /// one's `removed_from_parameters`, so both can observe each other.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `key` is already used with another value type.
    pub fn insert_parameter<T: Send + Sync + 'static>(
        &mut self,
        key: &ParameterKey<T>,
        parameter: Parameter<T>,
    ) -> Result<Option<Parameter<T>>> {
        self.check_type(key)?;

        parameter.notify_added();
        let previous = self.parameters.insert(key.name(), Box::new(parameter));
        let previous = previous.and_then(|old| {
            old.notify_removed();
            old.into_any().downcast::<Parameter<T>>().ok().map(|p| *p)
        });

        self.invalidation.invalidate();
        Ok(previous)
    }

    /// Set the value under `key`, creating a plain parameter if absent
    ///
    /// An existing parameter keeps its hooks and validator; a rejected value
    /// leaves it unchanged.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: &ParameterKey<T>, value: T) -> Result<()> {
        match self.parameter_mut(key)? {
            Some(parameter) => parameter.set(value)?,
            None => {
                let parameter = Parameter::new(value);
                parameter.notify_added();
                self.parameters.insert(key.name(), Box::new(parameter));
            }
        }
        self.invalidation.invalidate();
        Ok(())
    }

    /// Remove the parameter under `key`
    pub fn remove<T: Send + Sync + 'static>(&mut self, key: &ParameterKey<T>) -> Result<Option<Parameter<T>>> {
        self.check_type(key)?;

        let Some(removed) = self.parameters.remove(key.name()) else {
            return Ok(None);
        };
        removed.notify_removed();
        self.invalidation.invalidate();
        Ok(removed.into_any().downcast::<Parameter<T>>().ok().map(|p| *p))
    }

    /// Value under `key`, if present with the key's type
    pub fn get<T: Send + Sync + 'static>(&self, key: &ParameterKey<T>) -> Option<&T> {
        self.parameter(key).map(|p| p.value())
    }

    /// Value under `key`, failing if it has not been published
    ///
    /// # Errors
    ///
    /// `Error::PreconditionFailed` if no value is published under `key`.
    pub fn require<T: Send + Sync + 'static>(&self, key: &ParameterKey<T>) -> Result<&T> {
        match self.get(key) {
            Some(value) => Ok(value),
            None => engine_bail!(PreconditionFailed, "lumen3d::ParameterContainer",
                "Required parameter '{}' is not published", key.name()),
        }
    }

    pub fn parameter<T: Send + Sync + 'static>(&self, key: &ParameterKey<T>) -> Option<&Parameter<T>> {
        self.parameters.get(key.name())
            .and_then(|p| p.as_any().downcast_ref::<Parameter<T>>())
    }

    fn parameter_mut<T: Send + Sync + 'static>(
        &mut self,
        key: &ParameterKey<T>,
    ) -> Result<Option<&mut Parameter<T>>> {
        self.check_type(key)?;
        Ok(self.parameters.get_mut(key.name())
            .and_then(|p| p.as_any_mut().downcast_mut::<Parameter<T>>()))
    }

    pub fn contains<T>(&self, key: &ParameterKey<T>) -> bool {
        self.parameters.contains_key(key.name())
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Remove every parameter, firing their `removed_from_parameters` hooks
    ///
    /// Dependents are dropped without notification.
    pub fn clear(&mut self) {
        for (_, parameter) in self.parameters.drain() {
            parameter.notify_removed();
        }
        self.invalidation.clear();
    }
}

#[cfg(test)]
#[path = "parameter_container_tests.rs"]
mod tests;
