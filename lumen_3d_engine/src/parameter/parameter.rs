/// Typed parameter slots with lifecycle hooks.
///
/// A `Parameter<T>` owns exactly one value at a time. It can carry hooks
/// fired when it is installed into a container, removed from one, or when
/// its value is replaced, and a validator that guards every assignment.

use std::fmt;
use std::marker::PhantomData;
use crate::error::Result;
use crate::engine_bail;

// ===== KEY =====

/// Typed key of a parameter
///
/// Keys are compared by name; the type parameter ties each key to the
/// value type stored under it.
pub struct ParameterKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ParameterKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, _marker: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ParameterKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ParameterKey<T> {}

impl<T> fmt::Debug for ParameterKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParameterKey({})", self.name)
    }
}

// ===== HOOKS =====

/// Lifecycle callbacks of a parameter
///
/// Every method has an empty default body.
pub trait ParameterHooks<T>: Send + Sync {
    /// The parameter was installed into a container
    fn added_to_parameters(&self, _value: &T) {}

    /// The parameter was removed from (or replaced in) a container
    fn removed_from_parameters(&self, _value: &T) {}

    /// The value was replaced
    fn refreshed(&self, _old: &T, _new: &T) {}
}

/// Value check run before every assignment
pub type Validator<T> = Box<dyn Fn(&T) -> Result<()> + Send + Sync>;

// ===== PARAMETER =====

pub struct Parameter<T> {
    value: T,
    hooks: Option<Box<dyn ParameterHooks<T>>>,
    validator: Option<Validator<T>>,
}

impl<T: Send + Sync + 'static> Parameter<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            hooks: None,
            validator: None,
        }
    }

    /// Attach lifecycle hooks
    pub fn with_hooks(mut self, hooks: impl ParameterHooks<T> + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Attach a validator, checking the current value against it
    pub fn with_validator(
        mut self,
        validator: impl Fn(&T) -> Result<()> + Send + Sync + 'static,
    ) -> Result<Self> {
        validator(&self.value)?;
        self.validator = Some(Box::new(validator));
        Ok(self)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Replace the value
    ///
    /// On success the `refreshed` hook receives the old and new value.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` if `value` is `None`
    /// - whatever the validator returns (usually `Error::ConfigurationError`)
    ///
    /// The previous value is kept on error.
    pub fn assign(&mut self, value: impl Into<Option<T>>) -> Result<()> {
        let Some(value) = value.into() else {
            engine_bail!(InvalidArgument, "lumen3d::Parameter",
                "A parameter value cannot be empty");
        };
        if let Some(validator) = &self.validator {
            validator(&value)?;
        }

        let old = std::mem::replace(&mut self.value, value);
        if let Some(hooks) = &self.hooks {
            hooks.refreshed(&old, &self.value);
        }
        Ok(())
    }

    /// Replace the value (see `assign`)
    pub fn set(&mut self, value: T) -> Result<()> {
        self.assign(value)
    }

    pub(crate) fn notify_added(&self) {
        if let Some(hooks) = &self.hooks {
            hooks.added_to_parameters(&self.value);
        }
    }

    pub(crate) fn notify_removed(&self) {
        if let Some(hooks) = &self.hooks {
            hooks.removed_from_parameters(&self.value);
        }
    }

    /// Consume the parameter and return its value
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Parameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("value", &self.value)
            .field("hooks", &self.hooks.is_some())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "parameter_tests.rs"]
mod tests;
