/// Invalidation propagation between objects holding derived data.
///
/// An `InvalidatableContainer` is embedded in an owner object and keeps a set
/// of weak references to dependents. Invalidating the container runs the
/// owner's own logic and then notifies every live dependent once.
///
/// A guard flag stays raised for the whole duration of one invalidation, so a
/// cycle leading back to this container (A -> B -> A) is cut at the second
/// visit: each owner's logic runs exactly once per wave. State reached through
/// the re-entrant edge may stay stale until the next wave.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use crate::error::Result;
use crate::engine_bail;

/// Object that can be told its cached or derived data is stale
pub trait Invalidatable: Send + Sync {
    /// Mark derived data as stale
    fn invalidate(&self);
}

fn identity(ptr: *const dyn Invalidatable) -> *const () {
    ptr as *const ()
}

/// Lowers the guard flag when an invalidation wave leaves this container
struct WaveGuard<'a>(&'a AtomicBool);

impl Drop for WaveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Set of dependents notified when the owner's data changes
///
/// Duplicate registration is a no-op (non-strict mode): `add` returns
/// `Ok(false)` and the set is unchanged. Registering the owner itself is
/// rejected with `Error::InvalidArgument`, but only for containers built with
/// `with_owner`: a container from `new` has no owner to compare against and
/// accepts any dependent. The engine's own holders (`RenderTarget`,
/// `DynamicTexture`, `ParameterContainer`) are not `Invalidatable` and use
/// `new`.
pub struct InvalidatableContainer {
    owner: Option<Weak<dyn Invalidatable>>,
    dependents: Mutex<Vec<Weak<dyn Invalidatable>>>,
    invalidating: AtomicBool,
}

impl Default for InvalidatableContainer {
    fn default() -> Self {
        Self {
            owner: None,
            dependents: Mutex::new(Vec::new()),
            invalidating: AtomicBool::new(false),
        }
    }
}

impl InvalidatableContainer {
    /// Create a container without an owner
    ///
    /// Self-registration cannot be detected; use `with_owner` for owners
    /// that are themselves `Invalidatable`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container for `owner`
    ///
    /// Usually called from `Arc::new_cyclic` while building the owner.
    pub fn with_owner(owner: Weak<dyn Invalidatable>) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    fn is_owner(&self, dependent: &Arc<dyn Invalidatable>) -> bool {
        self.owner.as_ref().is_some_and(|owner| {
            identity(owner.as_ptr()) == identity(Arc::as_ptr(dependent))
        })
    }

    /// Register a dependent
    ///
    /// Returns `Ok(true)` if added, `Ok(false)` if already registered.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `dependent` is the owner of this container.
    pub fn add(&self, dependent: &Arc<dyn Invalidatable>) -> Result<bool> {
        if self.is_owner(dependent) {
            engine_bail!(InvalidArgument, "lumen3d::Invalidation",
                "A container cannot register its own owner as a dependent");
        }

        let mut dependents = self.dependents.lock().unwrap_or_else(PoisonError::into_inner);
        dependents.retain(|d| d.strong_count() > 0);

        let target = identity(Arc::as_ptr(dependent));
        if dependents.iter().any(|d| identity(d.as_ptr()) == target) {
            return Ok(false);
        }

        dependents.push(Arc::downgrade(dependent));
        Ok(true)
    }

    /// Unregister a dependent
    ///
    /// Returns true if it was registered.
    pub fn remove(&self, dependent: &Arc<dyn Invalidatable>) -> bool {
        let mut dependents = self.dependents.lock().unwrap_or_else(PoisonError::into_inner);
        let target = identity(Arc::as_ptr(dependent));
        let before = dependents.len();
        dependents.retain(|d| identity(d.as_ptr()) != target);
        dependents.len() != before
    }

    /// Returns true if `dependent` is registered
    pub fn contains(&self, dependent: &Arc<dyn Invalidatable>) -> bool {
        let target = identity(Arc::as_ptr(dependent));
        self.dependents.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|d| d.strong_count() > 0 && identity(d.as_ptr()) == target)
    }

    /// Number of live dependents
    pub fn len(&self) -> usize {
        self.dependents.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|d| d.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every dependent without notifying them
    pub fn clear(&self) {
        self.dependents.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Returns true while an invalidation wave is running through this container
    pub fn is_invalidating(&self) -> bool {
        self.invalidating.load(Ordering::Acquire)
    }

    /// Notify every dependent once
    ///
    /// Returns false if the call was suppressed because a wave is already
    /// running through this container.
    pub fn invalidate(&self) -> bool {
        self.invalidate_with(|| {})
    }

    /// Run the owner's own invalidation logic, then notify every dependent once
    ///
    /// Both steps are covered by the re-entrancy guard: a nested call made
    /// while either step runs returns false without doing anything.
    pub fn invalidate_with(&self, own_logic: impl FnOnce()) -> bool {
        if self.invalidating.swap(true, Ordering::AcqRel) {
            return false;
        }
        let _guard = WaveGuard(&self.invalidating);

        own_logic();

        // Snapshot so dependents may add/remove entries while being notified
        let targets: Vec<Arc<dyn Invalidatable>> = self.dependents.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(Weak::upgrade)
            .collect();

        for target in targets {
            target.invalidate();
        }
        true
    }
}

#[cfg(test)]
#[path = "invalidatable_container_tests.rs"]
mod tests;
