/// Typed cache of shared resources keyed by ResourceId.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::Result;
use super::ResourceId;

/// One cache per resource family
///
/// Entries are shared as `Arc<Mutex<R>>`; a load closure's result is only
/// installed once it succeeded, so a failed load leaves no entry.
pub struct ResourceCache<R> {
    entries: FxHashMap<ResourceId, Arc<Mutex<R>>>,
}

impl<R> Default for ResourceCache<R> {
    fn default() -> Self {
        Self { entries: FxHashMap::default() }
    }
}

impl<R> ResourceCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ResourceId) -> Option<Arc<Mutex<R>>> {
        self.entries.get(id).cloned()
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.entries.contains_key(id)
    }

    /// Return the entry for `id`, building it with `load` if absent
    ///
    /// The boolean is true when `load` ran.
    pub fn get_or_load(
        &mut self,
        id: &ResourceId,
        load: impl FnOnce() -> Result<R>,
    ) -> Result<(Arc<Mutex<R>>, bool)> {
        if let Some(entry) = self.entries.get(id) {
            return Ok((entry.clone(), false));
        }
        let entry = Arc::new(Mutex::new(load()?));
        self.entries.insert(id.clone(), entry.clone());
        Ok((entry, true))
    }

    pub fn insert(&mut self, id: ResourceId, resource: R) -> Arc<Mutex<R>> {
        let entry = Arc::new(Mutex::new(resource));
        self.entries.insert(id, entry.clone());
        entry
    }

    pub fn remove(&mut self, id: &ResourceId) -> Option<Arc<Mutex<R>>> {
        self.entries.remove(id)
    }

    /// Remove every entry
    pub fn drain(&mut self) -> Vec<(ResourceId, Arc<Mutex<R>>)> {
        self.entries.drain().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &Arc<Mutex<R>>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "resource_cache_tests.rs"]
mod tests;
