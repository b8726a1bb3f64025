/// Ordered list holding at most one entry per kind.
///
/// Insertion order is execution order.

use std::fmt;
use crate::error::Result;
use crate::engine_bail;
use super::renderer::{Renderer, RendererKind};

/// Entry of a `RendererList`, identified by its kind
pub trait ListEntry {
    type Kind: Copy + PartialEq + fmt::Debug;

    fn entry_kind(&self) -> Self::Kind;
}

impl ListEntry for Box<dyn Renderer> {
    type Kind = RendererKind;

    fn entry_kind(&self) -> RendererKind {
        self.kind()
    }
}

pub struct RendererList<E: ListEntry> {
    entries: Vec<E>,
}

impl<E: ListEntry> Default for RendererList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ListEntry> RendererList<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry at the end of the list
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if an entry of the same kind is present.
    pub fn add(&mut self, entry: E) -> Result<()> {
        let kind = entry.entry_kind();
        if self.contains(kind) {
            engine_bail!(InvalidArgument, "lumen3d::RendererList",
                "An entry of kind {:?} is already registered", kind);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the entry of `kind`, keeping the order of the others
    pub fn remove(&mut self, kind: E::Kind) -> Option<E> {
        let index = self.entries.iter().position(|e| e.entry_kind() == kind)?;
        Some(self.entries.remove(index))
    }

    pub fn contains(&self, kind: E::Kind) -> bool {
        self.entries.iter().any(|e| e.entry_kind() == kind)
    }

    pub fn get(&self, kind: E::Kind) -> Option<&E> {
        self.entries.iter().find(|e| e.entry_kind() == kind)
    }

    pub fn get_mut(&mut self, kind: E::Kind) -> Option<&mut E> {
        self.entries.iter_mut().find(|e| e.entry_kind() == kind)
    }

    /// Kinds in execution order
    pub fn kinds(&self) -> Vec<E::Kind> {
        self.entries.iter().map(|e| e.entry_kind()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry, in order
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
#[path = "renderer_list_tests.rs"]
mod tests;
