/// Cache key of a resource.
///
/// Identity is derived from the ordered list of source paths, so two load
/// requests naming the same files in the same order resolve to one entry.
/// Resources with no backing file get a process-unique synthetic id.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYNTHETIC_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// Loaded from these files, in this order
    Paths(Vec<PathBuf>),
    /// Generated at runtime (render targets)
    Synthetic(u64),
}

impl ResourceId {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ResourceId::Paths(vec![path.into()])
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ResourceId::Paths(paths.into_iter().map(Into::into).collect())
    }

    /// Allocate a new synthetic id, never equal to any other
    pub fn synthetic() -> Self {
        ResourceId::Synthetic(NEXT_SYNTHETIC_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Source paths (empty for synthetic ids)
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            ResourceId::Paths(paths) => paths,
            ResourceId::Synthetic(_) => &[],
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, ResourceId::Synthetic(_))
    }
}

impl From<&Path> for ResourceId {
    fn from(path: &Path) -> Self {
        ResourceId::from_path(path)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Paths(paths) => {
                let joined = paths.iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{}]", joined)
            }
            ResourceId::Synthetic(n) => write!(f, "synthetic#{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_same_paths_same_id() {
        let a = ResourceId::from_paths(["sky/px.png", "sky/nx.png"]);
        let b = ResourceId::from_paths(vec![PathBuf::from("sky/px.png"), PathBuf::from("sky/nx.png")]);
        assert_eq!(a, b);

        let mut set = FxHashSet::default();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_path_order_matters() {
        let a = ResourceId::from_paths(["a.png", "b.png"]);
        let b = ResourceId::from_paths(["b.png", "a.png"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_synthetic_ids_are_unique() {
        let a = ResourceId::synthetic();
        let b = ResourceId::synthetic();
        assert_ne!(a, b);
        assert!(a.is_synthetic());
        assert!(a.paths().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(ResourceId::from_path("a.png").to_string(), "[a.png]");
        assert_eq!(ResourceId::Synthetic(7).to_string(), "synthetic#7");
    }
}
