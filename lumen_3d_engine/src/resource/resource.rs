/// Resource capability shared by textures, meshes and shader programs.

use std::ops::{Add, AddAssign};
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use super::ResourceId;

/// Resource family, used for per-kind memory accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    Mesh,
    Shader,
}

/// Storage tier of a static resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageState {
    /// Only the source files exist
    OnDisk,
    /// Decoded data held in host memory
    InHostMemory,
    /// Uploaded to device memory (host copy retained)
    InDeviceMemory,
}

/// Eviction policy of a static resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataStorePolicy {
    /// Pinned: never demoted
    KeepInDeviceMemory,
    /// May leave device memory, never dropped from host memory
    KeepInHostMemory,
    /// May be demoted down to disk
    #[default]
    AllowDemotion,
}

/// Bytes held in each memory tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryFootprint {
    pub host: u64,
    pub device: u64,
}

impl MemoryFootprint {
    pub fn total(&self) -> u64 {
        self.host + self.device
    }
}

impl Add for MemoryFootprint {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            host: self.host + other.host,
            device: self.device + other.device,
        }
    }
}

impl AddAssign for MemoryFootprint {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Common capability of every managed resource
///
/// Once released a resource is permanently unusable: `is_usable` returns
/// false and every operation needing its data fails with
/// `Error::UseAfterRelease`. Releasing twice is a no-op.
pub trait Resource: Send {
    fn id(&self) -> &ResourceId;

    fn kind(&self) -> ResourceKind;

    /// Returns true if the resource can be bound for rendering right now
    fn is_usable(&self) -> bool;

    /// Returns true once `release` has run
    fn is_released(&self) -> bool;

    /// Memory currently held by the resource
    fn memory_footprint(&self) -> MemoryFootprint;

    /// Free every tier of storage and mark the resource unusable
    fn release(&mut self, device: &mut dyn GraphicsDevice) -> Result<()>;

    /// Per-frame maintenance
    fn update(&mut self, _device: &mut dyn GraphicsDevice) -> Result<()> {
        Ok(())
    }
}
