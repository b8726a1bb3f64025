/// Static resources: assets loaded from disk with a three-tier lifecycle.
///
/// ```text
///   OnDisk  <-->  InHostMemory  <-->  InDeviceMemory
/// ```
///
/// Transitions are strictly adjacent. `make_resident` goes from disk to
/// device by passing through host memory. A transition that fails leaves
/// the resource in the tier it started from; a resource only becomes
/// usable once its device data exists.
///
/// The per-variant work (decode, upload, destroy) is supplied by a
/// `StaticAsset` implementation; the state machine lives once here.

use std::fmt;
use std::path::PathBuf;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::GraphicsDevice;
use super::{
    AssetLoader, DataStorePolicy, MemoryFootprint, Resource, ResourceId,
    ResourceKind, StorageState,
};

/// Per-variant step of a static resource
pub trait StaticAsset: Send + 'static {
    /// Decoded data held in host memory
    type HostData: Send;
    /// Handles to device objects
    type DeviceData: Send;

    const KIND: ResourceKind;

    /// Human-readable variant name used in log messages
    const NAME: &'static str;

    /// Read and decode the source files
    fn load(paths: &[PathBuf], loader: &dyn AssetLoader) -> Result<Self::HostData>;

    /// Create device objects from host data
    fn upload(host: &Self::HostData, device: &mut dyn GraphicsDevice) -> Result<Self::DeviceData>;

    /// Free device objects
    fn destroy(data: Self::DeviceData, device: &mut dyn GraphicsDevice);

    fn host_size(host: &Self::HostData) -> u64;

    fn device_size(data: &Self::DeviceData) -> u64;
}

enum Storage<A: StaticAsset> {
    Disk,
    Host(A::HostData),
    Device { host: A::HostData, device: A::DeviceData },
}

pub struct StaticResource<A: StaticAsset> {
    id: ResourceId,
    policy: DataStorePolicy,
    storage: Storage<A>,
    released: bool,
    last_active: u64,
    used_since_stamp: bool,
}

impl<A: StaticAsset> StaticResource<A> {
    /// Create an unloaded resource for `id`
    pub fn new(id: ResourceId, policy: DataStorePolicy) -> Self {
        Self {
            id,
            policy,
            storage: Storage::Disk,
            released: false,
            last_active: 0,
            used_since_stamp: false,
        }
    }

    pub fn policy(&self) -> DataStorePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DataStorePolicy) {
        self.policy = policy;
    }

    pub fn storage_state(&self) -> StorageState {
        match self.storage {
            Storage::Disk => StorageState::OnDisk,
            Storage::Host(_) => StorageState::InHostMemory,
            Storage::Device { .. } => StorageState::InDeviceMemory,
        }
    }

    /// Logical time of the last fetch, or of the eviction pass after a draw
    pub fn last_active(&self) -> u64 {
        self.last_active
    }

    pub fn touch(&mut self, tick: u64) {
        self.last_active = self.last_active.max(tick);
    }

    /// Clear the draw mark left by `prepare_for_draw`, returning whether it was set
    pub fn take_use(&mut self) -> bool {
        std::mem::take(&mut self.used_since_stamp)
    }

    fn ensure_not_released(&self, operation: &str) -> Result<()> {
        if self.released {
            engine_bail!(UseAfterRelease, "lumen3d::StaticResource",
                "Cannot {} {} {}: resource was released", operation, A::NAME, self.id);
        }
        Ok(())
    }

    fn wrong_tier(&self, operation: &str, expected: StorageState) -> crate::error::Error {
        crate::engine_err!(InvalidResource, "lumen3d::StaticResource",
            "Cannot {} {} {}: expected {:?}, found {:?}",
            operation, A::NAME, self.id, expected, self.storage_state())
    }

    /// Decoded host data, if loaded
    pub fn host_data(&self) -> Option<&A::HostData> {
        match &self.storage {
            Storage::Disk => None,
            Storage::Host(host) | Storage::Device { host, .. } => Some(host),
        }
    }

    /// Device objects of a resident resource
    ///
    /// # Errors
    ///
    /// - `Error::UseAfterRelease` after `release`
    /// - `Error::InvalidResource` if the resource is not in device memory
    pub fn device_data(&self) -> Result<&A::DeviceData> {
        self.ensure_not_released("use")?;
        match &self.storage {
            Storage::Device { device, .. } => Ok(device),
            _ => Err(self.wrong_tier("use", StorageState::InDeviceMemory)),
        }
    }

    /// Device objects for a draw, re-uploading from host memory if demoted
    ///
    /// Marks the resource as used so the next eviction pass treats it as
    /// recently active.
    ///
    /// # Errors
    ///
    /// - `Error::UseAfterRelease` after `release`
    /// - `Error::InvalidResource` if the resource was demoted to disk; it
    ///   must be fetched again through the `ResourceManager`
    pub fn prepare_for_draw(&mut self, device: &mut dyn GraphicsDevice) -> Result<&A::DeviceData> {
        self.ensure_not_released("use")?;
        if matches!(self.storage, Storage::Host(_)) {
            self.upload_to_device(device)?;
        }
        self.used_since_stamp = true;
        self.device_data()
    }

    /// Disk -> host
    pub fn load_to_host(&mut self, loader: &dyn AssetLoader) -> Result<()> {
        self.ensure_not_released("load")?;
        if !matches!(self.storage, Storage::Disk) {
            return Err(self.wrong_tier("load", StorageState::OnDisk));
        }

        let host = A::load(self.id.paths(), loader)?;
        self.storage = Storage::Host(host);
        crate::engine_debug!("lumen3d::StaticResource", "{} {} loaded to host memory", A::NAME, self.id);
        Ok(())
    }

    /// Host -> device
    pub fn upload_to_device(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        self.ensure_not_released("upload")?;
        if !matches!(self.storage, Storage::Host(_)) {
            return Err(self.wrong_tier("upload", StorageState::InHostMemory));
        }

        if let Storage::Host(host) = std::mem::replace(&mut self.storage, Storage::Disk) {
            match A::upload(&host, device) {
                Ok(data) => self.storage = Storage::Device { host, device: data },
                Err(error) => {
                    self.storage = Storage::Host(host);
                    return Err(error);
                }
            }
        }
        crate::engine_debug!("lumen3d::StaticResource", "{} {} uploaded to device memory", A::NAME, self.id);
        Ok(())
    }

    /// Device -> host
    pub fn unload_from_device(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        self.ensure_not_released("unload")?;
        if !matches!(self.storage, Storage::Device { .. }) {
            return Err(self.wrong_tier("unload", StorageState::InDeviceMemory));
        }

        if let Storage::Device { host, device: data } = std::mem::replace(&mut self.storage, Storage::Disk) {
            A::destroy(data, device);
            self.storage = Storage::Host(host);
        }
        Ok(())
    }

    /// Host -> disk
    pub fn unload_from_host(&mut self) -> Result<()> {
        self.ensure_not_released("unload")?;
        if !matches!(self.storage, Storage::Host(_)) {
            return Err(self.wrong_tier("unload", StorageState::InHostMemory));
        }
        self.storage = Storage::Disk;
        Ok(())
    }

    /// Bring the resource to device memory from whatever tier it is in
    pub fn make_resident(
        &mut self,
        device: &mut dyn GraphicsDevice,
        loader: &dyn AssetLoader,
    ) -> Result<()> {
        self.ensure_not_released("load")?;
        if matches!(self.storage, Storage::Disk) {
            self.load_to_host(loader)?;
        }
        if matches!(self.storage, Storage::Host(_)) {
            self.upload_to_device(device)?;
        }
        Ok(())
    }
}

impl<A: StaticAsset> Resource for StaticResource<A> {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn kind(&self) -> ResourceKind {
        A::KIND
    }

    fn is_usable(&self) -> bool {
        !self.released && matches!(self.storage, Storage::Device { .. })
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn memory_footprint(&self) -> MemoryFootprint {
        match &self.storage {
            Storage::Disk => MemoryFootprint::default(),
            Storage::Host(host) => MemoryFootprint { host: A::host_size(host), device: 0 },
            Storage::Device { host, device } => MemoryFootprint {
                host: A::host_size(host),
                device: A::device_size(device),
            },
        }
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if self.released {
            return Ok(());
        }
        if let Storage::Device { device: data, .. } = std::mem::replace(&mut self.storage, Storage::Disk) {
            A::destroy(data, device);
        }
        self.released = true;
        crate::engine_debug!("lumen3d::StaticResource", "{} {} released", A::NAME, self.id);
        Ok(())
    }

    fn update(&mut self, _device: &mut dyn GraphicsDevice) -> Result<()> {
        self.ensure_not_released("update")
    }
}

impl<A: StaticAsset> fmt::Debug for StaticResource<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(A::NAME)
            .field("id", &self.id)
            .field("state", &self.storage_state())
            .field("policy", &self.policy)
            .field("released", &self.released)
            .field("last_active", &self.last_active)
            .finish()
    }
}

/// Tier operations used by eviction, independent of the asset variant
pub trait TieredResource: Resource {
    fn storage_state(&self) -> StorageState;
    fn policy(&self) -> DataStorePolicy;
    fn last_active(&self) -> u64;
    fn touch(&mut self, tick: u64);
    fn take_use(&mut self) -> bool;
    fn unload_from_device(&mut self, device: &mut dyn GraphicsDevice) -> Result<()>;
    fn unload_from_host(&mut self) -> Result<()>;
}

impl<A: StaticAsset> TieredResource for StaticResource<A> {
    fn storage_state(&self) -> StorageState {
        StaticResource::storage_state(self)
    }

    fn policy(&self) -> DataStorePolicy {
        StaticResource::policy(self)
    }

    fn last_active(&self) -> u64 {
        StaticResource::last_active(self)
    }

    fn touch(&mut self, tick: u64) {
        StaticResource::touch(self, tick)
    }

    fn take_use(&mut self) -> bool {
        StaticResource::take_use(self)
    }

    fn unload_from_device(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        StaticResource::unload_from_device(self, device)
    }

    fn unload_from_host(&mut self) -> Result<()> {
        StaticResource::unload_from_host(self)
    }
}

#[cfg(test)]
#[path = "static_resource_tests.rs"]
mod tests;
