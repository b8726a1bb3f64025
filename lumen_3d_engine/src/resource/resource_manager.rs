/// Central resource manager for the engine.
///
/// Keeps one typed cache per resource family, deduplicates loads by
/// `ResourceId`, tracks memory per family and demotes static resources
/// when a `MemoryBudget` is exceeded.
///
/// Locks are always taken device first, resource second, matching the
/// order seen by renderers during a frame.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::config::MemoryBudget;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::GraphicsDevice;
use super::{
    AssetLoader, DataStorePolicy, DynamicTexture, MemoryFootprint, Resource,
    ResourceCache, ResourceId, ResourceKind, ShaderProgram, StaticAsset,
    StaticMesh, StaticResource, StaticTexture, StorageState, TieredResource,
    CUBEMAP_FACE_COUNT,
};

/// Collaborators available to a load closure
pub struct LoadContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub assets: &'a dyn AssetLoader,
}

/// Resource family stored in a `ResourceManager` cache
pub trait ManagedResource: Resource + Sized + 'static {
    fn cache(manager: &ResourceManager) -> &ResourceCache<Self>;

    fn cache_mut(manager: &mut ResourceManager) -> &mut ResourceCache<Self>;

    /// Bring a cached but unusable resource back to a usable state
    fn restore(&mut self, ctx: &mut LoadContext) -> Result<()>;

    /// Record an access at logical time `tick`
    fn touch(&mut self, _tick: u64) {}
}

macro_rules! static_managed_resource {
    ($resource:ty, $cache:ident) => {
        impl ManagedResource for $resource {
            fn cache(manager: &ResourceManager) -> &ResourceCache<Self> {
                &manager.$cache
            }

            fn cache_mut(manager: &mut ResourceManager) -> &mut ResourceCache<Self> {
                &mut manager.$cache
            }

            fn restore(&mut self, ctx: &mut LoadContext) -> Result<()> {
                self.make_resident(ctx.device, ctx.assets)
            }

            fn touch(&mut self, tick: u64) {
                StaticResource::touch(self, tick)
            }
        }
    };
}

static_managed_resource!(StaticTexture, textures);
static_managed_resource!(StaticMesh, meshes);
static_managed_resource!(ShaderProgram, shaders);

impl ManagedResource for DynamicTexture {
    fn cache(manager: &ResourceManager) -> &ResourceCache<Self> {
        &manager.render_textures
    }

    fn cache_mut(manager: &mut ResourceManager) -> &mut ResourceCache<Self> {
        &mut manager.render_textures
    }

    fn restore(&mut self, _ctx: &mut LoadContext) -> Result<()> {
        // Allocation is driven by `ensure` with the requested size
        Ok(())
    }
}

/// Outcome of one budget enforcement pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Resources moved from device to host memory
    pub demoted_to_host: usize,
    /// Resources moved from host memory to disk
    pub demoted_to_disk: usize,
}

type TieredEntry = (ResourceId, Arc<Mutex<dyn TieredResource>>);

fn lock<'a, T: ?Sized>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| crate::engine_err!("lumen3d::ResourceManager", "{} lock poisoned", what))
}

pub struct ResourceManager {
    graphics_device: Arc<Mutex<dyn GraphicsDevice>>,
    asset_loader: Arc<dyn AssetLoader>,
    budget: MemoryBudget,
    clock: u64,
    textures: ResourceCache<StaticTexture>,
    render_textures: ResourceCache<DynamicTexture>,
    meshes: ResourceCache<StaticMesh>,
    shaders: ResourceCache<ShaderProgram>,
}

impl ResourceManager {
    /// Create an empty resource manager
    pub fn new(
        graphics_device: Arc<Mutex<dyn GraphicsDevice>>,
        asset_loader: Arc<dyn AssetLoader>,
        budget: MemoryBudget,
    ) -> Self {
        Self {
            graphics_device,
            asset_loader,
            budget,
            clock: 0,
            textures: ResourceCache::new(),
            render_textures: ResourceCache::new(),
            meshes: ResourceCache::new(),
            shaders: ResourceCache::new(),
        }
    }

    pub fn budget(&self) -> MemoryBudget {
        self.budget
    }

    pub fn set_budget(&mut self, budget: MemoryBudget) {
        self.budget = budget;
    }

    /// Current logical time
    pub fn clock(&self) -> u64 {
        self.clock
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    // ===== GENERIC API =====

    /// Return the cached resource for `id`, or build it with `load`
    ///
    /// A cached resource that is no longer usable (demoted) is restored in
    /// place, so at most one instance exists per id. `load` runs only when
    /// `id` is absent, and its result is installed only on success.
    pub fn get_or_load<R: ManagedResource>(
        &mut self,
        id: ResourceId,
        load: impl FnOnce(&mut LoadContext) -> Result<R>,
    ) -> Result<Arc<Mutex<R>>> {
        let tick = self.tick();
        let device = self.graphics_device.clone();
        let assets = self.asset_loader.clone();
        let mut device = lock(&device, "GraphicsDevice")?;
        let mut ctx = LoadContext { device: &mut *device, assets: &*assets };

        let (entry, loaded) = R::cache_mut(self).get_or_load(&id, || load(&mut ctx))?;
        {
            let mut resource = lock(&entry, "Resource")?;
            if loaded {
                crate::engine_debug!("lumen3d::ResourceManager", "Cached {:?} {}", resource.kind(), id);
            } else if !resource.is_usable() {
                resource.restore(&mut ctx)?;
            }
            resource.touch(tick);
        }
        Ok(entry)
    }

    /// Cached resource for `id`, without loading or touching it
    pub fn get<R: ManagedResource>(&self, id: &ResourceId) -> Option<Arc<Mutex<R>>> {
        R::cache(self).get(id)
    }

    pub fn contains<R: ManagedResource>(&self, id: &ResourceId) -> bool {
        R::cache(self).contains(id)
    }

    /// Remove `id` from its cache and release it
    ///
    /// Returns `Ok(false)` if `id` was not cached (already released).
    /// Handles still held elsewhere become unusable.
    pub fn release<R: ManagedResource>(&mut self, id: &ResourceId) -> Result<bool> {
        let Some(entry) = R::cache_mut(self).remove(id) else {
            return Ok(false);
        };
        let mut device = lock(&self.graphics_device, "GraphicsDevice")?;
        let mut resource = lock(&entry, "Resource")?;
        resource.release(&mut *device)?;
        crate::engine_debug!("lumen3d::ResourceManager", "Released {:?} {}", resource.kind(), id);
        Ok(true)
    }

    fn release_cache<R: ManagedResource>(&mut self) -> Result<usize> {
        let entries = R::cache_mut(self).drain();
        let mut device = lock(&self.graphics_device, "GraphicsDevice")?;
        let mut first_error = None;
        let count = entries.len();
        for (_, entry) in entries {
            let result = lock(&entry, "Resource").and_then(|mut r| r.release(&mut *device));
            if let Err(error) = result {
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(count),
        }
    }

    /// Release every cached resource
    ///
    /// Every entry is released even if one fails; the first error is returned.
    pub fn release_all(&mut self) -> Result<()> {
        let results = [
            self.release_cache::<StaticTexture>(),
            self.release_cache::<DynamicTexture>(),
            self.release_cache::<StaticMesh>(),
            self.release_cache::<ShaderProgram>(),
        ];
        let mut released = 0;
        for result in results {
            released += result?;
        }
        crate::engine_info!("lumen3d::ResourceManager", "Released {} resources", released);
        Ok(())
    }

    fn update_cache<R: ManagedResource>(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        for (_, entry) in R::cache(self).iter() {
            lock(entry, "Resource")?.update(device)?;
        }
        Ok(())
    }

    /// Run per-frame maintenance on every cached resource
    pub fn update_all(&mut self) -> Result<()> {
        let device = self.graphics_device.clone();
        let mut device = lock(&device, "GraphicsDevice")?;
        self.update_cache::<StaticTexture>(&mut *device)?;
        self.update_cache::<DynamicTexture>(&mut *device)?;
        self.update_cache::<StaticMesh>(&mut *device)?;
        self.update_cache::<ShaderProgram>(&mut *device)?;
        Ok(())
    }

    // ===== MEMORY ACCOUNTING =====

    fn cache_usage<R: ManagedResource>(&self) -> Result<MemoryFootprint> {
        let mut total = MemoryFootprint::default();
        for (_, entry) in R::cache(self).iter() {
            total += lock(entry, "Resource")?.memory_footprint();
        }
        Ok(total)
    }

    /// Memory held by one resource family
    pub fn memory_usage(&self, kind: ResourceKind) -> Result<MemoryFootprint> {
        match kind {
            ResourceKind::Texture => {
                Ok(self.cache_usage::<StaticTexture>()? + self.cache_usage::<DynamicTexture>()?)
            }
            ResourceKind::Mesh => self.cache_usage::<StaticMesh>(),
            ResourceKind::Shader => self.cache_usage::<ShaderProgram>(),
        }
    }

    /// Memory held by every cached resource
    pub fn total_memory_usage(&self) -> Result<MemoryFootprint> {
        Ok(self.memory_usage(ResourceKind::Texture)?
            + self.memory_usage(ResourceKind::Mesh)?
            + self.memory_usage(ResourceKind::Shader)?)
    }

    /// Number of cached resources of every family
    pub fn resource_count(&self) -> usize {
        self.textures.len() + self.render_textures.len() + self.meshes.len() + self.shaders.len()
    }

    // ===== EVICTION =====

    fn collect_tiered<A: StaticAsset>(cache: &ResourceCache<StaticResource<A>>, out: &mut Vec<TieredEntry>) {
        for (id, entry) in cache.iter() {
            let entry: Arc<Mutex<dyn TieredResource>> = entry.clone();
            out.push((id.clone(), entry));
        }
    }

    /// Static resources ordered least recently active first
    ///
    /// Resources drawn since the last pass are stamped with the current
    /// clock before ranking.
    fn eviction_candidates(&self, protected: Option<&ResourceId>) -> Result<Vec<(u64, TieredEntry)>> {
        let mut entries = Vec::new();
        Self::collect_tiered(&self.textures, &mut entries);
        Self::collect_tiered(&self.meshes, &mut entries);
        Self::collect_tiered(&self.shaders, &mut entries);

        let mut candidates = Vec::with_capacity(entries.len());
        for (id, entry) in entries {
            if protected == Some(&id) {
                continue;
            }
            let last_active = {
                let mut resource = lock(&entry, "Resource")?;
                if resource.take_use() {
                    resource.touch(self.clock);
                }
                resource.last_active()
            };
            candidates.push((last_active, (id, entry)));
        }
        candidates.sort_by_key(|(last_active, _)| *last_active);
        Ok(candidates)
    }

    fn static_usage(&self) -> Result<MemoryFootprint> {
        Ok(self.cache_usage::<StaticTexture>()?
            + self.cache_usage::<StaticMesh>()?
            + self.cache_usage::<ShaderProgram>()?)
    }

    /// Demote static resources until usage fits the budget
    ///
    /// Device phase: least recently active resources not pinned with
    /// `KeepInDeviceMemory` move to host memory. Host phase: least recently
    /// active host-resident `AllowDemotion` resources move back to disk.
    /// Render textures are never demoted.
    pub fn enforce_budget(&mut self) -> Result<EvictionReport> {
        self.enforce_budget_protecting(None)
    }

    fn enforce_budget_protecting(&mut self, protected: Option<&ResourceId>) -> Result<EvictionReport> {
        let mut report = EvictionReport::default();
        let mut usage = self.static_usage()?;
        if !self.budget.device_exceeded(usage.device) && !self.budget.host_exceeded(usage.host) {
            return Ok(report);
        }

        let candidates = self.eviction_candidates(protected)?;
        let device = self.graphics_device.clone();
        let mut device = lock(&device, "GraphicsDevice")?;

        for (_, (id, entry)) in &candidates {
            if !self.budget.device_exceeded(usage.device) {
                break;
            }
            let mut resource = lock(entry, "Resource")?;
            if resource.storage_state() != StorageState::InDeviceMemory
                || resource.policy() == DataStorePolicy::KeepInDeviceMemory
            {
                continue;
            }
            let before = resource.memory_footprint();
            resource.unload_from_device(&mut *device)?;
            usage.device -= before.device;
            report.demoted_to_host += 1;
            crate::engine_debug!("lumen3d::ResourceManager", "Demoted {} to host memory", id);
        }

        for (_, (id, entry)) in &candidates {
            if !self.budget.host_exceeded(usage.host) {
                break;
            }
            let mut resource = lock(entry, "Resource")?;
            if resource.storage_state() != StorageState::InHostMemory
                || resource.policy() != DataStorePolicy::AllowDemotion
            {
                continue;
            }
            let before = resource.memory_footprint();
            resource.unload_from_host()?;
            usage.host -= before.host;
            report.demoted_to_disk += 1;
            crate::engine_debug!("lumen3d::ResourceManager", "Demoted {} to disk", id);
        }

        if self.budget.device_exceeded(usage.device) || self.budget.host_exceeded(usage.host) {
            crate::engine_warn!("lumen3d::ResourceManager",
                "Memory budget still exceeded after eviction (device {} B, host {} B)",
                usage.device, usage.host);
        }
        Ok(report)
    }

    // ===== CONVENIENCE LOADERS =====

    fn load_static<A: StaticAsset>(
        &mut self,
        id: ResourceId,
        policy: DataStorePolicy,
    ) -> Result<Arc<Mutex<StaticResource<A>>>>
    where
        StaticResource<A>: ManagedResource,
    {
        let entry = self.get_or_load(id.clone(), |ctx| {
            let mut resource = StaticResource::<A>::new(id.clone(), policy);
            resource.make_resident(ctx.device, ctx.assets)?;
            Ok(resource)
        })?;
        self.enforce_budget_protecting(Some(&id))?;
        Ok(entry)
    }

    /// Load a 2D texture from one image file
    pub fn load_texture(
        &mut self,
        path: impl Into<PathBuf>,
        policy: DataStorePolicy,
    ) -> Result<Arc<Mutex<StaticTexture>>> {
        self.load_static(ResourceId::from_path(path), policy)
    }

    /// Load a cubemap from six face images (+X, -X, +Y, -Y, +Z, -Z)
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` unless exactly six paths are given
    /// - `Error::ResourceIntegrity` if the faces differ in size or format
    pub fn load_cubemap<I, P>(&mut self, faces: I, policy: DataStorePolicy) -> Result<Arc<Mutex<StaticTexture>>>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let id = ResourceId::from_paths(faces);
        if id.paths().len() != CUBEMAP_FACE_COUNT {
            engine_bail!(InvalidArgument, "lumen3d::ResourceManager",
                "A cubemap needs {} faces, got {}", CUBEMAP_FACE_COUNT, id.paths().len());
        }
        self.load_static(id, policy)
    }

    /// Load a mesh from one model file
    pub fn load_mesh(
        &mut self,
        path: impl Into<PathBuf>,
        policy: DataStorePolicy,
    ) -> Result<Arc<Mutex<StaticMesh>>> {
        self.load_static(ResourceId::from_path(path), policy)
    }

    /// Compile a program from a vertex and a fragment source file
    ///
    /// Programs are pinned in device memory.
    pub fn load_shader(
        &mut self,
        vertex: impl Into<PathBuf>,
        fragment: impl Into<PathBuf>,
    ) -> Result<Arc<Mutex<ShaderProgram>>> {
        let id = ResourceId::from_paths([vertex.into(), fragment.into()]);
        self.load_static(id, DataStorePolicy::KeepInDeviceMemory)
    }

    /// Register a new render texture (allocated on its first `ensure`)
    pub fn create_render_texture(&mut self, label: &str) -> Result<Arc<Mutex<DynamicTexture>>> {
        let texture = DynamicTexture::new(label);
        let id = texture.id().clone();
        self.get_or_load(id, |_| Ok(texture))
    }

    /// Resize a cached render texture on demand
    pub fn ensure_render_texture(
        &mut self,
        id: &ResourceId,
        width: u32,
        height: u32,
        format: crate::graphics_device::TextureFormat,
    ) -> Result<bool> {
        let Some(entry) = self.render_textures.get(id) else {
            return Err(crate::engine_err!(InvalidResource, "lumen3d::ResourceManager",
                "Render texture {} is not cached", id));
        };
        let mut device = lock(&self.graphics_device, "GraphicsDevice")?;
        let mut texture = lock(&entry, "Resource")?;
        texture.ensure(&mut *device, width, height, format)
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        if self.resource_count() > 0 {
            if let Err(error) = self.release_all() {
                crate::engine_warn!("lumen3d::ResourceManager", "Release on drop failed: {}", error);
            }
        }
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
