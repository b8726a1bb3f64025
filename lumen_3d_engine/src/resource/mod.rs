//! Resource management module
//!
//! Lifecycle and caching of textures, meshes and shader programs across
//! the disk, host memory and device memory tiers.

mod resource_id;
mod resource;
mod asset_loader;
mod static_resource;
mod resource_cache;
mod resource_manager;
pub mod texture;
pub mod mesh;
pub mod shader;

#[cfg(test)]
pub mod mock_asset_loader;

pub use resource_id::ResourceId;
pub use resource::{DataStorePolicy, MemoryFootprint, Resource, ResourceKind, StorageState};
pub use asset_loader::{AssetLoader, ImageData, MeshData};
pub use static_resource::{StaticAsset, StaticResource, TieredResource};
pub use resource_cache::ResourceCache;
pub use resource_manager::{EvictionReport, LoadContext, ManagedResource, ResourceManager};
pub use texture::{
    DynamicTexture, StaticTexture, TextureAsset, TextureHostData,
    CUBEMAP_FACE_COUNT,
};
pub use mesh::{GpuMesh, MeshAsset, StaticMesh};
pub use shader::{CompiledProgram, ShaderAsset, ShaderProgram};
