/// Mesh resource: triangle geometry loaded from one model file.

use std::path::PathBuf;
use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{Buffer, BufferDesc, BufferUsage, GraphicsDevice};
use super::{AssetLoader, MeshData, ResourceKind, StaticAsset, StaticResource};

/// Device buffers of an uploaded mesh
#[derive(Clone)]
pub struct GpuMesh {
    pub vertices: Arc<dyn Buffer>,
    pub indices: Option<Arc<dyn Buffer>>,
    pub element_count: u32,
}

/// Mesh variant of `StaticResource`
pub struct MeshAsset;

pub type StaticMesh = StaticResource<MeshAsset>;

impl StaticAsset for MeshAsset {
    type HostData = MeshData;
    type DeviceData = GpuMesh;

    const KIND: ResourceKind = ResourceKind::Mesh;
    const NAME: &'static str = "Mesh";

    fn load(paths: &[PathBuf], loader: &dyn AssetLoader) -> Result<MeshData> {
        let [path] = paths else {
            engine_bail!(InvalidArgument, "lumen3d::MeshAsset",
                "A mesh is loaded from exactly one file, got {}", paths.len());
        };

        let mesh = loader.load_mesh(path)?;
        if mesh.vertex_stride == 0 || mesh.vertices.len() % mesh.vertex_stride as usize != 0 {
            engine_bail!(ResourceIntegrity, "lumen3d::MeshAsset",
                "'{}' has {} floats, not a multiple of stride {}",
                path.display(), mesh.vertices.len(), mesh.vertex_stride);
        }
        let vertex_count = mesh.vertex_count();
        if let Some(bad) = mesh.indices.iter().find(|&&i| i >= vertex_count) {
            engine_bail!(ResourceIntegrity, "lumen3d::MeshAsset",
                "'{}' references vertex {} of {}", path.display(), bad, vertex_count);
        }
        Ok(mesh)
    }

    fn upload(mesh: &MeshData, device: &mut dyn GraphicsDevice) -> Result<GpuMesh> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
        let vertices = device.create_buffer(BufferDesc {
            size: vertex_bytes.len() as u64,
            usage: BufferUsage::Vertex,
            data: Some(vertex_bytes.to_vec()),
        })?;

        let indices = if mesh.indices.is_empty() {
            None
        } else {
            let index_bytes: &[u8] = bytemuck::cast_slice(&mesh.indices);
            match device.create_buffer(BufferDesc {
                size: index_bytes.len() as u64,
                usage: BufferUsage::Index,
                data: Some(index_bytes.to_vec()),
            }) {
                Ok(buffer) => Some(buffer),
                Err(error) => {
                    device.destroy_buffer(&vertices);
                    return Err(error);
                }
            }
        };

        Ok(GpuMesh {
            vertices,
            indices,
            element_count: mesh.element_count(),
        })
    }

    fn destroy(mesh: GpuMesh, device: &mut dyn GraphicsDevice) {
        device.destroy_buffer(&mesh.vertices);
        if let Some(indices) = &mesh.indices {
            device.destroy_buffer(indices);
        }
    }

    fn host_size(mesh: &MeshData) -> u64 {
        mesh.byte_size()
    }

    fn device_size(mesh: &GpuMesh) -> u64 {
        mesh.vertices.size() + mesh.indices.as_ref().map_or(0, |b| b.size())
    }
}
