/// Shader program resource: compiled from a vertex and a fragment source file.

use std::path::PathBuf;
use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{GraphicsDevice, Program, ProgramDesc};
use super::{AssetLoader, ResourceKind, StaticAsset, StaticResource};

/// Device program of a loaded shader
#[derive(Clone)]
pub struct CompiledProgram {
    pub program: Arc<dyn Program>,
    /// Device footprint estimate (program objects are opaque)
    pub size: u64,
}

/// Program variant of `StaticResource`
///
/// Source paths are `[vertex, fragment]`. The program label is the file
/// stem of the vertex source.
pub struct ShaderAsset;

pub type ShaderProgram = StaticResource<ShaderAsset>;

impl StaticAsset for ShaderAsset {
    type HostData = ProgramDesc;
    type DeviceData = CompiledProgram;

    const KIND: ResourceKind = ResourceKind::Shader;
    const NAME: &'static str = "ShaderProgram";

    fn load(paths: &[PathBuf], loader: &dyn AssetLoader) -> Result<ProgramDesc> {
        let [vertex, fragment] = paths else {
            engine_bail!(InvalidArgument, "lumen3d::ShaderAsset",
                "A shader program needs a vertex and a fragment source, got {} paths", paths.len());
        };

        let vertex_source = loader.load_text(vertex)?;
        let fragment_source = loader.load_text(fragment)?;
        let label = vertex.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| vertex.display().to_string());

        Ok(ProgramDesc { label, vertex_source, fragment_source })
    }

    fn upload(desc: &ProgramDesc, device: &mut dyn GraphicsDevice) -> Result<CompiledProgram> {
        Ok(CompiledProgram {
            program: device.create_program(desc)?,
            size: desc.source_size(),
        })
    }

    fn destroy(compiled: CompiledProgram, device: &mut dyn GraphicsDevice) {
        device.destroy_program(&compiled.program);
    }

    fn host_size(desc: &ProgramDesc) -> u64 {
        desc.source_size()
    }

    fn device_size(compiled: &CompiledProgram) -> u64 {
        compiled.size
    }
}
