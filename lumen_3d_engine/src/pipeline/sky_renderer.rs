/// Sky renderer - draws a cubemap behind the scene geometry.
///
/// The cubemap and program come from the resource manager and are pinned
/// in device memory so they stay drawable without reloading mid-frame.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use crate::error::Result;
use crate::parameter::keys;
use crate::resource::{DataStorePolicy, ResourceManager, ShaderProgram, StaticTexture};
use super::renderer::{RenderContext, Renderer, RendererKind};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SkyUniforms {
    /// Inverse of projection * rotation-only view
    pub inverse_view_projection: [[f32; 4]; 4],
}

impl SkyUniforms {
    pub fn new(view: &Mat4, projection: &Mat4) -> Self {
        let mut rotation = *view;
        rotation.w_axis = glam::Vec4::W;
        Self {
            inverse_view_projection: (*projection * rotation).inverse().to_cols_array_2d(),
        }
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| crate::engine_err!("lumen3d::SkyRenderer", "{} lock poisoned", what))
}

pub struct SkyRenderer {
    cubemap: Arc<Mutex<StaticTexture>>,
    program: Arc<Mutex<ShaderProgram>>,
    active: bool,
}

impl SkyRenderer {
    pub fn new(cubemap: Arc<Mutex<StaticTexture>>, program: Arc<Mutex<ShaderProgram>>) -> Self {
        Self {
            cubemap,
            program,
            active: true,
        }
    }

    /// Load the six cubemap faces and the sky program through `resources`
    pub fn load<P: Into<PathBuf>>(
        resources: &mut ResourceManager,
        faces: [P; 6],
        vertex: impl Into<PathBuf>,
        fragment: impl Into<PathBuf>,
    ) -> Result<Self> {
        let cubemap = resources.load_cubemap(faces, DataStorePolicy::KeepInDeviceMemory)?;
        let program = resources.load_shader(vertex, fragment)?;
        Ok(Self::new(cubemap, program))
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Renderer for SkyRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Sky
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn render(&mut self, ctx: &mut RenderContext) -> Result<()> {
        let camera = ctx.scene_parameters.require(&keys::MAIN_CAMERA)?;
        let uniforms = SkyUniforms::new(camera.view_matrix(), camera.projection_matrix());

        let mut program = lock(&self.program, "Program")?;
        let mut cubemap = lock(&self.cubemap, "Cubemap")?;
        let program = &program.prepare_for_draw(&mut *ctx.device)?.program;
        let texture = cubemap.prepare_for_draw(&mut *ctx.device)?.clone();

        ctx.device.draw_fullscreen(program, &[texture], bytemuck::bytes_of(&uniforms))
    }
}

#[cfg(test)]
#[path = "sky_renderer_tests.rs"]
mod tests;
