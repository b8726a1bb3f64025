/// Mesh renderer - draws a list of cached meshes with one program.

use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::engine_err;
use crate::resource::{ShaderProgram, StaticMesh};
use super::renderer::{RenderContext, Renderer, RendererKind};

pub struct MeshRenderer {
    kind: RendererKind,
    program: Arc<Mutex<ShaderProgram>>,
    meshes: Vec<Arc<Mutex<StaticMesh>>>,
    active: bool,
}

impl MeshRenderer {
    pub fn new(kind: RendererKind, program: Arc<Mutex<ShaderProgram>>) -> Self {
        Self {
            kind,
            program,
            meshes: Vec::new(),
            active: true,
        }
    }

    pub fn add_mesh(&mut self, mesh: Arc<Mutex<StaticMesh>>) {
        self.meshes.push(mesh);
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Renderer for MeshRenderer {
    fn kind(&self) -> RendererKind {
        self.kind
    }

    fn is_active(&self) -> bool {
        self.active
    }

    /// Meshes demoted to host memory are uploaded again before drawing;
    /// fails on the first mesh that cannot be made resident
    fn render(&mut self, ctx: &mut RenderContext) -> Result<()> {
        let mut program = self.program.lock()
            .map_err(|_| engine_err!("lumen3d::MeshRenderer", "Program lock poisoned"))?;
        let program = &program.prepare_for_draw(&mut *ctx.device)?.program;

        for mesh in &self.meshes {
            let mut mesh = mesh.lock()
                .map_err(|_| engine_err!("lumen3d::MeshRenderer", "Mesh lock poisoned"))?;
            let gpu = mesh.prepare_for_draw(&mut *ctx.device)?;
            ctx.device.draw_mesh(program, &gpu.vertices, gpu.indices.as_ref(), gpu.element_count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mesh_renderer_tests.rs"]
mod tests;
