/// Prepare and geometry rendering stages.
///
/// Both are an ordered `RendererList` executed as a unit. The prepare stage
/// runs before the main framebuffer is bound (shadow maps, probes); geometry
/// stages draw into the bound main framebuffer.

use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use super::renderer::{RenderContext, Renderer, RendererKind};
use super::renderer_list::RendererList;

/// Role of a stage in the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageRole {
    Prepare,
    Geometry,
}

pub struct RenderingStage {
    name: String,
    role: StageRole,
    renderers: RendererList<Box<dyn Renderer>>,
}

/// Stage run first each frame, before the main framebuffer is bound
pub type PrepareRenderingStage = RenderingStage;

/// Stage drawing into the main framebuffer
pub type GeometryRenderingStage = RenderingStage;

impl RenderingStage {
    pub fn prepare() -> Self {
        Self::with_role("prepare", StageRole::Prepare)
    }

    pub fn geometry(name: &str) -> Self {
        Self::with_role(name, StageRole::Geometry)
    }

    fn with_role(name: &str, role: StageRole) -> Self {
        Self {
            name: name.to_string(),
            role,
            renderers: RendererList::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> StageRole {
        self.role
    }

    /// Append a renderer; fails if one of the same kind is present
    pub fn add_renderer(&mut self, renderer: Box<dyn Renderer>) -> Result<()> {
        self.renderers.add(renderer)
    }

    /// Detach a renderer without releasing it
    pub fn remove_renderer(&mut self, kind: RendererKind) -> Option<Box<dyn Renderer>> {
        self.renderers.remove(kind)
    }

    pub fn renderer_mut(&mut self, kind: RendererKind) -> Option<&mut Box<dyn Renderer>> {
        self.renderers.get_mut(kind)
    }

    pub fn renderers(&self) -> &RendererList<Box<dyn Renderer>> {
        &self.renderers
    }

    /// Run every active renderer in insertion order
    ///
    /// The first failing renderer aborts the stage.
    pub fn render(&mut self, ctx: &mut RenderContext) -> Result<()> {
        for renderer in self.renderers.iter_mut() {
            if !renderer.is_active() {
                continue;
            }
            crate::engine_trace!("lumen3d::RenderingStage",
                "Stage '{}' running {} renderer", self.name, renderer.kind());
            renderer.render(ctx)?;
        }
        Ok(())
    }

    /// Release and drop every renderer
    ///
    /// Every renderer is released even if one fails; the first error is returned.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let mut first_error = None;
        for mut renderer in self.renderers.drain() {
            if let Err(error) = renderer.release(device) {
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "rendering_stage_tests.rs"]
mod tests;
