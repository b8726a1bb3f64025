/// Renderer trait - one unit of work executed by a rendering stage.
///
/// A stage holds at most one renderer of each `RendererKind` and runs its
/// active renderers in insertion order.

use std::fmt;
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::parameter::ParameterContainer;

/// Tag identifying the role of a renderer inside a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// Shadow map generation (usually in the prepare stage)
    Shadow,
    /// Opaque geometry
    Opaque,
    /// Alpha-blended geometry
    Transparent,
    /// Sky box or environment background
    Sky,
    /// Application-defined renderer
    Custom(&'static str),
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererKind::Shadow => write!(f, "shadow"),
            RendererKind::Opaque => write!(f, "opaque"),
            RendererKind::Transparent => write!(f, "transparent"),
            RendererKind::Sky => write!(f, "sky"),
            RendererKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Everything a renderer may touch while drawing one frame
pub struct RenderContext<'a> {
    /// Locked graphics device
    pub device: &'a mut dyn GraphicsDevice,
    /// Pipeline-level parameters (gamma, MSAA level, work texture, ...)
    pub pipeline_parameters: &'a mut ParameterContainer,
    /// Scene-level parameters (main camera, main light, ...)
    pub scene_parameters: &'a ParameterContainer,
    /// Internal render width in pixels
    pub width: u32,
    /// Internal render height in pixels
    pub height: u32,
}

pub trait Renderer: Send {
    fn kind(&self) -> RendererKind;

    /// Inactive renderers are skipped by their stage
    fn is_active(&self) -> bool {
        true
    }

    /// Record the renderer's draws for the current frame
    fn render(&mut self, ctx: &mut RenderContext) -> Result<()>;

    /// Free device objects owned by the renderer
    fn release(&mut self, _device: &mut dyn GraphicsDevice) -> Result<()> {
        Ok(())
    }
}
