/// GraphicsDevice trait - abstract verbs issued to the device binding layer

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    AttachmentMask, Buffer, BufferDesc, Framebuffer, FramebufferDesc,
    Program, ProgramDesc, Texture, TextureDesc,
};

/// Device statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Number of draw calls issued since creation
    pub draw_calls: u64,
    /// Number of live textures (including framebuffer attachments)
    pub live_textures: u32,
    /// Device memory held by live textures and buffers (bytes)
    pub device_memory_used: u64,
}

/// Device binding layer
///
/// This is the boundary between the engine core and a native graphics API.
/// The core only allocates, binds, and draws through these verbs; it never
/// issues native calls itself. All calls are synchronous.
pub trait GraphicsDevice: Send + Sync {
    /// Allocate a texture in device memory, optionally uploading data
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Free a texture's device memory
    fn destroy_texture(&mut self, texture: &Arc<dyn Texture>);

    /// Allocate a buffer in device memory, optionally uploading data
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Free a buffer's device memory
    fn destroy_buffer(&mut self, buffer: &Arc<dyn Buffer>);

    /// Compile and link a program from source text
    fn create_program(&mut self, desc: &ProgramDesc) -> Result<Arc<dyn Program>>;

    /// Delete a program
    fn destroy_program(&mut self, program: &Arc<dyn Program>);

    /// Create a framebuffer and its attachments
    ///
    /// # Errors
    ///
    /// `Error::DeviceResourceError` if the device reports the framebuffer incomplete.
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Destroy a framebuffer and its attachments
    fn destroy_framebuffer(&mut self, framebuffer: &Arc<dyn Framebuffer>);

    /// Bind a framebuffer for drawing (`None` = default screen target)
    ///
    /// Only the attachments in `draw` receive output.
    fn bind_framebuffer(
        &mut self,
        target: Option<&Arc<dyn Framebuffer>>,
        draw: AttachmentMask,
    ) -> Result<()>;

    /// Set the viewport of the bound target
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear the draw-enabled attachments of the bound target
    fn clear(&mut self, color: [f32; 4]) -> Result<()>;

    /// Toggle wireframe rasterization
    fn set_wireframe(&mut self, enabled: bool);

    /// Resolve (and downsample) one attachment of `src` into one attachment of `dst`
    fn resolve_framebuffer(
        &mut self,
        src: &Arc<dyn Framebuffer>,
        src_attachment: usize,
        dst: &Arc<dyn Framebuffer>,
        dst_attachment: usize,
    ) -> Result<()>;

    /// Draw a full-screen triangle sampling `inputs` into the bound target
    fn draw_fullscreen(
        &mut self,
        program: &Arc<dyn Program>,
        inputs: &[Arc<dyn Texture>],
        uniforms: &[u8],
    ) -> Result<()>;

    /// Draw geometry from vertex (and optional index) buffers
    fn draw_mesh(
        &mut self,
        program: &Arc<dyn Program>,
        vertices: &Arc<dyn Buffer>,
        indices: Option<&Arc<dyn Buffer>>,
        element_count: u32,
    ) -> Result<()>;

    /// Get statistics about the device
    fn stats(&self) -> DeviceStats;
}
