/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Records every verb, counts allocations and destructions, and simulates
/// the content of each texture as a string expression: a full-screen draw
/// with program "invert" reading a texture whose content is "scene" writes
/// "invert(scene)" into every draw-enabled attachment. Draws that read and
/// write the same texture are refused, like a device feedback loop would be.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    AttachmentMask, Buffer, BufferDesc, BufferUsage, DeviceStats, Framebuffer,
    FramebufferDesc, GraphicsDevice, Program, ProgramDesc, Texture, TextureDesc,
    TextureInfo, TextureType, TextureUsage,
};

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub handle: u64,
    pub info: TextureInfo,
}

impl Texture for MockTexture {
    fn handle(&self) -> u64 {
        self.handle
    }

    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub handle: u64,
    pub size: u64,
    pub usage: BufferUsage,
}

impl Buffer for MockBuffer {
    fn handle(&self) -> u64 {
        self.handle
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }
}

// ============================================================================
// Mock Program
// ============================================================================

#[derive(Debug)]
pub struct MockProgram {
    pub handle: u64,
    pub label: String,
    valid: AtomicBool,
}

impl MockProgram {
    /// Simulate losing the device object
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::SeqCst);
    }
}

impl Program for MockProgram {
    fn handle(&self) -> u64 {
        self.handle
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Mock Framebuffer
// ============================================================================

pub struct MockFramebuffer {
    pub handle: u64,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub colors: Vec<Arc<dyn Texture>>,
    pub depth: Option<Arc<dyn Texture>>,
}

impl Framebuffer for MockFramebuffer {
    fn handle(&self) -> u64 {
        self.handle
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn samples(&self) -> u32 {
        self.samples
    }

    fn color_attachment_count(&self) -> usize {
        self.colors.len()
    }

    fn color_attachment(&self, index: usize) -> Option<&Arc<dyn Texture>> {
        self.colors.get(index)
    }

    fn depth_attachment(&self) -> Option<&Arc<dyn Texture>> {
        self.depth.as_ref()
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// One recorded draw call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    /// Program label
    pub program: String,
    /// Handles of the sampled textures
    pub inputs: Vec<u64>,
    /// Handles of the written attachments (empty when drawing to the screen)
    pub outputs: Vec<u64>,
}

pub struct MockGraphicsDevice {
    next_handle: u64,
    pub textures_created: u32,
    pub textures_destroyed: u32,
    pub buffers_created: u32,
    pub buffers_destroyed: u32,
    pub programs_created: u32,
    pub programs_destroyed: u32,
    pub framebuffers_created: u32,
    pub framebuffers_destroyed: u32,
    /// Every verb issued, in order
    pub commands: Vec<String>,
    /// Every draw issued, in order
    pub draws: Vec<DrawRecord>,
    /// Simulated content of the default screen target
    pub screen_content: Option<String>,
    pub wireframe: bool,
    /// Fail every create_texture call
    pub fail_texture_creation: bool,
    /// Fail every create_program call
    pub fail_program_compilation: bool,
    /// Report every framebuffer as incomplete
    pub incomplete_framebuffers: bool,
    contents: FxHashMap<u64, String>,
    live_bytes: FxHashMap<u64, u64>,
    programs: Vec<Arc<MockProgram>>,
    bound: Option<(Arc<dyn Framebuffer>, AttachmentMask)>,
    draw_calls: u64,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            textures_created: 0,
            textures_destroyed: 0,
            buffers_created: 0,
            buffers_destroyed: 0,
            programs_created: 0,
            programs_destroyed: 0,
            framebuffers_created: 0,
            framebuffers_destroyed: 0,
            commands: Vec::new(),
            draws: Vec::new(),
            screen_content: None,
            wireframe: false,
            fail_texture_creation: false,
            fail_program_compilation: false,
            incomplete_framebuffers: false,
            contents: FxHashMap::default(),
            live_bytes: FxHashMap::default(),
            programs: Vec::new(),
            bound: None,
            draw_calls: 0,
        }
    }

    /// Simulated content of a texture
    pub fn content(&self, handle: u64) -> Option<&str> {
        self.contents.get(&handle).map(|s| s.as_str())
    }

    /// Overwrite the simulated content of a texture
    pub fn set_content(&mut self, handle: u64, content: &str) {
        self.contents.insert(handle, content.to_string());
    }

    /// Returns true if the texture handle is still allocated
    pub fn is_live(&self, handle: u64) -> bool {
        self.live_bytes.contains_key(&handle)
    }

    /// Invalidate every program compiled so far (simulated device loss)
    pub fn lose_device(&mut self) {
        for program in &self.programs {
            program.invalidate();
        }
        self.commands.push("lose_device".to_string());
    }

    /// Forget recorded commands and draws
    pub fn clear_records(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn allocate_texture(&mut self, info: TextureInfo) -> Arc<dyn Texture> {
        let handle = self.next_handle();
        self.live_bytes.insert(handle, info.byte_size());
        self.contents.insert(handle, format!("tex#{}", handle));
        Arc::new(MockTexture { handle, info })
    }

    fn bound_outputs(&self) -> Option<Vec<u64>> {
        self.bound.as_ref().map(|(framebuffer, mask)| {
            mask.indices()
                .filter_map(|i| framebuffer.color_attachment(i))
                .map(|t| t.handle())
                .collect()
        })
    }

    fn write_outputs(&mut self, outputs: &Option<Vec<u64>>, content: String) {
        match outputs {
            Some(handles) => {
                for handle in handles {
                    self.contents.insert(*handle, content.clone());
                }
            }
            None => self.screen_content = Some(content),
        }
    }

    fn record_draw(
        &mut self,
        label: &str,
        inputs: Vec<u64>,
        content: String,
    ) -> Result<()> {
        let outputs = self.bound_outputs();
        if let Some(handles) = &outputs {
            if let Some(aliased) = inputs.iter().find(|h| handles.contains(h)) {
                engine_bail!(DeviceResourceError, "lumen3d::mock",
                    "Program '{}' reads and writes texture #{}", label, aliased);
            }
        }
        self.write_outputs(&outputs, content);
        self.draws.push(DrawRecord {
            program: label.to_string(),
            inputs,
            outputs: outputs.unwrap_or_default(),
        });
        self.draw_calls += 1;
        Ok(())
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        if self.fail_texture_creation {
            engine_bail!(DeviceResourceError, "lumen3d::mock",
                "Texture allocation refused ({}x{})", desc.width, desc.height);
        }
        self.textures_created += 1;
        let texture = self.allocate_texture(TextureInfo::from(&desc));
        self.commands.push(format!("create_texture(#{})", texture.handle()));
        Ok(texture)
    }

    fn destroy_texture(&mut self, texture: &Arc<dyn Texture>) {
        self.textures_destroyed += 1;
        self.live_bytes.remove(&texture.handle());
        self.contents.remove(&texture.handle());
        self.commands.push(format!("destroy_texture(#{})", texture.handle()));
    }

    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        if let Some(data) = &desc.data {
            if data.len() as u64 != desc.size {
                engine_bail!(InvalidArgument, "lumen3d::mock",
                    "Buffer data is {} bytes, expected {}", data.len(), desc.size);
            }
        }
        self.buffers_created += 1;
        let handle = self.next_handle();
        self.live_bytes.insert(handle, desc.size);
        self.commands.push(format!("create_buffer(#{})", handle));
        Ok(Arc::new(MockBuffer { handle, size: desc.size, usage: desc.usage }))
    }

    fn destroy_buffer(&mut self, buffer: &Arc<dyn Buffer>) {
        self.buffers_destroyed += 1;
        self.live_bytes.remove(&buffer.handle());
        self.commands.push(format!("destroy_buffer(#{})", buffer.handle()));
    }

    fn create_program(&mut self, desc: &ProgramDesc) -> Result<Arc<dyn Program>> {
        if self.fail_program_compilation {
            engine_bail!(DeviceResourceError, "lumen3d::mock",
                "Program '{}' failed to compile", desc.label);
        }
        self.programs_created += 1;
        let program = Arc::new(MockProgram {
            handle: self.next_handle(),
            label: desc.label.clone(),
            valid: AtomicBool::new(true),
        });
        self.programs.push(program.clone());
        self.commands.push(format!("create_program({})", desc.label));
        Ok(program)
    }

    fn destroy_program(&mut self, program: &Arc<dyn Program>) {
        self.programs_destroyed += 1;
        self.programs.retain(|p| p.handle != program.handle());
        self.commands.push(format!("destroy_program({})", program.label()));
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        if self.incomplete_framebuffers {
            engine_bail!(DeviceResourceError, "lumen3d::mock",
                "Framebuffer '{}' is incomplete", desc.label);
        }
        if desc.color_formats.is_empty() && desc.depth_format.is_none() {
            engine_bail!(DeviceResourceError, "lumen3d::mock",
                "Framebuffer '{}' has no attachments", desc.label);
        }

        let colors = desc.color_formats.iter()
            .map(|format| self.allocate_texture(TextureInfo {
                width: desc.width,
                height: desc.height,
                format: *format,
                usage: TextureUsage::RENDER_TARGET | TextureUsage::SAMPLED,
                texture_type: TextureType::Tex2D,
                samples: desc.samples,
            }))
            .collect();
        let depth = desc.depth_format.map(|format| self.allocate_texture(TextureInfo {
            width: desc.width,
            height: desc.height,
            format,
            usage: TextureUsage::DEPTH_STENCIL,
            texture_type: TextureType::Tex2D,
            samples: desc.samples,
        }));

        self.framebuffers_created += 1;
        let handle = self.next_handle();
        self.commands.push(format!(
            "create_framebuffer({}, {}x{}, samples={})",
            desc.label, desc.width, desc.height, desc.samples
        ));
        Ok(Arc::new(MockFramebuffer {
            handle,
            width: desc.width,
            height: desc.height,
            samples: desc.samples,
            colors,
            depth,
        }))
    }

    fn destroy_framebuffer(&mut self, framebuffer: &Arc<dyn Framebuffer>) {
        self.framebuffers_destroyed += 1;
        let attachments = (0..framebuffer.color_attachment_count())
            .filter_map(|i| framebuffer.color_attachment(i))
            .chain(framebuffer.depth_attachment())
            .map(|t| t.handle())
            .collect::<Vec<_>>();
        for handle in attachments {
            self.live_bytes.remove(&handle);
            self.contents.remove(&handle);
        }
        if self.bound.as_ref().is_some_and(|(fb, _)| fb.handle() == framebuffer.handle()) {
            self.bound = None;
        }
        self.commands.push(format!("destroy_framebuffer(#{})", framebuffer.handle()));
    }

    fn bind_framebuffer(
        &mut self,
        target: Option<&Arc<dyn Framebuffer>>,
        draw: AttachmentMask,
    ) -> Result<()> {
        match target {
            Some(framebuffer) => {
                if let Some(index) = draw.indices().find(|i| *i >= framebuffer.color_attachment_count()) {
                    engine_bail!(InvalidArgument, "lumen3d::mock",
                        "Framebuffer #{} has no color attachment {}", framebuffer.handle(), index);
                }
                self.commands.push(format!(
                    "bind_framebuffer(#{}, draw={:?})",
                    framebuffer.handle(),
                    draw.indices().collect::<Vec<_>>()
                ));
                self.bound = Some((framebuffer.clone(), draw));
            }
            None => {
                self.commands.push("bind_framebuffer(screen)".to_string());
                self.bound = None;
            }
        }
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.commands.push(format!("set_viewport({}x{})", width, height));
    }

    fn clear(&mut self, _color: [f32; 4]) -> Result<()> {
        let outputs = self.bound_outputs();
        self.write_outputs(&outputs, "clear".to_string());
        self.commands.push("clear".to_string());
        Ok(())
    }

    fn set_wireframe(&mut self, enabled: bool) {
        self.wireframe = enabled;
        self.commands.push(format!("set_wireframe({})", enabled));
    }

    fn resolve_framebuffer(
        &mut self,
        src: &Arc<dyn Framebuffer>,
        src_attachment: usize,
        dst: &Arc<dyn Framebuffer>,
        dst_attachment: usize,
    ) -> Result<()> {
        let (Some(from), Some(to)) = (
            src.color_attachment(src_attachment),
            dst.color_attachment(dst_attachment),
        ) else {
            engine_bail!(InvalidArgument, "lumen3d::mock",
                "Resolve between missing attachments ({} -> {})", src_attachment, dst_attachment);
        };

        let content = self.contents.get(&from.handle()).cloned().unwrap_or_default();
        self.contents.insert(to.handle(), content);
        self.commands.push(format!("resolve(#{} -> #{})", from.handle(), to.handle()));
        Ok(())
    }

    fn draw_fullscreen(
        &mut self,
        program: &Arc<dyn Program>,
        inputs: &[Arc<dyn Texture>],
        _uniforms: &[u8],
    ) -> Result<()> {
        if !program.is_valid() {
            engine_bail!(DeviceResourceError, "lumen3d::mock",
                "Program '{}' is no longer valid", program.label());
        }

        let input_handles = inputs.iter().map(|t| t.handle()).collect::<Vec<_>>();
        let content = if inputs.is_empty() {
            program.label().to_string()
        } else {
            let sources = input_handles.iter()
                .map(|h| self.contents.get(h).cloned().unwrap_or_else(|| format!("tex#{}", h)))
                .collect::<Vec<_>>();
            format!("{}({})", program.label(), sources.join(","))
        };

        self.commands.push(format!("draw_fullscreen({})", program.label()));
        self.record_draw(program.label(), input_handles, content)
    }

    fn draw_mesh(
        &mut self,
        program: &Arc<dyn Program>,
        vertices: &Arc<dyn Buffer>,
        _indices: Option<&Arc<dyn Buffer>>,
        element_count: u32,
    ) -> Result<()> {
        if !program.is_valid() {
            engine_bail!(DeviceResourceError, "lumen3d::mock",
                "Program '{}' is no longer valid", program.label());
        }
        let content = format!("{}(mesh#{})", program.label(), vertices.handle());
        self.commands.push(format!("draw_mesh({}, {})", program.label(), element_count));
        self.record_draw(program.label(), Vec::new(), content)
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats {
            draw_calls: self.draw_calls,
            live_textures: self.contents.len() as u32,
            device_memory_used: self.live_bytes.values().sum(),
        }
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
