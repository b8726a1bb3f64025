/// Off-screen framebuffer with resize-on-demand.
///
/// A render target describes its attachment formats once; the backing
/// framebuffer is (re)created by `ensure` whenever the requested size or
/// sample count differs from the current one.

use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    Framebuffer, FramebufferDesc, GraphicsDevice, Texture, TextureFormat,
};
use crate::invalidation::InvalidatableContainer;

pub struct RenderTarget {
    label: String,
    color_formats: Vec<TextureFormat>,
    depth_format: Option<TextureFormat>,
    framebuffer: Option<Arc<dyn Framebuffer>>,
    released: bool,
    invalidation: InvalidatableContainer,
}

impl RenderTarget {
    pub fn new(label: &str, color_formats: Vec<TextureFormat>, depth_format: Option<TextureFormat>) -> Self {
        Self {
            label: label.to_string(),
            color_formats,
            depth_format,
            framebuffer: None,
            released: false,
            invalidation: InvalidatableContainer::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Dependents notified every time the framebuffer is recreated
    pub fn invalidation(&self) -> &InvalidatableContainer {
        &self.invalidation
    }

    /// Current (width, height), if allocated
    pub fn size(&self) -> Option<(u32, u32)> {
        self.framebuffer.as_ref().map(|fb| (fb.width(), fb.height()))
    }

    /// Current sample count, if allocated
    pub fn samples(&self) -> Option<u32> {
        self.framebuffer.as_ref().map(|fb| fb.samples())
    }

    /// Make the framebuffer match the requested size and sample count
    ///
    /// Returns true if the framebuffer was (re)created. A matching request
    /// performs no device call.
    ///
    /// # Errors
    ///
    /// - `Error::UseAfterRelease` after `release`
    /// - `Error::ConfigurationError` for a zero size or sample count
    /// - `Error::DeviceResourceError` if the device reports the framebuffer
    ///   incomplete; the target is then left unallocated
    pub fn ensure(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<bool> {
        if self.released {
            engine_bail!(UseAfterRelease, "lumen3d::RenderTarget",
                "Render target '{}' was released", self.label);
        }
        if width == 0 || height == 0 || samples == 0 {
            engine_bail!(ConfigurationError, "lumen3d::RenderTarget",
                "Render target '{}' cannot be {}x{} with {} samples",
                self.label, width, height, samples);
        }
        if self.size() == Some((width, height)) && self.samples() == Some(samples) {
            return Ok(false);
        }

        if let Some(old) = self.framebuffer.take() {
            device.destroy_framebuffer(&old);
        }
        self.framebuffer = Some(device.create_framebuffer(&FramebufferDesc {
            label: self.label.clone(),
            width,
            height,
            samples,
            color_formats: self.color_formats.clone(),
            depth_format: self.depth_format,
        })?);

        crate::engine_info!("lumen3d::RenderTarget",
            "Render target '{}' allocated at {}x{} ({} samples)", self.label, width, height, samples);
        self.invalidation.invalidate();
        Ok(true)
    }

    /// Backing framebuffer
    ///
    /// # Errors
    ///
    /// - `Error::UseAfterRelease` after `release`
    /// - `Error::InvalidResource` before the first successful `ensure`
    pub fn framebuffer(&self) -> Result<&Arc<dyn Framebuffer>> {
        if self.released {
            engine_bail!(UseAfterRelease, "lumen3d::RenderTarget",
                "Render target '{}' was released", self.label);
        }
        match &self.framebuffer {
            Some(framebuffer) => Ok(framebuffer),
            None => engine_bail!(InvalidResource, "lumen3d::RenderTarget",
                "Render target '{}' has not been allocated", self.label),
        }
    }

    /// Color attachment `index` of the backing framebuffer
    pub fn color_attachment(&self, index: usize) -> Result<&Arc<dyn Texture>> {
        let framebuffer = self.framebuffer()?;
        match framebuffer.color_attachment(index) {
            Some(texture) => Ok(texture),
            None => engine_bail!(InvalidArgument, "lumen3d::RenderTarget",
                "Render target '{}' has no color attachment {}", self.label, index),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Destroy the framebuffer; further use fails with `UseAfterRelease`
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if self.released {
            return;
        }
        if let Some(framebuffer) = self.framebuffer.take() {
            device.destroy_framebuffer(&framebuffer);
        }
        self.invalidation.clear();
        self.released = true;
    }
}

#[cfg(test)]
#[path = "render_target_tests.rs"]
mod tests;
