/// Screen compositor - draws the final work texture to the default target.

use crate::error::Result;
use crate::graphics_device::{AttachmentMask, GraphicsDevice};
use crate::parameter::{keys, ParameterContainer};
use super::effect_registry::EffectRegistry;
use super::post_effect::COPY_FRAGMENT_SOURCE;

const COPY_LABEL: &str = "copy";

#[derive(Default)]
pub struct ScreenCompositor {
    programs: EffectRegistry,
}

impl ScreenCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the published work texture to the window at `width` x `height`
    ///
    /// # Errors
    ///
    /// `Error::PreconditionFailed` if no work texture is published.
    pub fn composite(
        &mut self,
        device: &mut dyn GraphicsDevice,
        parameters: &ParameterContainer,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let work = parameters.require(&keys::WORK_TEXTURE)?.clone();
        let program = self.programs.program(device, COPY_LABEL, COPY_FRAGMENT_SOURCE)?;

        device.bind_framebuffer(None, AttachmentMask::ATTACHMENT_0)?;
        device.set_viewport(width, height);
        device.draw_fullscreen(&program, &[work], &[])
    }

    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.programs.release(device);
    }
}
