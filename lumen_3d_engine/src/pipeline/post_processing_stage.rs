/// Post-processing stage - chain of full-screen effects with ping-pong buffering.
///
/// The stage owns one framebuffer with two color attachments. Each frame:
///
/// 1. attachment 0 receives the resolved main image and is published as the
///    work texture (`not_draw` = 0, `draw` = 1)
/// 2. every active pass reads the work texture, draws into `draw` with only
///    that attachment enabled, then the indices swap and the new `not_draw`
///    attachment is republished
///
/// A pass therefore never reads the attachment it writes. Inactive passes
/// are skipped without binding or swapping.

use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    AttachmentMask, Framebuffer, GraphicsDevice, Texture, TextureFormat,
};
use crate::parameter::{keys, ParameterContainer};
use super::effect_registry::EffectRegistry;
use super::post_effect::{PostEffect, PostEffectKind};
use super::render_target::RenderTarget;
use super::renderer_list::{ListEntry, RendererList};

/// Color format of both ping-pong attachments
pub const POST_PROCESSING_FORMAT: TextureFormat = TextureFormat::R16G16B16A16_SFLOAT;

/// One effect in the chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessingPass {
    pub effect: PostEffect,
    pub active: bool,
}

impl ListEntry for PostProcessingPass {
    type Kind = PostEffectKind;

    fn entry_kind(&self) -> PostEffectKind {
        self.effect.kind()
    }
}

pub struct PostProcessingRenderingStage {
    target: RenderTarget,
    registry: EffectRegistry,
    passes: RendererList<PostProcessingPass>,
    not_draw: usize,
    draw: usize,
}

impl Default for PostProcessingRenderingStage {
    fn default() -> Self {
        Self::new()
    }
}

fn publish_work(
    parameters: &mut ParameterContainer,
    framebuffer: &Arc<dyn Framebuffer>,
    index: usize,
) -> Result<Arc<dyn Texture>> {
    let Some(texture) = framebuffer.color_attachment(index) else {
        engine_bail!(InvalidResource, "lumen3d::PostProcessingStage",
            "Post-processing framebuffer has no attachment {}", index);
    };
    parameters.set(&keys::WORK_TEXTURE, texture.clone())?;
    Ok(texture.clone())
}

impl PostProcessingRenderingStage {
    pub fn new() -> Self {
        Self {
            target: RenderTarget::new(
                "post_processing",
                vec![POST_PROCESSING_FORMAT, POST_PROCESSING_FORMAT],
                None,
            ),
            registry: EffectRegistry::new(),
            passes: RendererList::new(),
            not_draw: 0,
            draw: 1,
        }
    }

    // ===== CHAIN EDITING =====

    /// Append an active effect; fails if one of the same kind is present
    pub fn add_effect(&mut self, effect: PostEffect) -> Result<()> {
        self.passes.add(PostProcessingPass { effect, active: true })
    }

    pub fn remove_effect(&mut self, kind: PostEffectKind) -> Option<PostEffect> {
        self.passes.remove(kind).map(|pass| pass.effect)
    }

    /// Enable or disable an effect without changing its position
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if the chain has no effect of `kind`.
    pub fn set_active(&mut self, kind: PostEffectKind, active: bool) -> Result<()> {
        match self.passes.get_mut(kind) {
            Some(pass) => {
                pass.active = active;
                Ok(())
            }
            None => engine_bail!(InvalidArgument, "lumen3d::PostProcessingStage",
                "No {:?} effect in the post-processing chain", kind),
        }
    }

    pub fn is_active(&self, kind: PostEffectKind) -> Option<bool> {
        self.passes.get(kind).map(|pass| pass.active)
    }

    /// Replace the settings of an effect already in the chain
    pub fn update_effect(&mut self, effect: PostEffect) -> Result<()> {
        match self.passes.get_mut(effect.kind()) {
            Some(pass) => {
                pass.effect = effect;
                Ok(())
            }
            None => engine_bail!(InvalidArgument, "lumen3d::PostProcessingStage",
                "No {:?} effect in the post-processing chain", effect.kind()),
        }
    }

    pub fn passes(&self) -> &RendererList<PostProcessingPass> {
        &self.passes
    }

    // ===== STATE =====

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Attachment index currently published as the work texture
    pub fn work_attachment(&self) -> usize {
        self.not_draw
    }

    // ===== FRAME =====

    /// Run the chain on attachment 0 of `source`
    ///
    /// Returns the final work texture, also published under `WORK_TEXTURE`.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        parameters: &mut ParameterContainer,
        source: &Arc<dyn Framebuffer>,
        width: u32,
        height: u32,
    ) -> Result<Arc<dyn Texture>> {
        self.target.ensure(device, width, height, 1)?;
        let framebuffer = self.target.framebuffer()?.clone();

        self.not_draw = 0;
        self.draw = 1;
        device.resolve_framebuffer(source, 0, &framebuffer, self.not_draw)?;
        let mut work = publish_work(parameters, &framebuffer, self.not_draw)?;

        for pass in self.passes.iter() {
            if !pass.active {
                continue;
            }
            let program = self.registry.effect_program(device, &pass.effect)?;
            let uniforms = pass.effect.uniforms(parameters, width, height)?;
            let input = parameters.require(&keys::WORK_TEXTURE)?.clone();

            device.bind_framebuffer(Some(&framebuffer), AttachmentMask::single(self.draw))?;
            device.set_viewport(width, height);
            device.draw_fullscreen(&program, &[input], &uniforms)?;

            std::mem::swap(&mut self.not_draw, &mut self.draw);
            work = publish_work(parameters, &framebuffer, self.not_draw)?;
            crate::engine_trace!("lumen3d::PostProcessingStage",
                "{} wrote attachment {}", pass.effect.label(), self.not_draw);
        }
        Ok(work)
    }

    /// Destroy the ping-pong framebuffer and every compiled program
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.registry.release(device);
        self.target.release(device);
    }
}

#[cfg(test)]
#[path = "post_processing_stage_tests.rs"]
mod tests;
