/// Framebuffer trait - groups render target attachments
///
/// A framebuffer owns its color and depth attachments. It is created once
/// and reused each frame, and recreated only when its size or sample count
/// changes.

use std::sync::Arc;
use bitflags::bitflags;
use crate::graphics_device::{Texture, TextureFormat};

bitflags! {
    /// Set of color attachments enabled for drawing while a framebuffer is bound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttachmentMask: u32 {
        const ATTACHMENT_0 = 1 << 0;
        const ATTACHMENT_1 = 1 << 1;
        const ATTACHMENT_2 = 1 << 2;
        const ATTACHMENT_3 = 1 << 3;
    }
}

impl AttachmentMask {
    /// Mask with a single attachment enabled
    pub fn single(index: usize) -> Self {
        Self::from_bits_truncate(1u32 << index)
    }

    /// Indices of the enabled attachments, ascending
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        let bits = self.bits();
        (0..4usize).filter(move |&i| bits & (1u32 << i) != 0)
    }
}

/// Descriptor for creating a framebuffer
#[derive(Debug, Clone)]
pub struct FramebufferDesc {
    /// Debug label
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Multisample count (1 = no multisampling)
    pub samples: u32,
    /// One color attachment per format, in attachment order
    pub color_formats: Vec<TextureFormat>,
    /// Optional depth/stencil attachment
    pub depth_format: Option<TextureFormat>,
}

/// Framebuffer: color and depth/stencil attachments rendered together
pub trait Framebuffer: Send + Sync {
    /// Device-assigned handle
    fn handle(&self) -> u64;

    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Multisample count
    fn samples(&self) -> u32;

    /// Number of color attachments
    fn color_attachment_count(&self) -> usize;

    /// Color attachment by index
    fn color_attachment(&self, index: usize) -> Option<&Arc<dyn Texture>>;

    /// Depth/stencil attachment, if any
    fn depth_attachment(&self) -> Option<&Arc<dyn Texture>>;

    /// Device memory used by all attachments
    fn byte_size(&self) -> u64 {
        let colors: u64 = (0..self.color_attachment_count())
            .filter_map(|i| self.color_attachment(i))
            .map(|t| t.info().byte_size())
            .sum();
        colors + self.depth_attachment().map_or(0, |t| t.info().byte_size())
    }
}
