/// Texture trait, texture descriptor, and texture info

use bitflags::bitflags;

/// Texture pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    R16G16B16A16_SFLOAT,
    R32G32B32A32_SFLOAT,
    D24_UNORM_S8_UINT,
    D32_FLOAT,
}

impl TextureFormat {
    /// Size of one pixel in bytes
    pub fn bytes_per_pixel(&self) -> u64 {
        match self {
            TextureFormat::R8G8B8A8_UNORM => 4,
            TextureFormat::R8G8B8A8_SRGB => 4,
            TextureFormat::R16G16B16A16_SFLOAT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
            TextureFormat::D24_UNORM_S8_UINT => 4,
            TextureFormat::D32_FLOAT => 4,
        }
    }

    /// Returns true for depth/stencil formats
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT)
    }
}

bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be sampled in shaders
        const SAMPLED = 1 << 0;
        /// Texture can be used as a color render target
        const RENDER_TARGET = 1 << 1;
        /// Texture can be used as depth/stencil attachment
        const DEPTH_STENCIL = 1 << 2;
    }
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    /// Single 2D image
    Tex2D,
    /// Six square faces (+X, -X, +Y, -Y, +Z, -Z)
    Cubemap,
}

impl TextureType {
    /// Number of image layers backing this type
    pub fn layer_count(&self) -> u32 {
        match self {
            TextureType::Tex2D => 1,
            TextureType::Cubemap => 6,
        }
    }
}

/// Data to upload to a texture at creation time
#[derive(Debug, Clone)]
pub enum TextureData {
    /// Single image data (2D textures)
    Single(Vec<u8>),
    /// One image per cubemap face, in face order
    Faces(Vec<Vec<u8>>),
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// 2D or cubemap
    pub texture_type: TextureType,
    /// Multisample count (1 = no multisampling)
    pub samples: u32,
    /// Optional initial data to upload at creation time
    pub data: Option<TextureData>,
}

impl TextureDesc {
    /// Device memory the texture will occupy
    pub fn byte_size(&self) -> u64 {
        texture_byte_size(self.width, self.height, self.format, self.texture_type, self.samples)
    }
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// 2D or cubemap
    pub texture_type: TextureType,
    /// Multisample count
    pub samples: u32,
}

impl TextureInfo {
    /// Device memory occupied by the texture
    pub fn byte_size(&self) -> u64 {
        texture_byte_size(self.width, self.height, self.format, self.texture_type, self.samples)
    }
}

impl From<&TextureDesc> for TextureInfo {
    fn from(desc: &TextureDesc) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            usage: desc.usage,
            texture_type: desc.texture_type,
            samples: desc.samples,
        }
    }
}

fn texture_byte_size(
    width: u32,
    height: u32,
    format: TextureFormat,
    texture_type: TextureType,
    samples: u32,
) -> u64 {
    width as u64
        * height as u64
        * format.bytes_per_pixel()
        * texture_type.layer_count() as u64
        * samples.max(1) as u64
}

// ===== TEXTURE TRAIT =====

/// Device texture handle
///
/// Implemented by the device binding layer. The handle value is unique
/// for the lifetime of the device.
pub trait Texture: Send + Sync {
    /// Device-assigned handle
    fn handle(&self) -> u64;

    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}
