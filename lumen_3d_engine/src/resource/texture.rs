/// Texture resources.
///
/// - **StaticTexture**: loaded from one image (2D) or six images (cubemap)
/// - **DynamicTexture**: a render target with no disk tier, recreated on
///   demand when its requested size or format changes

use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    GraphicsDevice, Texture, TextureData, TextureDesc, TextureFormat,
    TextureType, TextureUsage,
};
use crate::invalidation::InvalidatableContainer;
use super::{
    AssetLoader, ImageData, MemoryFootprint, Resource, ResourceId,
    ResourceKind, StaticAsset, StaticResource,
};

/// Number of faces of a cubemap
pub const CUBEMAP_FACE_COUNT: usize = 6;

// ===== STATIC TEXTURE =====

/// Decoded texture held in host memory
#[derive(Debug, Clone)]
pub struct TextureHostData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub texture_type: TextureType,
    pub data: TextureData,
}

impl TextureHostData {
    pub fn byte_size(&self) -> u64 {
        match &self.data {
            TextureData::Single(pixels) => pixels.len() as u64,
            TextureData::Faces(faces) => faces.iter().map(|f| f.len() as u64).sum(),
        }
    }
}

/// Texture variant of `StaticResource`
pub struct TextureAsset;

pub type StaticTexture = StaticResource<TextureAsset>;

fn check_pixels(path: &Path, image: &ImageData) -> Result<()> {
    if image.pixels.len() != image.expected_len() {
        engine_bail!(ResourceIntegrity, "lumen3d::TextureAsset",
            "'{}' holds {} bytes, expected {} for {}x{} {:?}",
            path.display(), image.pixels.len(), image.expected_len(),
            image.width, image.height, image.format);
    }
    Ok(())
}

fn load_cubemap(paths: &[PathBuf], loader: &dyn AssetLoader) -> Result<TextureHostData> {
    let mut faces = Vec::with_capacity(CUBEMAP_FACE_COUNT);
    for path in paths {
        let image = loader.load_image(path)?;
        check_pixels(path, &image)?;
        faces.push(image);
    }

    let first = &faces[0];
    if first.width != first.height {
        engine_bail!(ResourceIntegrity, "lumen3d::TextureAsset",
            "Cubemap face '{}' is not square ({}x{})",
            paths[0].display(), first.width, first.height);
    }
    for (path, face) in paths.iter().zip(&faces).skip(1) {
        if (face.width, face.height, face.format) != (first.width, first.height, first.format) {
            engine_bail!(ResourceIntegrity, "lumen3d::TextureAsset",
                "Cubemap face '{}' is {}x{} {:?}, expected {}x{} {:?}",
                path.display(), face.width, face.height, face.format,
                first.width, first.height, first.format);
        }
    }

    let (width, height, format) = (first.width, first.height, first.format);
    Ok(TextureHostData {
        width,
        height,
        format,
        texture_type: TextureType::Cubemap,
        data: TextureData::Faces(faces.into_iter().map(|f| f.pixels).collect()),
    })
}

impl StaticAsset for TextureAsset {
    type HostData = TextureHostData;
    type DeviceData = Arc<dyn Texture>;

    const KIND: ResourceKind = ResourceKind::Texture;
    const NAME: &'static str = "Texture";

    fn load(paths: &[PathBuf], loader: &dyn AssetLoader) -> Result<TextureHostData> {
        match paths.len() {
            1 => {
                let image = loader.load_image(&paths[0])?;
                check_pixels(&paths[0], &image)?;
                Ok(TextureHostData {
                    width: image.width,
                    height: image.height,
                    format: image.format,
                    texture_type: TextureType::Tex2D,
                    data: TextureData::Single(image.pixels),
                })
            }
            CUBEMAP_FACE_COUNT => load_cubemap(paths, loader),
            n => engine_bail!(InvalidArgument, "lumen3d::TextureAsset",
                "A texture needs 1 (2D) or {} (cubemap) source images, got {}",
                CUBEMAP_FACE_COUNT, n),
        }
    }

    fn upload(host: &TextureHostData, device: &mut dyn GraphicsDevice) -> Result<Arc<dyn Texture>> {
        device.create_texture(TextureDesc {
            width: host.width,
            height: host.height,
            format: host.format,
            usage: TextureUsage::SAMPLED,
            texture_type: host.texture_type,
            samples: 1,
            data: Some(host.data.clone()),
        })
    }

    fn destroy(texture: Arc<dyn Texture>, device: &mut dyn GraphicsDevice) {
        device.destroy_texture(&texture);
    }

    fn host_size(host: &TextureHostData) -> u64 {
        host.byte_size()
    }

    fn device_size(texture: &Arc<dyn Texture>) -> u64 {
        texture.info().byte_size()
    }
}

// ===== DYNAMIC TEXTURE =====

/// Render target texture with resize-on-demand
///
/// Dependents registered on `invalidation()` are notified every time the
/// backing texture is reallocated.
pub struct DynamicTexture {
    id: ResourceId,
    label: String,
    usage: TextureUsage,
    texture: Option<Arc<dyn Texture>>,
    released: bool,
    invalidation: InvalidatableContainer,
}

impl DynamicTexture {
    pub fn new(label: &str) -> Self {
        Self {
            id: ResourceId::synthetic(),
            label: label.to_string(),
            usage: TextureUsage::RENDER_TARGET | TextureUsage::SAMPLED,
            texture: None,
            released: false,
            invalidation: InvalidatableContainer::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn invalidation(&self) -> &InvalidatableContainer {
        &self.invalidation
    }

    /// Make the backing texture match the requested size and format
    ///
    /// Returns true if the texture was (re)allocated. A matching request
    /// performs no device call.
    ///
    /// # Errors
    ///
    /// - `Error::UseAfterRelease` after `release`
    /// - `Error::ConfigurationError` for a zero-sized request
    pub fn ensure(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<bool> {
        if self.released {
            engine_bail!(UseAfterRelease, "lumen3d::DynamicTexture",
                "Render texture '{}' was released", self.label);
        }
        if width == 0 || height == 0 {
            engine_bail!(ConfigurationError, "lumen3d::DynamicTexture",
                "Render texture '{}' cannot be {}x{}", self.label, width, height);
        }

        if let Some(texture) = &self.texture {
            let info = texture.info();
            if (info.width, info.height, info.format) == (width, height, format) {
                return Ok(false);
            }
        }

        if let Some(old) = self.texture.take() {
            device.destroy_texture(&old);
        }
        let usage = if format.is_depth() { TextureUsage::DEPTH_STENCIL | TextureUsage::SAMPLED } else { self.usage };
        self.texture = Some(device.create_texture(TextureDesc {
            width,
            height,
            format,
            usage,
            texture_type: TextureType::Tex2D,
            samples: 1,
            data: None,
        })?);

        crate::engine_debug!("lumen3d::DynamicTexture",
            "Render texture '{}' allocated at {}x{} {:?}", self.label, width, height, format);
        self.invalidation.invalidate();
        Ok(true)
    }

    /// Backing texture
    ///
    /// # Errors
    ///
    /// - `Error::UseAfterRelease` after `release`
    /// - `Error::InvalidResource` before the first `ensure`
    pub fn texture(&self) -> Result<&Arc<dyn Texture>> {
        if self.released {
            engine_bail!(UseAfterRelease, "lumen3d::DynamicTexture",
                "Render texture '{}' was released", self.label);
        }
        match &self.texture {
            Some(texture) => Ok(texture),
            None => engine_bail!(InvalidResource, "lumen3d::DynamicTexture",
                "Render texture '{}' has not been allocated", self.label),
        }
    }
}

impl Resource for DynamicTexture {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Texture
    }

    fn is_usable(&self) -> bool {
        !self.released && self.texture.is_some()
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn memory_footprint(&self) -> MemoryFootprint {
        MemoryFootprint {
            host: 0,
            device: self.texture.as_ref().map_or(0, |t| t.info().byte_size()),
        }
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if self.released {
            return Ok(());
        }
        if let Some(texture) = self.texture.take() {
            device.destroy_texture(&texture);
        }
        self.invalidation.clear();
        self.released = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
