/// Boundary with the asset decoding layer.
///
/// The engine never parses image, model or shader-source formats itself.
/// An `AssetLoader` turns a path into decoded bytes, or fails with
/// `Error::LoadError`.

use std::path::Path;
use crate::error::Result;
use crate::graphics_device::TextureFormat;

/// Decoded image (one mip level)
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Tightly packed rows, `width * height * bytes_per_pixel` bytes
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Byte length the pixel buffer must have
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel() as usize
    }
}

/// Decoded triangle geometry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    /// Interleaved vertex attributes
    pub vertices: Vec<f32>,
    /// Number of floats per vertex
    pub vertex_stride: u32,
    /// Optional triangle indices
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        if self.vertex_stride == 0 {
            0
        } else {
            self.vertices.len() as u32 / self.vertex_stride
        }
    }

    /// Number of elements a draw call consumes
    pub fn element_count(&self) -> u32 {
        if self.indices.is_empty() {
            self.vertex_count()
        } else {
            self.indices.len() as u32
        }
    }

    /// Host memory held by the decoded data
    pub fn byte_size(&self) -> u64 {
        (self.vertices.len() * std::mem::size_of::<f32>()
            + self.indices.len() * std::mem::size_of::<u32>()) as u64
    }
}

/// Loads raw asset data from a path
pub trait AssetLoader: Send + Sync {
    fn load_image(&self, path: &Path) -> Result<ImageData>;

    fn load_mesh(&self, path: &Path) -> Result<MeshData>;

    /// Load a text file (shader source)
    fn load_text(&self, path: &Path) -> Result<String>;
}
