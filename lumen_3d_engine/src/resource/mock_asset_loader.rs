/// Scripted AssetLoader for unit tests
///
/// Serves assets registered with `with_*` and counts every call per path.
/// Unknown paths fail with `Error::LoadError`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::graphics_device::TextureFormat;
use super::{AssetLoader, ImageData, MeshData};

#[derive(Default)]
pub struct MockAssetLoader {
    images: Mutex<FxHashMap<PathBuf, ImageData>>,
    meshes: Mutex<FxHashMap<PathBuf, MeshData>>,
    texts: Mutex<FxHashMap<PathBuf, String>>,
    calls: Mutex<FxHashMap<PathBuf, usize>>,
}

impl MockAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an RGBA8 image of the given size
    pub fn with_image(self, path: &str, width: u32, height: u32) -> Self {
        self.images.lock().unwrap().insert(PathBuf::from(path), ImageData {
            width,
            height,
            format: TextureFormat::R8G8B8A8_UNORM,
            pixels: vec![0xAB; (width * height * 4) as usize],
        });
        self
    }

    pub fn with_raw_image(self, path: &str, image: ImageData) -> Self {
        self.images.lock().unwrap().insert(PathBuf::from(path), image);
        self
    }

    /// Register a triangle (3 vertices, position only)
    pub fn with_triangle(self, path: &str) -> Self {
        self.meshes.lock().unwrap().insert(PathBuf::from(path), MeshData {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vertex_stride: 3,
            indices: vec![0, 1, 2],
        });
        self
    }

    pub fn with_text(self, path: &str, text: &str) -> Self {
        self.texts.lock().unwrap().insert(PathBuf::from(path), text.to_string());
        self
    }

    /// Make `path` unavailable from now on
    pub fn remove(&self, path: &str) {
        let path = PathBuf::from(path);
        self.images.lock().unwrap().remove(&path);
        self.meshes.lock().unwrap().remove(&path);
        self.texts.lock().unwrap().remove(&path);
    }

    /// Number of load calls made for `path`
    pub fn call_count(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(Path::new(path)).copied().unwrap_or(0)
    }

    /// Number of load calls made for every path
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn record(&self, path: &Path) {
        *self.calls.lock().unwrap().entry(path.to_path_buf()).or_insert(0) += 1;
    }
}

impl AssetLoader for MockAssetLoader {
    fn load_image(&self, path: &Path) -> Result<ImageData> {
        self.record(path);
        self.images.lock().unwrap().get(path).cloned()
            .ok_or_else(|| Error::load(path, "file not found"))
    }

    fn load_mesh(&self, path: &Path) -> Result<MeshData> {
        self.record(path);
        self.meshes.lock().unwrap().get(path).cloned()
            .ok_or_else(|| Error::load(path, "file not found"))
    }

    fn load_text(&self, path: &Path) -> Result<String> {
        self.record(path);
        self.texts.lock().unwrap().get(path).cloned()
            .ok_or_else(|| Error::load(path, "file not found"))
    }
}
