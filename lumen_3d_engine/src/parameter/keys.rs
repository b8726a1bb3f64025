/// Well-known parameter keys published and consumed by the rendering pipeline

use std::sync::Arc;
use crate::graphics_device::Texture;
use crate::scene::{Camera, DirectionalLight};
use super::ParameterKey;

// ===== SCENE-LEVEL =====

/// Active camera rendered by the pipeline (required every frame)
pub const MAIN_CAMERA: ParameterKey<Camera> = ParameterKey::new("main_camera");

/// Active main light (required every frame)
pub const MAIN_DIRECTIONAL_LIGHT: ParameterKey<DirectionalLight> =
    ParameterKey::new("main_directional_light");

// ===== PIPELINE-LEVEL =====

/// Display gamma (>= 1, default 2.2)
pub const GAMMA: ParameterKey<f32> = ParameterKey::new("gamma");

/// Multisample level of the main framebuffer (>= 1, default 2)
pub const MSAA_LEVEL: ParameterKey<u32> = ParameterKey::new("msaa_level");

/// Rasterize geometry as wireframe (default false)
pub const WIREFRAME: ParameterKey<bool> = ParameterKey::new("wireframe");

/// Internal render size = client size x rendering scale (> 0, default 1)
pub const RENDERING_SCALE: ParameterKey<f32> = ParameterKey::new("rendering_scale");

/// Current in-progress frame image flowing through post-processing
pub const WORK_TEXTURE: ParameterKey<Arc<dyn Texture>> = ParameterKey::new("work_texture");
