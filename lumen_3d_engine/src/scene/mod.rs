//! Scene values
//!
//! Passive data published into the scene-level parameter store and read by
//! the rendering pipeline each frame.

mod camera;
mod light;

pub use camera::Camera;
pub use light::DirectionalLight;
