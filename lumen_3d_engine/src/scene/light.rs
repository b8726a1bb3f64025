/// Directional light published as the main directional light parameter

use glam::Vec3;
use crate::error::Result;
use crate::engine_bail;

/// Infinitely distant light with parallel rays
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    direction: Vec3,
    color: Vec3,
    intensity: f32,
}

impl DirectionalLight {
    /// Create a light shining along `direction` (normalized on creation)
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `direction` has no length or `intensity` is negative.
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Result<Self> {
        let Some(direction) = direction.try_normalize() else {
            engine_bail!(InvalidArgument, "lumen3d::DirectionalLight",
                "Light direction must be non-zero, got {:?}", direction);
        };
        if !intensity.is_finite() || intensity < 0.0 {
            engine_bail!(InvalidArgument, "lumen3d::DirectionalLight",
                "Light intensity must be >= 0, got {}", intensity);
        }
        Ok(Self { direction, color, intensity })
    }

    /// Unit direction the light travels in
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Color scaled by intensity
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
