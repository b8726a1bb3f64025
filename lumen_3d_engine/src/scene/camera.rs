/// Camera - passive view data published as the main camera parameter.
///
/// The Camera computes nothing beyond its combined matrix. The caller is
/// responsible for computing view and projection from its own transform
/// representation; the engine has no transform hierarchy.

use glam::{Mat4, Vec3};

/// Passive camera data consumed by renderers
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    position: Vec3,
}

impl Camera {
    /// Create a camera from precomputed matrices
    pub fn new(view: Mat4, projection: Mat4, position: Vec3) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            position,
        }
    }

    /// Right-handed perspective camera looking from `eye` to `target`
    pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(
            Mat4::look_at_rh(eye, target, Vec3::Y),
            Mat4::perspective_rh(fov_y, aspect, near, far),
            eye,
        )
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (perspective or orthographic).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// World-space position of the eye
    pub fn position(&self) -> Vec3 {
        self.position
    }

    // ===== SETTERS =====

    pub fn set_view(&mut self, view: Mat4, position: Vec3) {
        self.view_matrix = view;
        self.position = position;
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection_matrix = projection;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
