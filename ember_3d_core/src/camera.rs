//! Camera / view state
//!
//! View and projection matrices for the render core. The projection helper
//! applies the Vulkan clip-space Y flip so callers can think in the usual
//! right-handed, Y-up world space.

use glam::{Mat4, Vec3};

/// View/projection state owned by a render core instance
#[derive(Debug, Clone)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Identity view and projection
    pub fn new() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    /// Set the view matrix directly
    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view = view;
    }

    /// Set the projection matrix directly (no Y flip is applied)
    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Place the camera at `eye` looking at `target`
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.view = Mat4::look_at_rh(eye, target, up);
    }

    /// Perspective projection with the Vulkan Y flip applied.
    ///
    /// # Arguments
    ///
    /// * `fov_y_degrees` - Vertical field of view in degrees
    /// * `aspect` - Width / height of the target surface
    /// * `near` / `far` - Clip plane distances
    pub fn set_perspective(&mut self, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) {
        let mut projection =
            Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far);
        // Vulkan clip space has Y pointing down
        projection.y_axis.y *= -1.0;
        self.projection = projection;
    }

    /// Current view matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Current projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
