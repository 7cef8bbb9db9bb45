use super::*;
use glam::{Mat4, Vec3, Vec4};

// ============================================================================
// Construction tests
// ============================================================================

#[test]
fn test_new_camera_is_identity() {
    let camera = Camera::new();
    assert_eq!(camera.view_matrix(), Mat4::IDENTITY);
    assert_eq!(camera.projection_matrix(), Mat4::IDENTITY);
}

#[test]
fn test_direct_matrix_setters() {
    let mut camera = Camera::new();
    let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    camera.set_view_matrix(m);
    camera.set_projection_matrix(m);
    assert_eq!(camera.view_matrix(), m);
    assert_eq!(camera.projection_matrix(), m);
}

// ============================================================================
// look_at tests
// ============================================================================

#[test]
fn test_look_at_moves_eye_to_origin() {
    let mut camera = Camera::new();
    let eye = Vec3::new(0.0, 0.0, 5.0);
    camera.look_at(eye, Vec3::ZERO, Vec3::Y);

    // The eye position maps to the view-space origin
    let transformed = camera.view_matrix() * Vec4::new(eye.x, eye.y, eye.z, 1.0);
    assert!(transformed.truncate().length() < 1e-5);
}

#[test]
fn test_look_at_target_lands_on_negative_z() {
    let mut camera = Camera::new();
    camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);

    // The target sits in front of the camera (right-handed: -Z forward)
    let target = camera.view_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert!(target.z < 0.0);
}

// ============================================================================
// Perspective tests
// ============================================================================

#[test]
fn test_perspective_flips_y() {
    let mut camera = Camera::new();
    camera.set_perspective(60.0, 16.0 / 9.0, 0.1, 100.0);

    // Against a plain right-handed perspective matrix, only Y is negated
    let plain = Mat4::perspective_rh(60.0_f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    let flipped = camera.projection_matrix();
    assert!((flipped.y_axis.y + plain.y_axis.y).abs() < 1e-6);
    assert!((flipped.x_axis.x - plain.x_axis.x).abs() < 1e-6);
}

#[test]
fn test_perspective_projects_point_above_center_downward() {
    let mut camera = Camera::new();
    camera.set_perspective(90.0, 1.0, 0.1, 100.0);

    // World-space "up" ends up with positive clip Y in GL conventions;
    // after the Vulkan flip it must be negative.
    let p = camera.projection_matrix() * Vec4::new(0.0, 1.0, -2.0, 1.0);
    assert!(p.y / p.w < 0.0);
}
