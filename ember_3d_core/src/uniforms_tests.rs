use super::*;
use glam::{Mat4, Vec4};

// ============================================================================
// Layout tests
// ============================================================================

#[test]
fn test_size_is_three_matrices_plus_vec4() {
    // 3 * 64 + 16
    assert_eq!(ObjectUniforms::SIZE, 208);
    assert_eq!(std::mem::size_of::<ObjectUniforms>(), 208);
}

#[test]
fn test_pod_round_trip() {
    let uniforms = ObjectUniforms {
        model: Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0)),
        view: Mat4::IDENTITY,
        projection: Mat4::IDENTITY,
        color: Vec4::new(0.5, 0.25, 0.125, 1.0),
    };

    let bytes: &[u8] = bytemuck::bytes_of(&uniforms);
    assert_eq!(bytes.len(), 208);

    let back: &ObjectUniforms = bytemuck::from_bytes(bytes);
    assert_eq!(back.color, uniforms.color);
    assert_eq!(back.model, uniforms.model);
}

// ============================================================================
// Alignment tests
// ============================================================================

#[test]
fn test_aligned_stride_typical_alignments() {
    // 208 rounds up to the next multiple of the device alignment
    assert_eq!(ObjectUniforms::aligned_stride(256), 256);
    assert_eq!(ObjectUniforms::aligned_stride(64), 256);
    assert_eq!(ObjectUniforms::aligned_stride(16), 208);
}

#[test]
fn test_aligned_stride_zero_alignment() {
    // Some drivers report 0 meaning "no requirement"
    assert_eq!(ObjectUniforms::aligned_stride(0), ObjectUniforms::SIZE);
}

#[test]
fn test_aligned_stride_is_multiple_of_alignment() {
    for alignment in [16u64, 32, 64, 128, 256] {
        let stride = ObjectUniforms::aligned_stride(alignment);
        assert_eq!(stride % alignment, 0);
        assert!(stride >= ObjectUniforms::SIZE);
    }
}
