use super::*;
use glam::Vec3;

// ============================================================================
// MeshData tests
// ============================================================================

#[test]
fn test_vertex_and_index_counts() {
    let data = MeshData {
        vertices: vec![0.0; 6 * 3], // 3 PositionColor vertices
        indices: vec![0, 1, 2],
        format: VertexFormat::PositionColor,
    };
    assert_eq!(data.vertex_count(), 3);
    assert_eq!(data.index_count(), 3);
    assert!(data.is_well_formed());
}

#[test]
fn test_ragged_vertex_data_is_malformed() {
    let data = MeshData {
        vertices: vec![0.0; 7], // not a multiple of 6
        indices: vec![0],
        format: VertexFormat::PositionColor,
    };
    assert!(!data.is_well_formed());
}

#[test]
fn test_out_of_range_index_is_malformed() {
    let data = MeshData {
        vertices: vec![0.0; 6 * 3],
        indices: vec![0, 1, 3], // only vertices 0..3 exist
        format: VertexFormat::PositionColor,
    };
    assert!(!data.is_well_formed());
}

// ============================================================================
// Cube generator tests
// ============================================================================

#[test]
fn test_cube_counts() {
    let cube = cube_mesh(1.0, Vec3::ONE);
    assert_eq!(cube.format, VertexFormat::PositionColor);
    assert_eq!(cube.vertex_count(), 24);
    assert_eq!(cube.index_count(), 36);
    assert!(cube.is_well_formed());
}

#[test]
fn test_cube_extent_matches_size() {
    let cube = cube_mesh(2.0, Vec3::ONE);
    // Edge length 2.0 → every position component is ±1.0
    for vertex in cube.vertices.chunks(6) {
        for &p in &vertex[..3] {
            assert!((p.abs() - 1.0).abs() < 1e-6, "position component {}", p);
        }
    }
}

#[test]
fn test_cube_carries_color() {
    let cube = cube_mesh(1.0, Vec3::new(0.2, 0.4, 0.8));
    for vertex in cube.vertices.chunks(6) {
        assert_eq!(&vertex[3..], &[0.2, 0.4, 0.8]);
    }
}

#[test]
fn test_cube_triangles_cover_all_faces() {
    let cube = cube_mesh(1.0, Vec3::ONE);
    // Each face contributes two triangles over its own 4 vertices
    for face in 0..6u32 {
        let base = face * 4;
        let tri = &cube.indices[(face * 6) as usize..(face * 6 + 6) as usize];
        assert!(tri.iter().all(|&i| i >= base && i < base + 4));
    }
}
