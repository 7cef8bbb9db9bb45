//! Mesh data
//!
//! CPU-side mesh description handed to the mesh manager: interleaved
//! vertex floats plus a `u32` index list in one of the closed
//! [`VertexFormat`] layouts.

use glam::Vec3;
use crate::vertex::VertexFormat;

/// Interleaved CPU-side mesh data
#[derive(Debug, Clone)]
pub struct MeshData {
    /// Interleaved vertex values, `format.floats_per_vertex()` per vertex
    pub vertices: Vec<f32>,

    /// Triangle-list indices into the vertex array
    pub indices: Vec<u32>,

    /// Layout of `vertices`
    pub format: VertexFormat,
}

impl MeshData {
    /// Number of vertices described by `vertices`
    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() as u32) / self.format.floats_per_vertex()
    }

    /// Number of indices
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Structural validity: vertex data is a whole number of vertices and
    /// every index points at one of them.
    pub fn is_well_formed(&self) -> bool {
        let floats = self.format.floats_per_vertex() as usize;
        if floats == 0 || self.vertices.len() % floats != 0 {
            return false;
        }
        let vertex_count = (self.vertices.len() / floats) as u32;
        self.indices.iter().all(|&i| i < vertex_count)
    }
}

/// Build an axis-aligned cube of edge length `size`, centered at the
/// origin, in [`VertexFormat::PositionColor`] layout.
///
/// 24 vertices (4 per face, so faces stay flat-shaded when a normal-less
/// color pipeline is used) and 36 indices.
pub fn cube_mesh(size: f32, color: Vec3) -> MeshData {
    let h = size * 0.5;

    // Four corners per face, counter-clockwise seen from outside.
    let faces: [[[f32; 3]; 4]; 6] = [
        // +Z (front)
        [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        // -Z (back)
        [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
        // +X (right)
        [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]],
        // -X (left)
        [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
        // +Y (top)
        [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]],
        // -Y (bottom)
        [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
    ];

    let mut vertices = Vec::with_capacity(24 * 6);
    let mut indices = Vec::with_capacity(36);

    for (face_index, corners) in faces.iter().enumerate() {
        for corner in corners {
            vertices.extend_from_slice(corner);
            vertices.extend_from_slice(&[color.x, color.y, color.z]);
        }
        let base = (face_index * 4) as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    MeshData {
        vertices,
        indices,
        format: VertexFormat::PositionColor,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
