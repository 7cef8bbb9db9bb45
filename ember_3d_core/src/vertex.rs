//! Vertex formats
//!
//! The render core supports a closed set of interleaved vertex layouts.
//! Each format fixes the binding stride and per-attribute byte offsets;
//! the Vulkan backend maps these tables to
//! `vk::VertexInputBindingDescription`/`vk::VertexInputAttributeDescription`.

/// Supported interleaved vertex layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// vec3 position, vec3 color (primitives, debug geometry)
    PositionColor,

    /// vec3 position, vec3 normal, vec2 uv (standard meshes)
    PositionNormalUv,

    /// vec3 position, vec3 normal, vec2 uv, vec3 color
    PositionNormalUvColor,

    /// vec3 position, vec3 normal, vec2 uv0, vec2 uv1 (second UV channel
    /// for displacement-map sampling)
    PositionNormalUv0Uv1,
}

/// One attribute within an interleaved vertex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location
    pub location: u32,

    /// Number of f32 components (2 or 3)
    pub components: u32,

    /// Byte offset from the start of the vertex
    pub offset: u32,
}

impl VertexFormat {
    /// Number of f32 values per vertex
    pub fn floats_per_vertex(&self) -> u32 {
        match self {
            VertexFormat::PositionColor => 6,
            VertexFormat::PositionNormalUv => 8,
            VertexFormat::PositionNormalUvColor => 11,
            VertexFormat::PositionNormalUv0Uv1 => 10,
        }
    }

    /// Binding stride in bytes
    pub fn stride(&self) -> u32 {
        self.floats_per_vertex() * std::mem::size_of::<f32>() as u32
    }

    /// Per-attribute layout table for this format
    pub fn attributes(&self) -> Vec<VertexAttribute> {
        const F: u32 = std::mem::size_of::<f32>() as u32;
        match self {
            VertexFormat::PositionColor => vec![
                VertexAttribute { location: 0, components: 3, offset: 0 },     // position
                VertexAttribute { location: 1, components: 3, offset: 3 * F }, // color
            ],
            VertexFormat::PositionNormalUv => vec![
                VertexAttribute { location: 0, components: 3, offset: 0 },     // position
                VertexAttribute { location: 1, components: 3, offset: 3 * F }, // normal
                VertexAttribute { location: 2, components: 2, offset: 6 * F }, // uv
            ],
            VertexFormat::PositionNormalUvColor => vec![
                VertexAttribute { location: 0, components: 3, offset: 0 },     // position
                VertexAttribute { location: 1, components: 3, offset: 3 * F }, // normal
                VertexAttribute { location: 2, components: 2, offset: 6 * F }, // uv
                VertexAttribute { location: 3, components: 3, offset: 8 * F }, // color
            ],
            VertexFormat::PositionNormalUv0Uv1 => vec![
                VertexAttribute { location: 0, components: 3, offset: 0 },     // position
                VertexAttribute { location: 1, components: 3, offset: 3 * F }, // normal
                VertexAttribute { location: 2, components: 2, offset: 6 * F }, // uv0
                VertexAttribute { location: 3, components: 2, offset: 8 * F }, // uv1
            ],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "vertex_tests.rs"]
mod tests;
