//! Pipeline description
//!
//! Fixed-function state plus shader paths handed to the pipeline manager.
//! Shader bytecode is read fresh from the given paths on every creation
//! call; there is no shader cache.

use std::path::PathBuf;
use crate::vertex::VertexFormat;

/// Primitive assembly topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    TriangleList,
    TriangleStrip,
}

/// Rasterizer fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Everything needed to build a graphics pipeline
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    /// Path to the compiled vertex shader (SPIR-V)
    pub vertex_shader: PathBuf,

    /// Path to the compiled fragment shader (SPIR-V)
    pub fragment_shader: PathBuf,

    /// Vertex layout the pipeline consumes
    pub vertex_format: VertexFormat,

    pub topology: PrimitiveTopology,
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,

    pub depth_test: bool,
    pub depth_write: bool,
    pub alpha_blend: bool,
}

impl Default for PipelineDesc {
    fn default() -> Self {
        Self {
            vertex_shader: PathBuf::new(),
            fragment_shader: PathBuf::new(),
            vertex_format: VertexFormat::PositionColor,
            topology: PrimitiveTopology::TriangleList,
            polygon_mode: PolygonMode::Fill,
            cull_mode: CullMode::Back,
            depth_test: true,
            depth_write: true,
            alpha_blend: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_standard_opaque_state() {
        let desc = PipelineDesc::default();
        assert_eq!(desc.vertex_format, VertexFormat::PositionColor);
        assert_eq!(desc.topology, PrimitiveTopology::TriangleList);
        assert_eq!(desc.cull_mode, CullMode::Back);
        assert!(desc.depth_test);
        assert!(desc.depth_write);
        assert!(!desc.alpha_blend);
    }

    #[test]
    fn test_default_shader_paths_are_empty() {
        // An unconfigured desc must fail pipeline creation, not silently
        // pick some shader.
        let desc = PipelineDesc::default();
        assert_eq!(desc.vertex_shader, PathBuf::new());
        assert_eq!(desc.fragment_shader, PathBuf::new());
    }
}
