/*!
# Ember3D Core

Platform-agnostic types and logic for the Ember3D render core.

This crate holds everything the render core needs that does not touch a GPU
API: typed resource handles and the generational pool behind every resource
type, vertex-format layout tables, mesh data, camera state, the frame pacer,
the swapchain lifecycle state machine, configuration, error types and the
logging system. The Vulkan implementation lives in
`ember_3d_core_renderer_vulkan` and builds directly on these types.

## Architecture

- **Handle / ResourcePool**: index+generation handles with an invalid
  sentinel; stale handles fail validation instead of aliasing a reused slot
- **FramePacer**: CPU-side bookkeeping for N frames in flight
- **SurfaceLifecycle**: the swapchain resize/recreation state machine
- **Camera / ObjectUniforms**: view/projection state and the per-draw
  uniform block layout
*/

// Internal modules
mod config;
mod error;
pub mod log;

pub mod buffer;
pub mod camera;
pub mod frame;
pub mod handle;
pub mod mesh;
pub mod pipeline;
pub mod pool;
pub mod surface;
pub mod uniforms;
pub mod vertex;

// Main ember3d namespace module
pub mod ember3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::CoreConfig;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: core_* macros are exported at the crate root, not here
    }

    // Resource sub-module: handles and pools
    pub mod resource {
        pub use crate::handle::Handle;
        pub use crate::pool::ResourcePool;
    }

    // Render sub-module: formats, meshes, camera, pacing
    pub mod render {
        pub use crate::buffer::BufferUsage;
        pub use crate::camera::Camera;
        pub use crate::frame::{FramePacer, FRAMES_IN_FLIGHT};
        pub use crate::mesh::{MeshData, cube_mesh};
        pub use crate::pipeline::{CullMode, PipelineDesc, PolygonMode, PrimitiveTopology};
        pub use crate::surface::{SurfaceLifecycle, SurfacePhase};
        pub use crate::uniforms::ObjectUniforms;
        pub use crate::vertex::{VertexAttribute, VertexFormat};
    }
}

// Re-export math library at crate root
pub use glam;
