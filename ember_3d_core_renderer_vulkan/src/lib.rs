/*!
# Ember3D Render Core - Vulkan Backend

Vulkan implementation of the Ember3D render core.

This crate provides the device-facing half of the render core using the Ash
library for Vulkan bindings and gpu-allocator for memory management: the
handle-indexed resource managers (buffers, textures, meshes, pipelines), the
swapchain lifecycle manager, the frame pacing and synchronization
coordinator, and the command recording / draw dispatch API consumed by game
and editor code.

Everything hangs off an explicit [`RenderCore`] instance owned by the
caller; a second device/window context is just a second `RenderCore`.
*/

// Vulkan implementation modules
mod vulkan_buffer;
mod vulkan_context;
mod vulkan_core;
mod vulkan_frame;
mod vulkan_pipeline;
mod vulkan_sampler;
mod vulkan_shader;
mod vulkan_swapchain;
mod vulkan_texture;
mod vulkan_transfer;

#[cfg(feature = "vulkan-validation")]
mod vulkan_debug;

pub use vulkan_buffer::Buffer;
pub use vulkan_core::RenderCore;
pub use vulkan_pipeline::Pipeline;
pub use vulkan_texture::Texture;
pub use vulkan_core::Mesh;

// Main ember3d namespace module, mirroring the core crate
pub mod ember3d {
    pub use crate::vulkan_core::{Mesh, RenderCore};
    pub use crate::vulkan_buffer::Buffer;
    pub use crate::vulkan_pipeline::Pipeline;
    pub use crate::vulkan_texture::Texture;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod format_tests;
