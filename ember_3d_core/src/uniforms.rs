//! Per-draw uniform block
//!
//! Layout of the uniform data written once per draw into the frame's
//! uniform ring. `#[repr(C)]` and `Pod` so the whole struct can be copied
//! into mapped GPU memory with `bytemuck`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Model/view/projection plus a per-object color, as read by the shaders
/// at binding 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniforms {
    /// Object-to-world transform
    pub model: Mat4,

    /// World-to-view transform
    pub view: Mat4,

    /// View-to-clip transform (Y already flipped for Vulkan)
    pub projection: Mat4,

    /// Per-object color multiplier
    pub color: Vec4,
}

impl ObjectUniforms {
    /// Byte size of one uniform block
    pub const SIZE: u64 = std::mem::size_of::<ObjectUniforms>() as u64;

    /// Ring stride for one draw: [`SIZE`](Self::SIZE) rounded up to the
    /// device's `min_uniform_buffer_offset_alignment` so each slot is a
    /// legal dynamic offset.
    pub fn aligned_stride(min_alignment: u64) -> u64 {
        if min_alignment == 0 {
            return Self::SIZE;
        }
        Self::SIZE.div_ceil(min_alignment) * min_alignment
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "uniforms_tests.rs"]
mod tests;
