//! Buffer usage flags

use bitflags::bitflags;

bitflags! {
    /// How a buffer will be used; maps onto `vk::BufferUsageFlags` in the
    /// Vulkan backend.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BufferUsage: u32 {
        /// Bindable as a vertex buffer
        const VERTEX = 1 << 0;
        /// Bindable as an index buffer
        const INDEX = 1 << 1;
        /// Bindable as a uniform buffer
        const UNIFORM = 1 << 2;
        /// Source of a transfer (staging)
        const TRANSFER_SRC = 1 << 3;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_compose() {
        let usage = BufferUsage::VERTEX | BufferUsage::TRANSFER_SRC;
        assert!(usage.contains(BufferUsage::VERTEX));
        assert!(!usage.contains(BufferUsage::INDEX));
    }

    #[test]
    fn test_flags_are_distinct_bits() {
        assert_eq!(
            (BufferUsage::VERTEX | BufferUsage::INDEX | BufferUsage::UNIFORM
                | BufferUsage::TRANSFER_SRC)
                .bits()
                .count_ones(),
            4
        );
    }
}
