/// GpuContext - Shared GPU resources for all Vulkan objects
///
/// Contains everything a pooled resource needs to release itself:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queues for command submission
/// - Descriptor pool for per-texture descriptor sets

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

/// Shared GPU context for all Vulkan resources.
///
/// This struct is shared (via `Arc`) by all GPU resources (textures,
/// buffers, the uniform ring) so each resource's `Drop` can free its
/// native objects without duplicating device/allocator references.
///
/// Note: device and instance destruction is handled by `RenderCore::drop()`
/// to keep teardown ordering in one place.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator (shared, requires mutex for &self access)
    /// Wrapped in ManuallyDrop so it can be dropped BEFORE the device is
    /// destroyed
    pub allocator: ManuallyDrop<Arc<Mutex<Allocator>>>,

    /// Graphics queue for command submission
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Present queue (may be the same as the graphics queue)
    pub present_queue: vk::Queue,

    /// Descriptor pool for per-texture descriptor sets
    /// (created with FREE_DESCRIPTOR_SET so texture destruction can return
    /// its set)
    pub descriptor_pool: Mutex<vk::DescriptorPool>,

    /// Vulkan instance (kept for reference, destroyed by RenderCore)
    #[allow(dead_code)]
    pub(crate) instance: ash::Instance,
}

impl GpuContext {
    /// Create a new GPU context
    pub fn new(
        device: ash::Device,
        allocator: Arc<Mutex<Allocator>>,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
        present_queue: vk::Queue,
        descriptor_pool: vk::DescriptorPool,
        instance: ash::Instance,
    ) -> Self {
        Self {
            device,
            allocator: ManuallyDrop::new(allocator),
            graphics_queue,
            graphics_queue_family,
            present_queue,
            descriptor_pool: Mutex::new(descriptor_pool),
            instance,
        }
    }

    /// Free a descriptor set back to the shared pool.
    ///
    /// Called from resource `Drop` impls; must only run while the device
    /// is alive (guaranteed by RenderCore's teardown order).
    pub(crate) fn free_descriptor_set(&self, set: vk::DescriptorSet) {
        if set == vk::DescriptorSet::null() {
            return;
        }
        if let Ok(pool) = self.descriptor_pool.lock() {
            if *pool != vk::DescriptorPool::null() {
                unsafe {
                    self.device.free_descriptor_sets(*pool, &[set]).ok();
                }
            }
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        // NOTE: device, instance, allocator and descriptor pool destruction
        // is handled by RenderCore::drop() to keep ordering in one place.
        // This Drop impl intentionally does nothing.
    }
}
