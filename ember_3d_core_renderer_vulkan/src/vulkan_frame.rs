/// Frame slots and the per-frame uniform ring
///
/// One FrameSlot per frame in flight: the command buffer being recorded,
/// the semaphore the acquired image signals, and the fence bounding reuse
/// of the slot. The uniform ring is a single host-visible buffer
/// partitioned `FRAMES_IN_FLIGHT x capacity x stride`; every draw in a
/// frame writes its uniforms into its own slot and binds the matching
/// dynamic offset, so no draw's data is overwritten before the GPU reads
/// it.

use ember_3d_core::ember3d::Result;
use ember_3d_core::ember3d::render::{BufferUsage, ObjectUniforms, FRAMES_IN_FLIGHT};
use ember_3d_core::core_err;
use ash::vk;
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;

/// Per-frame synchronization and recording state
pub(crate) struct FrameSlot {
    /// Command buffer recorded for this slot's frame
    pub(crate) command_buffer: vk::CommandBuffer,
    /// Signaled when the acquired swapchain image is ready to be written
    pub(crate) image_available: vk::Semaphore,
    /// Signaled when this slot's submitted work completes; waiting on it
    /// at the top of begin_frame is the CPU-ahead-of-GPU bound
    pub(crate) in_flight_fence: vk::Fence,
}

/// Frame slot array plus the shared uniform ring
pub(crate) struct FrameCoordinator {
    ctx: Arc<GpuContext>,
    command_pool: vk::CommandPool,
    slots: Vec<FrameSlot>,
    uniform_ring: Option<Buffer>,
    ring_stride: u64,
    ring_capacity: u32,
}

impl FrameCoordinator {
    /// Create the command pool, per-slot sync objects and the uniform
    /// ring.
    ///
    /// Fences start signaled so the first `begin_frame` does not block.
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        min_uniform_alignment: u64,
        ring_capacity: u32,
    ) -> Result<Self> {
        let ring_stride = ObjectUniforms::aligned_stride(min_uniform_alignment);

        unsafe {
            let pool_create_info = vk::CommandPoolCreateInfo::default()
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
                .queue_family_index(ctx.graphics_queue_family);

            let command_pool = ctx.device.create_command_pool(&pool_create_info, None)
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to create frame command pool: {:?}", e))?;

            let mut coordinator = Self {
                ctx,
                command_pool,
                slots: Vec::with_capacity(FRAMES_IN_FLIGHT),
                uniform_ring: None,
                ring_stride,
                ring_capacity,
            };

            // Errors from here on run Drop, which tears down whatever
            // exists while the device is still alive.
            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(coordinator.command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(FRAMES_IN_FLIGHT as u32);

            let command_buffers = coordinator.ctx.device
                .allocate_command_buffers(&alloc_info)
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to allocate frame command buffers: {:?}", e))?;

            let semaphore_create_info = vk::SemaphoreCreateInfo::default();
            let fence_create_info = vk::FenceCreateInfo::default()
                .flags(vk::FenceCreateFlags::SIGNALED);

            for command_buffer in command_buffers {
                let image_available = coordinator.ctx.device
                    .create_semaphore(&semaphore_create_info, None)
                    .map_err(|e| core_err!("ember3d::vulkan", "Failed to create image-available semaphore: {:?}", e))?;

                let in_flight_fence = match coordinator.ctx.device.create_fence(&fence_create_info, None) {
                    Ok(fence) => fence,
                    Err(e) => {
                        coordinator.ctx.device.destroy_semaphore(image_available, None);
                        return Err(core_err!("ember3d::vulkan", "Failed to create in-flight fence: {:?}", e));
                    }
                };

                coordinator.slots.push(FrameSlot {
                    command_buffer,
                    image_available,
                    in_flight_fence,
                });
            }

            let ring_size = ring_stride * ring_capacity as u64 * FRAMES_IN_FLIGHT as u64;
            coordinator.uniform_ring = Some(Buffer::new(
                coordinator.ctx.clone(),
                "uniform ring",
                ring_size,
                BufferUsage::UNIFORM,
                MemoryLocation::CpuToGpu,
            )?);

            Ok(coordinator)
        }
    }

    /// Slot state for frame slot `index`
    pub(crate) fn slot(&self, index: usize) -> &FrameSlot {
        &self.slots[index]
    }

    /// Raw handle of the uniform ring buffer (bound at descriptor
    /// binding 0 of every texture's set)
    pub(crate) fn uniform_ring_raw(&self) -> vk::Buffer {
        self.uniform_ring.as_ref().map(|b| b.buffer).unwrap_or(vk::Buffer::null())
    }

    /// Range of one uniform block as seen by the descriptor
    pub(crate) fn uniform_range(&self) -> u64 {
        ObjectUniforms::SIZE
    }

    /// Draws available to one frame
    pub(crate) fn ring_capacity(&self) -> u32 {
        self.ring_capacity
    }

    /// Dynamic offset for draw `draw_index` of frame slot `slot`
    pub(crate) fn dynamic_offset(&self, slot: usize, draw_index: u32) -> u32 {
        (self.ring_stride * (slot as u64 * self.ring_capacity as u64 + draw_index as u64)) as u32
    }

    /// Write one draw's uniforms into its ring slot
    pub(crate) fn write_uniforms(
        &self,
        slot: usize,
        draw_index: u32,
        uniforms: &ObjectUniforms,
    ) -> Result<()> {
        let ring = self.uniform_ring.as_ref()
            .ok_or_else(|| core_err!("ember3d::vulkan", "Uniform ring used after shutdown"))?;
        let offset = self.dynamic_offset(slot, draw_index) as u64;
        ring.update(offset, bytemuck::bytes_of(uniforms))
    }

    /// Destroy sync objects, the command pool and the ring buffer.
    /// Must run while the device is alive.
    pub(crate) fn shutdown(&mut self) {
        unsafe {
            for slot in self.slots.drain(..) {
                self.ctx.device.destroy_semaphore(slot.image_available, None);
                self.ctx.device.destroy_fence(slot.in_flight_fence, None);
            }
            if self.command_pool != vk::CommandPool::null() {
                self.ctx.device.destroy_command_pool(self.command_pool, None);
                self.command_pool = vk::CommandPool::null();
            }
            // Ring buffer frees its allocation on drop
            self.uniform_ring = None;
        }
    }
}

impl Drop for FrameCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
