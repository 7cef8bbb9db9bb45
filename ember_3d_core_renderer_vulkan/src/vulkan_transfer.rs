/// TransferContext — dedicated one-shot upload path
///
/// Owns a TRANSIENT command pool and its own fence, decoupled from the
/// frame-pacing fences: a texture or buffer upload blocks only on its own
/// completion, never on a device-wide idle. Uploads remain synchronous
/// from the caller's point of view.

use ember_3d_core::ember3d::Result;
use ember_3d_core::core_err;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// One-shot command recording and submission for resource uploads
pub(crate) struct TransferContext {
    ctx: Arc<GpuContext>,
    command_pool: vk::CommandPool,
    fence: vk::Fence,
}

impl TransferContext {
    /// Create the transfer pool (TRANSIENT) and an unsignaled fence
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let pool_create_info = vk::CommandPoolCreateInfo::default()
                .flags(vk::CommandPoolCreateFlags::TRANSIENT)
                .queue_family_index(ctx.graphics_queue_family);

            let command_pool = ctx.device.create_command_pool(&pool_create_info, None)
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to create transfer command pool: {:?}", e))?;

            let fence = match ctx.device.create_fence(&vk::FenceCreateInfo::default(), None) {
                Ok(fence) => fence,
                Err(e) => {
                    ctx.device.destroy_command_pool(command_pool, None);
                    return Err(core_err!("ember3d::vulkan", "Failed to create transfer fence: {:?}", e));
                }
            };

            Ok(Self {
                ctx,
                command_pool,
                fence,
            })
        }
    }

    /// Record commands with `record`, submit them, and block until the
    /// transfer fence signals.
    ///
    /// The command buffer is freed before returning, success or not.
    pub(crate) fn submit_one_shot<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        unsafe {
            let device = &self.ctx.device;

            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(self.command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffer = device.allocate_command_buffers(&alloc_info)
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to allocate upload command buffer: {:?}", e))?[0];

            // From here on the buffer must be freed on every exit path
            let result = (|| -> Result<()> {
                let begin_info = vk::CommandBufferBeginInfo::default()
                    .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
                device.begin_command_buffer(command_buffer, &begin_info)
                    .map_err(|e| core_err!("ember3d::vulkan", "Failed to begin upload command buffer: {:?}", e))?;

                record(device, command_buffer);

                device.end_command_buffer(command_buffer)
                    .map_err(|e| core_err!("ember3d::vulkan", "Failed to end upload command buffer: {:?}", e))?;

                let command_buffers = [command_buffer];
                let submit_info = vk::SubmitInfo::default()
                    .command_buffers(&command_buffers);

                device.queue_submit(self.ctx.graphics_queue, &[submit_info], self.fence)
                    .map_err(|e| core_err!("ember3d::vulkan", "Failed to submit upload: {:?}", e))?;

                // Wait on the transfer fence only — frame fences are untouched
                device.wait_for_fences(&[self.fence], true, u64::MAX)
                    .map_err(|e| core_err!("ember3d::vulkan", "Failed to wait for upload fence: {:?}", e))?;
                device.reset_fences(&[self.fence])
                    .map_err(|e| core_err!("ember3d::vulkan", "Failed to reset upload fence: {:?}", e))?;

                Ok(())
            })();

            device.free_command_buffers(self.command_pool, &[command_buffer]);

            result
        }
    }

    /// Destroy the pool and fence. Must run while the device is alive.
    pub(crate) fn shutdown(&mut self) {
        unsafe {
            if self.fence != vk::Fence::null() {
                self.ctx.device.destroy_fence(self.fence, None);
                self.fence = vk::Fence::null();
            }
            if self.command_pool != vk::CommandPool::null() {
                self.ctx.device.destroy_command_pool(self.command_pool, None);
                self.command_pool = vk::CommandPool::null();
            }
        }
    }
}

impl Drop for TransferContext {
    fn drop(&mut self) {
        // shutdown() nulls the handles; destroying null handles is a no-op,
        // so a missed shutdown still cleans up (while the device is alive).
        self.shutdown();
    }
}
