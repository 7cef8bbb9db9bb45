/// Buffer - pooled GPU buffer resource

use ember_3d_core::ember3d::{Result, Error};
use ember_3d_core::ember3d::render::BufferUsage;
use ember_3d_core::{core_error, core_err};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan buffer resource.
///
/// Memory location is chosen once at creation (`CpuToGpu` for CPU-writable
/// buffers, `GpuOnly` for GPU-only data) and the buffer is never resized.
/// Dropping the resource frees the allocation and destroys the buffer.
pub struct Buffer {
    /// Shared GPU context (device, allocator, queues)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Buffer size in bytes
    pub(crate) size: u64,
    /// Declared usage
    pub(crate) usage: BufferUsage,
}

impl Buffer {
    /// Create a new buffer.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared GPU context
    /// * `label` - Allocator debug name
    /// * `size` - Size in bytes (must be nonzero)
    /// * `usage` - Intended bind points
    /// * `location` - `CpuToGpu` (host-visible + coherent) or `GpuOnly`
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        label: &str,
        size: u64,
        usage: BufferUsage,
        location: MemoryLocation,
    ) -> Result<Self> {
        if size == 0 {
            return Err(core_err!("ember3d::vulkan", "Refusing to create zero-sized buffer '{}'", label));
        }

        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(usage_to_vk(usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = ctx.device.create_buffer(&buffer_create_info, None)
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to create buffer '{}': {:?}", label, e))?;

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);

            let allocation = match ctx.allocator.lock() {
                Ok(mut allocator) => allocator.allocate(&AllocationCreateDesc {
                    name: label,
                    requirements,
                    location,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                }),
                Err(_) => {
                    ctx.device.destroy_buffer(buffer, None);
                    return Err(core_err!("ember3d::vulkan", "Allocator lock poisoned"));
                }
            };

            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(e) => {
                    ctx.device.destroy_buffer(buffer, None);
                    core_error!("ember3d::vulkan", "Failed to allocate {} bytes for buffer '{}': {:?}", size, label, e);
                    return Err(Error::OutOfMemory);
                }
            };

            if let Err(e) = ctx.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
                if let Ok(mut allocator) = ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
                ctx.device.destroy_buffer(buffer, None);
                return Err(core_err!("ember3d::vulkan", "Failed to bind memory for buffer '{}': {:?}", label, e));
            }

            Ok(Self {
                ctx,
                buffer,
                allocation: Some(allocation),
                size,
                usage,
            })
        }
    }

    /// Buffer size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Declared usage
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Raw Vulkan buffer handle (for dependent subsystems recording their
    /// own commands)
    pub fn raw(&self) -> vk::Buffer {
        self.buffer
    }

    /// Copy `data` into the buffer at `offset` through the persistent
    /// mapping.
    ///
    /// Fails for GPU-only buffers (no mapping) and out-of-bounds writes.
    pub fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            return Err(core_err!("ember3d::vulkan",
                "Buffer update out of bounds: {} + {} > {}", offset, data.len(), self.size));
        }

        unsafe {
            if let Some(allocation) = &self.allocation {
                let mapped_ptr = allocation
                    .mapped_ptr()
                    .ok_or_else(|| Error::BackendError("Buffer is not CPU-accessible".to_string()))?
                    .as_ptr() as *mut u8;

                std::ptr::copy_nonoverlapping(
                    data.as_ptr(),
                    mapped_ptr.offset(offset as isize),
                    data.len(),
                );

                Ok(())
            } else {
                core_error!("ember3d::vulkan", "Buffer update failed: no GPU allocation");
                Err(Error::BackendError("Buffer has no allocation".to_string()))
            }
        }
    }

    /// Read-only view of the mapped contents (host-visible buffers only)
    pub fn mapped_slice(&self) -> Option<&[u8]> {
        self.allocation.as_ref().and_then(|a| a.mapped_slice())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            // Destroy buffer
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}

/// Map BufferUsage flags onto Vulkan usage bits
pub(crate) fn usage_to_vk(usage: BufferUsage) -> vk::BufferUsageFlags {
    let mut flags = vk::BufferUsageFlags::empty();
    if usage.contains(BufferUsage::VERTEX) {
        flags |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    if usage.contains(BufferUsage::INDEX) {
        flags |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if usage.contains(BufferUsage::UNIFORM) {
        flags |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }
    if usage.contains(BufferUsage::TRANSFER_SRC) {
        flags |= vk::BufferUsageFlags::TRANSFER_SRC;
    }
    flags
}
