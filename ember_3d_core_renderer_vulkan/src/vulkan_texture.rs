/// Texture - pooled GPU texture resource with staged upload

use ember_3d_core::ember3d::{Result, Error};
use ember_3d_core::{core_error, core_err};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_transfer::TransferContext;
use ember_3d_core::ember3d::render::BufferUsage;

/// Descriptor environment shared by all textures: the layout every set is
/// allocated against and the uniform ring the dynamic binding points at.
pub(crate) struct TextureDescriptorEnv {
    pub(crate) set_layout: vk::DescriptorSetLayout,
    pub(crate) uniform_ring: vk::Buffer,
    pub(crate) uniform_range: u64,
}

/// Vulkan texture resource.
///
/// Format is fixed at creation: the color path creates `R8G8B8A8_SRGB`,
/// the linear path `R8G8B8A8_UNORM` (displacement-style data that must not
/// be gamma-decoded). Each texture owns a descriptor set binding the
/// shared uniform ring (binding 0, dynamic) and its own view/sampler pair
/// (binding 1), so switching textures never rewrites a descriptor set that
/// recorded commands still reference.
pub struct Texture {
    /// Shared GPU context (device, allocator, descriptor pool)
    ctx: Arc<GpuContext>,
    /// Vulkan image
    pub(crate) image: vk::Image,
    /// Vulkan image view
    pub(crate) view: vk::ImageView,
    /// Sampler handle (owned by the sampler cache, not destroyed here)
    pub(crate) sampler: vk::Sampler,
    /// Per-texture descriptor set (uniform ring + this texture)
    pub(crate) descriptor_set: vk::DescriptorSet,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Width in pixels
    pub(crate) width: u32,
    /// Height in pixels
    pub(crate) height: u32,
}

impl Texture {
    /// Create a texture and synchronously upload `pixels` (tightly packed
    /// RGBA8, `width * height * 4` bytes).
    ///
    /// The upload runs on the dedicated transfer context: staging copy,
    /// layout transition to transfer-destination, buffer-to-image copy,
    /// transition to shader-read-only, then a blocking wait on the
    /// transfer fence before the staging buffer is freed.
    ///
    /// Every partial-failure path rolls back the objects created before
    /// it; on error nothing is left allocated.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create(
        ctx: Arc<GpuContext>,
        transfer: &TransferContext,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: vk::Format,
        sampler: vk::Sampler,
        env: &TextureDescriptorEnv,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(core_err!("ember3d::vulkan",
                "Refusing to create {}x{} texture", width, height));
        }
        let expected = width as u64 * height as u64 * 4;
        if pixels.len() as u64 != expected {
            return Err(core_err!("ember3d::vulkan",
                "Texture pixel data is {} bytes, expected {} for {}x{} RGBA",
                pixels.len(), expected, width, height));
        }

        // Staging buffer; freed automatically on every exit path
        let staging = Buffer::new(
            ctx.clone(),
            "texture staging",
            expected,
            BufferUsage::TRANSFER_SRC,
            MemoryLocation::CpuToGpu,
        )?;
        staging.update(0, pixels)?;

        unsafe {
            let device = &ctx.device;

            // Create the device-local image
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .extent(vk::Extent3D { width, height, depth: 1 })
                .mip_levels(1)
                .array_layers(1)
                .format(format)
                .tiling(vk::ImageTiling::OPTIMAL)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .usage(vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .samples(vk::SampleCountFlags::TYPE_1);

            let image = device.create_image(&image_create_info, None)
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to create texture image: {:?}", e))?;

            let requirements = device.get_image_memory_requirements(image);
            let allocation = match ctx.allocator.lock() {
                Ok(mut allocator) => allocator.allocate(&AllocationCreateDesc {
                    name: "texture",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                }),
                Err(_) => {
                    device.destroy_image(image, None);
                    return Err(core_err!("ember3d::vulkan", "Allocator lock poisoned"));
                }
            };

            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(e) => {
                    device.destroy_image(image, None);
                    core_error!("ember3d::vulkan",
                        "Failed to allocate texture memory ({}x{}): {:?}", width, height, e);
                    return Err(Error::OutOfMemory);
                }
            };

            // Rollback helper for everything from here on
            let free_image = |allocation: Allocation| {
                if let Ok(mut allocator) = ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
                device.destroy_image(image, None);
            };

            if let Err(e) = device.bind_image_memory(image, allocation.memory(), allocation.offset()) {
                free_image(allocation);
                return Err(core_err!("ember3d::vulkan", "Failed to bind texture memory: {:?}", e));
            }

            // Transition, copy from staging, transition to shader-read.
            // Blocks on the transfer fence, not on frame fences.
            let upload_result = transfer.submit_one_shot(|device, cmd| {
                let subresource_range = vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                };

                let to_transfer_dst = vk::ImageMemoryBarrier::default()
                    .old_layout(vk::ImageLayout::UNDEFINED)
                    .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(image)
                    .subresource_range(subresource_range)
                    .src_access_mask(vk::AccessFlags::empty())
                    .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE);

                device.cmd_pipeline_barrier(
                    cmd,
                    vk::PipelineStageFlags::TOP_OF_PIPE,
                    vk::PipelineStageFlags::TRANSFER,
                    vk::DependencyFlags::empty(),
                    &[], &[], &[to_transfer_dst],
                );

                let region = vk::BufferImageCopy {
                    buffer_offset: 0,
                    buffer_row_length: 0,
                    buffer_image_height: 0,
                    image_subresource: vk::ImageSubresourceLayers {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        mip_level: 0,
                        base_array_layer: 0,
                        layer_count: 1,
                    },
                    image_offset: vk::Offset3D { x: 0, y: 0, z: 0 },
                    image_extent: vk::Extent3D { width, height, depth: 1 },
                };

                device.cmd_copy_buffer_to_image(
                    cmd,
                    staging.buffer,
                    image,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    &[region],
                );

                let to_shader_read = vk::ImageMemoryBarrier::default()
                    .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                    .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(image)
                    .subresource_range(subresource_range)
                    .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                    .dst_access_mask(vk::AccessFlags::SHADER_READ);

                device.cmd_pipeline_barrier(
                    cmd,
                    vk::PipelineStageFlags::TRANSFER,
                    vk::PipelineStageFlags::FRAGMENT_SHADER,
                    vk::DependencyFlags::empty(),
                    &[], &[], &[to_shader_read],
                );
            });

            if let Err(e) = upload_result {
                free_image(allocation);
                return Err(e);
            }

            // Image view
            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = match device.create_image_view(&view_create_info, None) {
                Ok(view) => view,
                Err(e) => {
                    free_image(allocation);
                    return Err(core_err!("ember3d::vulkan", "Failed to create texture view: {:?}", e));
                }
            };

            // Per-texture descriptor set: uniform ring + this view/sampler
            let descriptor_set = {
                let pool = match ctx.descriptor_pool.lock() {
                    Ok(pool) => *pool,
                    Err(_) => {
                        device.destroy_image_view(view, None);
                        free_image(allocation);
                        return Err(core_err!("ember3d::vulkan", "Descriptor pool lock poisoned"));
                    }
                };

                let layouts = [env.set_layout];
                let alloc_info = vk::DescriptorSetAllocateInfo::default()
                    .descriptor_pool(pool)
                    .set_layouts(&layouts);

                match device.allocate_descriptor_sets(&alloc_info) {
                    Ok(sets) => sets[0],
                    Err(e) => {
                        device.destroy_image_view(view, None);
                        free_image(allocation);
                        return Err(core_err!("ember3d::vulkan",
                            "Failed to allocate texture descriptor set: {:?}", e));
                    }
                }
            };

            let buffer_info = [vk::DescriptorBufferInfo {
                buffer: env.uniform_ring,
                offset: 0,
                range: env.uniform_range,
            }];
            let image_info = [vk::DescriptorImageInfo {
                sampler,
                image_view: view,
                image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            }];

            let writes = [
                vk::WriteDescriptorSet::default()
                    .dst_set(descriptor_set)
                    .dst_binding(0)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC)
                    .buffer_info(&buffer_info),
                vk::WriteDescriptorSet::default()
                    .dst_set(descriptor_set)
                    .dst_binding(1)
                    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .image_info(&image_info),
            ];

            device.update_descriptor_sets(&writes, &[]);

            Ok(Self {
                ctx,
                image,
                view,
                sampler,
                descriptor_set,
                allocation: Some(allocation),
                width,
                height,
            })
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw view/sampler pair (for dependent subsystems)
    pub fn info(&self) -> (vk::ImageView, vk::Sampler) {
        (self.view, self.sampler)
    }

    /// This texture's descriptor set
    pub fn descriptor_set(&self) -> vk::DescriptorSet {
        self.descriptor_set
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            // Return the descriptor set to the shared pool
            self.ctx.free_descriptor_set(self.descriptor_set);

            // Destroy image view
            self.ctx.device.destroy_image_view(self.view, None);

            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            // Destroy image (sampler is owned by the cache)
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}
