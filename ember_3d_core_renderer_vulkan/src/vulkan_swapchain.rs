/// SwapchainManager - presentable-image chain and its resize lifecycle
///
/// Owns the surface, swapchain, image views, depth resources and
/// framebuffers — everything whose lifetime is tied to the surface size.
/// The render pass, pipelines and buffers are resize-independent, live in
/// RenderCore, and are never rebuilt here.

use ember_3d_core::ember3d::{Result, Error};
use ember_3d_core::ember3d::CoreConfig;
use ember_3d_core::{core_debug, core_error, core_err, core_warn};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Depth attachment format used by the whole render core
pub(crate) const DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

/// Result of a recreation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecreateOutcome {
    /// Swapchain was rebuilt against the current surface capabilities
    Recreated,
    /// Surface is degenerate (0x0, e.g. minimized); nothing was rebuilt
    /// and the caller should keep skipping frames until it changes
    Deferred,
}

/// Vulkan swapchain lifecycle manager
pub(crate) struct SwapchainManager {
    ctx: Arc<GpuContext>,
    physical_device: vk::PhysicalDevice,

    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
    swapchain_loader: ash::khr::swapchain::Device,

    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    format: vk::Format,
    color_space: vk::ColorSpaceKHR,
    extent: vk::Extent2D,
    present_mode: vk::PresentModeKHR,

    depth_image: vk::Image,
    depth_view: vk::ImageView,
    depth_allocation: Option<Allocation>,

    framebuffers: Vec<vk::Framebuffer>,

    /// One render-finished semaphore per swapchain image (not per frame
    /// slot), so a present never waits on a semaphore another in-flight
    /// image may still signal
    render_finished_semaphores: Vec<vk::Semaphore>,
}

impl SwapchainManager {
    /// Build the initial swapchain, image views and depth resources.
    ///
    /// Framebuffers are created separately once the render pass exists
    /// (see [`create_framebuffers`](Self::create_framebuffers)).
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: ash::khr::surface::Instance,
        config: &CoreConfig,
    ) -> Result<Self> {
        let swapchain_loader = ash::khr::swapchain::Device::new(instance, &ctx.device);

        let mut manager = Self {
            ctx,
            physical_device,
            surface,
            surface_loader,
            swapchain_loader,
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            image_views: Vec::new(),
            format: vk::Format::UNDEFINED,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            extent: vk::Extent2D { width: config.width, height: config.height },
            present_mode: vk::PresentModeKHR::FIFO,
            depth_image: vk::Image::null(),
            depth_view: vk::ImageView::null(),
            depth_allocation: None,
            framebuffers: Vec::new(),
            render_finished_semaphores: Vec::new(),
        };

        manager.choose_surface_format()?;
        manager.choose_present_mode(config.vsync);
        manager.build_swapchain(config.width, config.height)?;
        manager.build_depth_resources()?;
        manager.build_render_finished_semaphores()?;

        Ok(manager)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub(crate) fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub(crate) fn format(&self) -> vk::Format {
        self.format
    }

    pub(crate) fn image_count(&self) -> usize {
        self.images.len()
    }

    pub(crate) fn framebuffer(&self, image_index: u32) -> Option<vk::Framebuffer> {
        self.framebuffers.get(image_index as usize).copied()
    }

    pub(crate) fn render_finished_semaphore(&self, image_index: u32) -> vk::Semaphore {
        self.render_finished_semaphores[image_index as usize]
    }

    // ========================================================================
    // Acquire / present
    // ========================================================================

    /// Acquire the next presentable image, signaling `semaphore` when it
    /// is ready. Returns the raw Vulkan result so the frame coordinator
    /// can translate staleness into the lifecycle state machine.
    pub(crate) fn acquire_next_image(
        &self,
        semaphore: vk::Semaphore,
    ) -> std::result::Result<(u32, bool), vk::Result> {
        unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                semaphore,
                vk::Fence::null(),
            )
        }
    }

    /// Present `image_index`, waiting on its render-finished semaphore.
    ///
    /// Returns `Ok(true)` when the present went through but the surface
    /// is stale (out-of-date/suboptimal) and a deferred resize should be
    /// recorded; real failures are errors.
    pub(crate) fn present(&self, image_index: u32) -> Result<bool> {
        unsafe {
            let swapchains = [self.swapchain];
            let image_indices = [image_index];
            let wait_semaphores = [self.render_finished_semaphores[image_index as usize]];

            let present_info = vk::PresentInfoKHR::default()
                .wait_semaphores(&wait_semaphores)
                .swapchains(&swapchains)
                .image_indices(&image_indices);

            match self.swapchain_loader.queue_present(self.ctx.present_queue, &present_info) {
                Ok(false) => Ok(false),
                Ok(true) => Ok(true), // suboptimal
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(true),
                Err(e) => Err(core_err!("ember3d::vulkan", "Failed to present swapchain image: {:?}", e)),
            }
        }
    }

    // ========================================================================
    // Framebuffers
    // ========================================================================

    /// (Re)create one framebuffer per swapchain image against `render_pass`
    pub(crate) fn create_framebuffers(&mut self, render_pass: vk::RenderPass) -> Result<()> {
        unsafe {
            for framebuffer in self.framebuffers.drain(..) {
                self.ctx.device.destroy_framebuffer(framebuffer, None);
            }

            for &view in &self.image_views {
                let attachments = [view, self.depth_view];
                let framebuffer_create_info = vk::FramebufferCreateInfo::default()
                    .render_pass(render_pass)
                    .attachments(&attachments)
                    .width(self.extent.width)
                    .height(self.extent.height)
                    .layers(1);

                let framebuffer = self.ctx.device
                    .create_framebuffer(&framebuffer_create_info, None)
                    .map_err(|e| core_err!("ember3d::vulkan", "Failed to create framebuffer: {:?}", e))?;
                self.framebuffers.push(framebuffer);
            }

            Ok(())
        }
    }

    // ========================================================================
    // Recreation
    // ========================================================================

    /// Tear down and rebuild everything resize-dependent.
    ///
    /// Waits for the device to go idle, destroys only the framebuffers,
    /// depth resources, image views and swapchain, then rebuilds from
    /// fresh surface capabilities. Safe to call repeatedly. When the
    /// surface reports a degenerate size nothing is destroyed and
    /// [`RecreateOutcome::Deferred`] is returned.
    pub(crate) fn recreate(
        &mut self,
        render_pass: vk::RenderPass,
        hint_width: u32,
        hint_height: u32,
    ) -> Result<RecreateOutcome> {
        unsafe {
            let capabilities = self.query_capabilities()?;

            let extent = Self::pick_extent(&capabilities, hint_width, hint_height);
            if extent.width == 0 || extent.height == 0 {
                core_debug!("ember3d::vulkan",
                    "Surface is degenerate ({}x{}), deferring swapchain recreation",
                    extent.width, extent.height);
                return Ok(RecreateOutcome::Deferred);
            }

            // Wait for all in-flight work before touching attachments
            self.ctx.device.device_wait_idle()
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to wait idle before swapchain recreate: {:?}", e))?;

            // Destroy only the resize-dependent objects
            for framebuffer in self.framebuffers.drain(..) {
                self.ctx.device.destroy_framebuffer(framebuffer, None);
            }
            self.destroy_depth_resources();
            for view in self.image_views.drain(..) {
                self.ctx.device.destroy_image_view(view, None);
            }

            self.build_swapchain(hint_width, hint_height)?;
            self.build_depth_resources()?;
            self.create_framebuffers(render_pass)?;

            // Image count can change with capabilities; keep one
            // render-finished semaphore per image
            if self.render_finished_semaphores.len() != self.images.len() {
                for semaphore in self.render_finished_semaphores.drain(..) {
                    self.ctx.device.destroy_semaphore(semaphore, None);
                }
                self.build_render_finished_semaphores()?;
            }

            core_debug!("ember3d::vulkan", "Swapchain recreated at {}x{} ({} images)",
                self.extent.width, self.extent.height, self.images.len());

            Ok(RecreateOutcome::Recreated)
        }
    }

    // ========================================================================
    // Internal builders
    // ========================================================================

    fn query_capabilities(&self) -> Result<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| {
                    core_error!("ember3d::vulkan", "Failed to get surface capabilities: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
                })
        }
    }

    fn choose_surface_format(&mut self) -> Result<()> {
        unsafe {
            let formats = self.surface_loader
                .get_physical_device_surface_formats(self.physical_device, self.surface)
                .map_err(|e| {
                    core_error!("ember3d::vulkan", "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;

            if formats.is_empty() {
                return Err(core_err!("ember3d::vulkan", "Surface reports no formats"));
            }

            let chosen = formats
                .iter()
                .find(|f| f.format == vk::Format::B8G8R8A8_SRGB || f.format == vk::Format::R8G8B8A8_SRGB)
                .unwrap_or(&formats[0]);

            self.format = chosen.format;
            self.color_space = chosen.color_space;
            Ok(())
        }
    }

    fn choose_present_mode(&mut self, vsync: bool) {
        if vsync {
            // FIFO is always available
            self.present_mode = vk::PresentModeKHR::FIFO;
            return;
        }

        let modes = unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(self.physical_device, self.surface)
                .unwrap_or_default()
        };

        self.present_mode = if modes.contains(&vk::PresentModeKHR::MAILBOX) {
            vk::PresentModeKHR::MAILBOX
        } else if modes.contains(&vk::PresentModeKHR::IMMEDIATE) {
            vk::PresentModeKHR::IMMEDIATE
        } else {
            core_warn!("ember3d::vulkan", "No low-latency present mode available, using FIFO");
            vk::PresentModeKHR::FIFO
        };
    }

    fn pick_extent(
        capabilities: &vk::SurfaceCapabilitiesKHR,
        hint_width: u32,
        hint_height: u32,
    ) -> vk::Extent2D {
        if capabilities.current_extent.width != u32::MAX {
            capabilities.current_extent
        } else {
            vk::Extent2D {
                width: hint_width.clamp(
                    capabilities.min_image_extent.width,
                    capabilities.max_image_extent.width,
                ),
                height: hint_height.clamp(
                    capabilities.min_image_extent.height,
                    capabilities.max_image_extent.height,
                ),
            }
        }
    }

    fn build_swapchain(&mut self, hint_width: u32, hint_height: u32) -> Result<()> {
        unsafe {
            let capabilities = self.query_capabilities()?;
            let extent = Self::pick_extent(&capabilities, hint_width, hint_height);

            let mut image_count = capabilities.min_image_count + 1;
            if capabilities.max_image_count > 0 {
                image_count = image_count.min(capabilities.max_image_count);
            }

            let old_swapchain = self.swapchain;
            let swapchain_create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(self.surface)
                .min_image_count(image_count)
                .image_format(self.format)
                .image_color_space(self.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(self.present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);

            let swapchain = self.swapchain_loader
                .create_swapchain(&swapchain_create_info, None)
                .map_err(|e| {
                    core_error!("ember3d::vulkan", "Failed to create swapchain: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
                })?;

            if old_swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(old_swapchain, None);
            }
            self.swapchain = swapchain;
            self.extent = extent;

            self.images = self.swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| {
                    core_error!("ember3d::vulkan", "Failed to get swapchain images: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
                })?;

            for &image in &self.images {
                let view_create_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(self.format)
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });

                let view = self.ctx.device.create_image_view(&view_create_info, None)
                    .map_err(|e| {
                        core_error!("ember3d::vulkan", "Failed to create swapchain image view: {:?}", e);
                        Error::InitializationFailed(format!("Failed to create image view: {:?}", e))
                    })?;
                self.image_views.push(view);
            }

            Ok(())
        }
    }

    fn build_depth_resources(&mut self) -> Result<()> {
        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .extent(vk::Extent3D {
                    width: self.extent.width,
                    height: self.extent.height,
                    depth: 1,
                })
                .mip_levels(1)
                .array_layers(1)
                .format(DEPTH_FORMAT)
                .tiling(vk::ImageTiling::OPTIMAL)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
                .samples(vk::SampleCountFlags::TYPE_1);

            let depth_image = self.ctx.device.create_image(&image_create_info, None)
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to create depth image: {:?}", e))?;

            let requirements = self.ctx.device.get_image_memory_requirements(depth_image);
            let allocation = match self.ctx.allocator.lock() {
                Ok(mut allocator) => allocator.allocate(&AllocationCreateDesc {
                    name: "depth buffer",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                }),
                Err(_) => {
                    self.ctx.device.destroy_image(depth_image, None);
                    return Err(core_err!("ember3d::vulkan", "Allocator lock poisoned"));
                }
            };

            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(e) => {
                    self.ctx.device.destroy_image(depth_image, None);
                    core_error!("ember3d::vulkan", "Failed to allocate depth buffer: {:?}", e);
                    return Err(Error::OutOfMemory);
                }
            };

            if let Err(e) = self.ctx.device.bind_image_memory(
                depth_image, allocation.memory(), allocation.offset())
            {
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
                self.ctx.device.destroy_image(depth_image, None);
                return Err(core_err!("ember3d::vulkan", "Failed to bind depth memory: {:?}", e));
            }

            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(depth_image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(DEPTH_FORMAT)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::DEPTH,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let depth_view = match self.ctx.device.create_image_view(&view_create_info, None) {
                Ok(view) => view,
                Err(e) => {
                    if let Ok(mut allocator) = self.ctx.allocator.lock() {
                        allocator.free(allocation).ok();
                    }
                    self.ctx.device.destroy_image(depth_image, None);
                    return Err(core_err!("ember3d::vulkan", "Failed to create depth view: {:?}", e));
                }
            };

            self.depth_image = depth_image;
            self.depth_view = depth_view;
            self.depth_allocation = Some(allocation);
            Ok(())
        }
    }

    fn build_render_finished_semaphores(&mut self) -> Result<()> {
        unsafe {
            let semaphore_create_info = vk::SemaphoreCreateInfo::default();
            for _ in 0..self.images.len() {
                let semaphore = self.ctx.device
                    .create_semaphore(&semaphore_create_info, None)
                    .map_err(|e| core_err!("ember3d::vulkan", "Failed to create render-finished semaphore: {:?}", e))?;
                self.render_finished_semaphores.push(semaphore);
            }
            Ok(())
        }
    }

    fn destroy_depth_resources(&mut self) {
        unsafe {
            if self.depth_view != vk::ImageView::null() {
                self.ctx.device.destroy_image_view(self.depth_view, None);
                self.depth_view = vk::ImageView::null();
            }
            if let Some(allocation) = self.depth_allocation.take() {
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }
            if self.depth_image != vk::Image::null() {
                self.ctx.device.destroy_image(self.depth_image, None);
                self.depth_image = vk::Image::null();
            }
        }
    }
}

impl Drop for SwapchainManager {
    fn drop(&mut self) {
        unsafe {
            // Wait for device to finish
            self.ctx.device.device_wait_idle().ok();

            for semaphore in self.render_finished_semaphores.drain(..) {
                self.ctx.device.destroy_semaphore(semaphore, None);
            }

            for framebuffer in self.framebuffers.drain(..) {
                self.ctx.device.destroy_framebuffer(framebuffer, None);
            }

            self.destroy_depth_resources();

            for view in self.image_views.drain(..) {
                self.ctx.device.destroy_image_view(view, None);
            }

            if self.swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            }

            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}
