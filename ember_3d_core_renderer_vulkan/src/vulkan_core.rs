/// RenderCore - the Vulkan render core instance
///
/// Owns the device, the handle-indexed resource pools, the swapchain
/// lifecycle manager and the frame pacing coordinator, and exposes the
/// `begin_frame`/`draw_mesh`/`end_frame` API consumed by game and editor
/// code. All state is per-instance: a second device/window context is a
/// second `RenderCore`.

use ember_3d_core::ember3d::{Result, Error, CoreConfig};
use ember_3d_core::ember3d::render::{
    BufferUsage, Camera, FramePacer, MeshData, ObjectUniforms, PipelineDesc,
    SurfaceLifecycle, cube_mesh, FRAMES_IN_FLIGHT,
};
use ember_3d_core::ember3d::resource::{Handle, ResourcePool};
use ember_3d_core::{core_error, core_err, core_info, core_trace, core_warn};
use ash::vk;
use glam::{Mat4, Vec3, Vec4};
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use gpu_allocator::MemoryLocation;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_frame::FrameCoordinator;
use crate::vulkan_pipeline::Pipeline;
use crate::vulkan_sampler::{SamplerCache, SamplerKind};
use crate::vulkan_swapchain::{RecreateOutcome, SwapchainManager, DEPTH_FORMAT};
use crate::vulkan_texture::{Texture, TextureDescriptorEnv};
use crate::vulkan_transfer::TransferContext;

/// Draw slots available per frame in the uniform ring
const UNIFORM_RING_CAPACITY: u32 = 1024;

/// Mesh resource: two buffer handles plus the index count.
///
/// Creation is transactional — a mesh either references two live buffers
/// or it was never inserted.
pub struct Mesh {
    /// Vertex buffer handle
    pub(crate) vertex_buffer: Handle<Buffer>,
    /// Index buffer handle
    pub(crate) index_buffer: Handle<Buffer>,
    /// Number of indices to draw
    pub(crate) index_count: u32,
}

/// Vulkan render core instance
///
/// Central object for resource creation, frame pacing and draw dispatch.
pub struct RenderCore {
    /// Vulkan entry (kept alive for the instance)
    _entry: ash::Entry,
    /// Vulkan instance
    instance: ash::Instance,
    /// Physical device
    physical_device: vk::PhysicalDevice,
    /// Logical device reference (also stored in GpuContext)
    device: ash::Device,

    #[cfg(feature = "vulkan-validation")]
    debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,

    /// Shared GPU context for all resources
    gpu_context: Arc<GpuContext>,
    /// GPU memory allocator reference (also stored in GpuContext)
    allocator: ManuallyDrop<Arc<Mutex<Allocator>>>,

    /// Swapchain, depth resources and framebuffers
    swapchain: ManuallyDrop<SwapchainManager>,
    /// Frame slots and the uniform ring
    frames: ManuallyDrop<FrameCoordinator>,
    /// Dedicated one-shot upload path
    transfer: ManuallyDrop<TransferContext>,
    /// Internal sampler cache
    sampler_cache: SamplerCache,

    /// Shared render pass (resize-independent, never rebuilt)
    render_pass: vk::RenderPass,
    /// Shared descriptor-set layout all pipelines link against
    descriptor_set_layout: vk::DescriptorSetLayout,

    // ===== Resource pools =====
    buffers: ResourcePool<Buffer>,
    textures: ResourcePool<Texture>,
    meshes: ResourcePool<Mesh>,
    pipelines: ResourcePool<Pipeline>,

    /// Built-in 1x1 white texture; what invalid texture binds degrade to
    default_texture: Handle<Texture>,
    /// Texture whose descriptor set the next draw uses
    current_texture: Handle<Texture>,
    /// Pipeline bound in the current recording pass
    current_pipeline: Handle<Pipeline>,

    // ===== Per-instance state =====
    camera: Camera,
    pacer: FramePacer,
    lifecycle: SurfaceLifecycle,
    config: CoreConfig,
    /// Swapchain image acquired for the open frame
    image_index: u32,
    /// Last known surface size (updated by request_resize)
    surface_size: (u32, u32),
}

impl RenderCore {
    /// Create a render core for `window`.
    ///
    /// Performs the one-time device bootstrap (instance, physical device
    /// and queue selection, logical device, allocator), then builds the
    /// swapchain, render pass, frame slots, uniform ring and default
    /// resources. Any failure aborts startup with an error; nothing is
    /// half-initialized.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: CoreConfig,
    ) -> Result<Self> {
        unsafe {
            // ================================================================
            // Instance
            // ================================================================

            let entry = ash::Entry::load().map_err(|e| {
                core_error!("ember3d::vulkan", "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            // Interior NULs cannot come from normal config strings; fall
            // back to an empty name rather than failing startup
            let app_name = CString::new(config.app_name.as_str()).unwrap_or_default();

            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Ember3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_1);

            let display_handle = window.display_handle().map_err(|e| {
                core_error!("ember3d::vulkan", "Failed to get display handle: {}", e);
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            let window_handle = window.window_handle().map_err(|e| {
                core_error!("ember3d::vulkan", "Failed to get window handle: {}", e);
                Error::InitializationFailed(format!("Failed to get window handle: {}", e))
            })?;

            #[allow(unused_mut)]
            let mut extension_names =
                ash_window::enumerate_required_extensions(display_handle.as_raw())
                    .map_err(|e| {
                        core_error!("ember3d::vulkan", "Failed to get required extensions: {}", e);
                        Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                    })?
                    .to_vec();

            #[cfg(feature = "vulkan-validation")]
            let validation = config.enable_validation;
            #[cfg(not(feature = "vulkan-validation"))]
            let validation = false;

            #[cfg(not(feature = "vulkan-validation"))]
            if config.enable_validation {
                core_warn!("ember3d::vulkan",
                    "Validation requested but the vulkan-validation feature is not compiled in");
            }

            #[cfg(feature = "vulkan-validation")]
            if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            let layer_names = if validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                core_error!("ember3d::vulkan", "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            #[cfg(feature = "vulkan-validation")]
            let debug_messenger = if validation {
                let loader = ash::ext::debug_utils::Instance::new(&entry, &instance);
                let messenger_info = crate::vulkan_debug::messenger_create_info();
                match loader.create_debug_utils_messenger(&messenger_info, None) {
                    Ok(messenger) => Some((loader, messenger)),
                    Err(e) => {
                        core_warn!("ember3d::vulkan", "Failed to create debug messenger: {:?}", e);
                        None
                    }
                }
            } else {
                None
            };

            // ================================================================
            // Surface and device selection
            // ================================================================

            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                core_error!("ember3d::vulkan", "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
                core_error!("ember3d::vulkan", "Failed to enumerate GPUs: {:?}", e);
                Error::InitializationFailed(format!("Failed to enumerate GPUs: {:?}", e))
            })?;

            // Pick the first device with a queue family doing graphics +
            // present (multi-queue scheduling is out of scope)
            let mut selected = None;
            'devices: for &physical_device in &physical_devices {
                let families =
                    instance.get_physical_device_queue_family_properties(physical_device);
                for (index, family) in families.iter().enumerate() {
                    if !family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                        continue;
                    }
                    let present_ok = surface_loader
                        .get_physical_device_surface_support(
                            physical_device,
                            index as u32,
                            surface,
                        )
                        .unwrap_or(false);
                    if present_ok {
                        selected = Some((physical_device, index as u32));
                        break 'devices;
                    }
                }
            }

            let Some((physical_device, queue_family)) = selected else {
                surface_loader.destroy_surface(surface, None);
                instance.destroy_instance(None);
                core_error!("ember3d::vulkan", "No GPU with a graphics+present queue family found");
                return Err(Error::InitializationFailed(
                    "No GPU with a graphics+present queue family found".to_string(),
                ));
            };

            let limits = instance
                .get_physical_device_properties(physical_device)
                .limits;
            let min_uniform_alignment = limits.min_uniform_buffer_offset_alignment;

            // ================================================================
            // Logical device, queues, allocator
            // ================================================================

            let queue_priorities = [1.0_f32];
            let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_family)
                .queue_priorities(&queue_priorities)];

            let device_extensions = [ash::khr::swapchain::NAME.as_ptr()];
            let features = vk::PhysicalDeviceFeatures::default();

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extensions)
                .enabled_features(&features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    surface_loader.destroy_surface(surface, None);
                    instance.destroy_instance(None);
                    core_error!("ember3d::vulkan", "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let graphics_queue = device.get_device_queue(queue_family, 0);
            let present_queue = graphics_queue;

            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                device.destroy_device(None);
                surface_loader.destroy_surface(surface, None);
                instance.destroy_instance(None);
                core_error!("ember3d::vulkan", "Failed to create GPU allocator: {:?}", e);
                Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
            })?;
            let allocator = Arc::new(Mutex::new(allocator));

            let descriptor_pool = Self::create_descriptor_pool(&device)?;

            let gpu_context = Arc::new(GpuContext::new(
                device.clone(),
                allocator.clone(),
                graphics_queue,
                queue_family,
                present_queue,
                descriptor_pool,
                instance.clone(),
            ));

            // ================================================================
            // Swapchain, render pass, frame machinery
            // ================================================================

            let mut swapchain = SwapchainManager::new(
                gpu_context.clone(),
                &instance,
                physical_device,
                surface,
                surface_loader,
                &config,
            )?;

            let render_pass = Self::create_render_pass(&device, swapchain.format())?;
            swapchain.create_framebuffers(render_pass)?;

            let descriptor_set_layout = Self::create_descriptor_set_layout(&device)?;

            let frames = FrameCoordinator::new(
                gpu_context.clone(),
                min_uniform_alignment,
                UNIFORM_RING_CAPACITY,
            )?;

            let transfer = TransferContext::new(gpu_context.clone())?;
            let sampler_cache = SamplerCache::new(gpu_context.clone());

            let mut lifecycle = SurfaceLifecycle::new();
            lifecycle.initialized();

            let surface_size = (config.width, config.height);

            let mut core = Self {
                _entry: entry,
                instance,
                physical_device,
                device,
                #[cfg(feature = "vulkan-validation")]
                debug_messenger,
                gpu_context,
                allocator: ManuallyDrop::new(allocator),
                swapchain: ManuallyDrop::new(swapchain),
                frames: ManuallyDrop::new(frames),
                transfer: ManuallyDrop::new(transfer),
                sampler_cache,
                render_pass,
                descriptor_set_layout,
                buffers: ResourcePool::new(),
                textures: ResourcePool::new(),
                meshes: ResourcePool::new(),
                pipelines: ResourcePool::new(),
                default_texture: Handle::INVALID,
                current_texture: Handle::INVALID,
                current_pipeline: Handle::INVALID,
                camera: Camera::new(),
                pacer: FramePacer::new(UNIFORM_RING_CAPACITY),
                lifecycle,
                config,
                image_index: 0,
                surface_size,
            };

            // Built-in 1x1 white texture: the degrade target for invalid
            // texture binds
            let white = [255u8, 255, 255, 255];
            core.default_texture = core.create_texture(&white, 1, 1)?;
            core.current_texture = core.default_texture;

            core_info!("ember3d::vulkan", "Render core initialized ({}x{}, {} frames in flight)",
                core.swapchain.extent().width, core.swapchain.extent().height, FRAMES_IN_FLIGHT);

            Ok(core)
        }
    }

    // ========================================================================
    // Frame management
    // ========================================================================

    /// Begin recording a frame.
    ///
    /// Returns `Ok(false)` when the caller must skip rendering this tick:
    /// the swapchain was just recreated, or the surface is stale or
    /// degenerate (e.g. minimized). The call is retried every tick and
    /// starts returning `Ok(true)` once the surface stabilizes, so a 0x0
    /// surface never deadlocks the loop.
    ///
    /// The wait on the slot's in-flight fence is the backpressure bound:
    /// the CPU cannot start frame K+N until frame K's GPU work completed.
    pub fn begin_frame(&mut self) -> Result<bool> {
        // A present-time staleness report is consumed here, never
        // mid-submission
        if self.lifecycle.take_deferred_resize() {
            self.lifecycle.mark_out_of_date();
        }

        if self.lifecycle.needs_recreation() {
            self.recreate_swapchain()?;
            return Ok(false);
        }

        let slot_index = self.pacer.current_slot();
        let (command_buffer, image_available, in_flight_fence) = {
            let slot = self.frames.slot(slot_index);
            (slot.command_buffer, slot.image_available, slot.in_flight_fence)
        };

        unsafe {
            self.device
                .wait_for_fences(&[in_flight_fence], true, u64::MAX)
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to wait for in-flight fence: {:?}", e))?;

            match self.swapchain.acquire_next_image(image_available) {
                Ok((image_index, false)) => {
                    self.image_index = image_index;
                }
                Ok((image_index, true)) => {
                    // Suboptimal: the image was acquired and the semaphore
                    // will signal, so this frame must run to consume it;
                    // the swapchain is rebuilt at the next begin_frame
                    self.image_index = image_index;
                    self.lifecycle.defer_resize();
                }
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    // Nothing was acquired and nothing signals; non-fatal —
                    // rebuild now, render next tick
                    self.lifecycle.mark_out_of_date();
                    self.recreate_swapchain()?;
                    return Ok(false);
                }
                Err(e) => {
                    return Err(core_err!("ember3d::vulkan", "Failed to acquire swapchain image: {:?}", e));
                }
            }

            // The fence is reset in end_frame, right before the submit
            // that will signal it again — a frame abandoned between begin
            // and end leaves it signaled, so the slot never deadlocks.
            self.device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to reset command buffer: {:?}", e))?;

            let begin_info = vk::CommandBufferBeginInfo::default();
            self.device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| core_err!("ember3d::vulkan", "Failed to begin command buffer: {:?}", e))?;

            let extent = self.swapchain.extent();
            let clear_values = [
                vk::ClearValue {
                    color: vk::ClearColorValue {
                        float32: self.config.clear_color,
                    },
                },
                vk::ClearValue {
                    depth_stencil: vk::ClearDepthStencilValue {
                        depth: 1.0,
                        stencil: 0,
                    },
                },
            ];

            let framebuffer = self
                .swapchain
                .framebuffer(self.image_index)
                .ok_or_else(|| core_err!("ember3d::vulkan",
                    "Acquired image index {} has no framebuffer", self.image_index))?;

            let render_pass_begin = vk::RenderPassBeginInfo::default()
                .render_pass(self.render_pass)
                .framebuffer(framebuffer)
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent,
                })
                .clear_values(&clear_values);

            self.device
                .cmd_begin_render_pass(command_buffer, &render_pass_begin, vk::SubpassContents::INLINE);

            let viewport = vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            };
            let scissor = vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            };
            self.device.cmd_set_viewport(command_buffer, 0, &[viewport]);
            self.device.cmd_set_scissor(command_buffer, 0, &[scissor]);
        }

        // One pipeline bound per recording pass; each frame binds anew
        self.current_pipeline = Handle::INVALID;
        self.pacer.open_frame();
        Ok(true)
    }

    /// End the frame: submit the recorded commands and present.
    ///
    /// The submit waits on the image-available semaphore, signals the
    /// image's render-finished semaphore plus the slot's fence; the
    /// present waits on render-finished. A stale surface reported by the
    /// present sets a deferred resize flag consumed at the next
    /// `begin_frame`. The frame slot advances unconditionally.
    pub fn end_frame(&mut self) -> Result<()> {
        if !self.pacer.is_frame_open() {
            core_warn!("ember3d::vulkan", "end_frame called without a matching begin_frame");
            return Ok(());
        }

        let slot_index = self.pacer.current_slot();
        let (command_buffer, image_available, in_flight_fence) = {
            let slot = self.frames.slot(slot_index);
            (slot.command_buffer, slot.image_available, slot.in_flight_fence)
        };

        unsafe {
            self.device.cmd_end_render_pass(command_buffer);
            if let Err(e) = self.device.end_command_buffer(command_buffer) {
                // Nothing was submitted; the slot's sync objects are
                // untouched and usable next tick
                self.pacer.abandon_frame();
                return Err(core_err!("ember3d::vulkan", "Failed to end command buffer: {:?}", e));
            }

            let wait_semaphores = [image_available];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let signal_semaphores = [self.swapchain.render_finished_semaphore(self.image_index)];
            let command_buffers = [command_buffer];

            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            // Reset only now that this frame is definitely submitting;
            // the submit below signals the fence again
            if let Err(e) = self.device.reset_fences(&[in_flight_fence]) {
                self.pacer.abandon_frame();
                return Err(core_err!("ember3d::vulkan", "Failed to reset in-flight fence: {:?}", e));
            }

            if let Err(e) = self.device.queue_submit(
                self.gpu_context.graphics_queue,
                &[submit_info],
                in_flight_fence,
            ) {
                self.pacer.abandon_frame();
                return Err(core_err!("ember3d::vulkan", "Failed to submit frame: {:?}", e));
            }
        }

        let present_result = self.swapchain.present(self.image_index);

        // Advance unconditionally, even when the present reports staleness
        self.pacer.close_frame();

        match present_result {
            Ok(true) => {
                self.lifecycle.defer_resize();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Record an external resize event (e.g. winit `WindowEvent::Resized`).
    ///
    /// The swapchain is rebuilt at the top of the next `begin_frame`.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        self.surface_size = (width, height);
        self.lifecycle.mark_out_of_date();
    }

    fn recreate_swapchain(&mut self) -> Result<bool> {
        if !self.lifecycle.begin_recreate() {
            return Err(core_err!("ember3d::vulkan", "Swapchain recreation before initialization"));
        }

        let (width, height) = self.surface_size;
        match self.swapchain.recreate(self.render_pass, width, height)? {
            RecreateOutcome::Deferred => {
                self.lifecycle.abort_recreate();
                Ok(false)
            }
            RecreateOutcome::Recreated => {
                self.lifecycle.finish_recreate();
                Ok(true)
            }
        }
    }

    // ========================================================================
    // Pipeline management
    // ========================================================================

    /// Compile a graphics pipeline. Shader bytecode is read fresh from the
    /// paths in `desc`; a missing or invalid shader aborts creation with
    /// nothing left allocated.
    pub fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<Handle<Pipeline>> {
        let pipeline = Pipeline::create(
            &self.device,
            desc,
            self.render_pass,
            self.descriptor_set_layout,
        )?;
        Ok(self.pipelines.insert(pipeline))
    }

    /// Bind a pipeline for the draws that follow in this recording pass.
    ///
    /// Not reentrant: one pipeline is current at a time. Invalid or stale
    /// handles are ignored with a warning.
    pub fn bind_pipeline(&mut self, handle: Handle<Pipeline>) {
        if !self.pacer.is_frame_open() {
            core_warn!("ember3d::vulkan", "bind_pipeline called outside of a frame");
            return;
        }
        let Some(pipeline) = self.pipelines.get(handle) else {
            core_warn!("ember3d::vulkan", "bind_pipeline: stale handle {:?}", handle);
            return;
        };

        let command_buffer = self.frames.slot(self.pacer.current_slot()).command_buffer;
        unsafe {
            self.device.cmd_bind_pipeline(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                pipeline.pipeline,
            );
        }
        self.current_pipeline = handle;
    }

    /// Destroy a pipeline. Stale handles are a warned no-op.
    pub fn destroy_pipeline(&mut self, handle: Handle<Pipeline>) {
        if self.pipelines.remove(handle).is_none() {
            core_warn!("ember3d::vulkan", "destroy_pipeline: stale handle {:?}", handle);
            return;
        }
        if self.current_pipeline == handle {
            self.current_pipeline = Handle::INVALID;
        }
    }

    // ========================================================================
    // Buffer management
    // ========================================================================

    /// Create a vertex buffer populated with `data` (host-visible +
    /// coherent, filled through the persistent mapping).
    pub fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<Handle<Buffer>> {
        let buffer = Buffer::new(
            self.gpu_context.clone(),
            "vertex buffer",
            data.len() as u64,
            BufferUsage::VERTEX,
            MemoryLocation::CpuToGpu,
        )?;
        buffer.update(0, data)?;
        Ok(self.buffers.insert(buffer))
    }

    /// Create an index buffer populated with `indices`
    pub fn create_index_buffer(&mut self, indices: &[u32]) -> Result<Handle<Buffer>> {
        let buffer = Buffer::new(
            self.gpu_context.clone(),
            "index buffer",
            std::mem::size_of_val(indices) as u64,
            BufferUsage::INDEX,
            MemoryLocation::CpuToGpu,
        )?;
        buffer.update(0, bytemuck::cast_slice(indices))?;
        Ok(self.buffers.insert(buffer))
    }

    /// Create an empty uniform buffer of `size` bytes
    pub fn create_uniform_buffer(&mut self, size: u64) -> Result<Handle<Buffer>> {
        let buffer = Buffer::new(
            self.gpu_context.clone(),
            "uniform buffer",
            size,
            BufferUsage::UNIFORM,
            MemoryLocation::CpuToGpu,
        )?;
        Ok(self.buffers.insert(buffer))
    }

    /// Overwrite part of a host-visible buffer. Stale handles degrade to
    /// a warned no-op; out-of-bounds writes are errors.
    pub fn update_buffer(&mut self, handle: Handle<Buffer>, offset: u64, data: &[u8]) -> Result<()> {
        match self.buffers.get(handle) {
            Some(buffer) => buffer.update(offset, data),
            None => {
                core_warn!("ember3d::vulkan", "update_buffer: stale handle {:?}", handle);
                Ok(())
            }
        }
    }

    /// Destroy a buffer. Stale handles are a warned no-op.
    pub fn destroy_buffer(&mut self, handle: Handle<Buffer>) {
        if self.buffers.remove(handle).is_none() {
            core_warn!("ember3d::vulkan", "destroy_buffer: stale handle {:?}", handle);
        }
    }

    /// Byte size of a live buffer
    pub fn buffer_size(&self, handle: Handle<Buffer>) -> Option<u64> {
        self.buffers.get(handle).map(|b| b.size())
    }

    /// Raw Vulkan handle of a live buffer (for dependent subsystems)
    pub fn buffer_raw(&self, handle: Handle<Buffer>) -> Option<vk::Buffer> {
        self.buffers.get(handle).map(|b| b.raw())
    }

    /// Mapped contents of a live host-visible buffer
    pub fn buffer_mapped_slice(&self, handle: Handle<Buffer>) -> Option<&[u8]> {
        self.buffers.get(handle).and_then(|b| b.mapped_slice())
    }

    // ========================================================================
    // Texture management
    // ========================================================================

    /// Create an sRGB color texture from tightly packed RGBA8 pixels.
    ///
    /// The upload is synchronous on the dedicated transfer path: the call
    /// returns once the image is in shader-read layout and the staging
    /// buffer is freed.
    pub fn create_texture(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Handle<Texture>> {
        self.create_texture_internal(pixels, width, height,
            vk::Format::R8G8B8A8_SRGB, SamplerKind::LinearRepeat)
    }

    /// Create a linear (UNORM) texture — for displacement-style data that
    /// must not be gamma-decoded on sampling.
    pub fn create_texture_linear(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Handle<Texture>> {
        self.create_texture_internal(pixels, width, height,
            vk::Format::R8G8B8A8_UNORM, SamplerKind::LinearClamp)
    }

    fn create_texture_internal(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: vk::Format,
        sampler_kind: SamplerKind,
    ) -> Result<Handle<Texture>> {
        let sampler = self.sampler_cache.get(sampler_kind);
        let env = TextureDescriptorEnv {
            set_layout: self.descriptor_set_layout,
            uniform_ring: self.frames.uniform_ring_raw(),
            uniform_range: self.frames.uniform_range(),
        };
        let texture = Texture::create(
            self.gpu_context.clone(),
            &self.transfer,
            pixels,
            width,
            height,
            format,
            sampler,
            &env,
        )?;
        Ok(self.textures.insert(texture))
    }

    /// Select the texture sampled by the draws that follow.
    ///
    /// An invalid or stale handle degrades to the built-in 1x1 white
    /// texture instead of failing the frame.
    pub fn bind_texture(&mut self, handle: Handle<Texture>) {
        if self.textures.contains(handle) {
            self.current_texture = handle;
        } else {
            if handle.is_valid() {
                core_warn!("ember3d::vulkan",
                    "bind_texture: stale handle {:?}, falling back to default", handle);
            }
            self.current_texture = self.default_texture;
        }
    }

    /// Destroy a texture. The built-in default texture cannot be
    /// destroyed; stale handles are a warned no-op.
    pub fn destroy_texture(&mut self, handle: Handle<Texture>) {
        if handle == self.default_texture {
            core_warn!("ember3d::vulkan", "destroy_texture: refusing to destroy the default texture");
            return;
        }
        if self.textures.remove(handle).is_none() {
            core_warn!("ember3d::vulkan", "destroy_texture: stale handle {:?}", handle);
            return;
        }
        if self.current_texture == handle {
            self.current_texture = self.default_texture;
        }
    }

    /// Raw view/sampler pair of a live texture (for dependent subsystems)
    pub fn texture_info(&self, handle: Handle<Texture>) -> Option<(vk::ImageView, vk::Sampler)> {
        self.textures.get(handle).map(|t| t.info())
    }

    /// Dimensions of a live texture
    pub fn texture_size(&self, handle: Handle<Texture>) -> Option<(u32, u32)> {
        self.textures.get(handle).map(|t| (t.width(), t.height()))
    }

    /// The built-in 1x1 white texture
    pub fn default_texture(&self) -> Handle<Texture> {
        self.default_texture
    }

    // ========================================================================
    // Mesh management
    // ========================================================================

    /// Create a mesh from interleaved vertex data plus indices.
    ///
    /// Transactional: if the index-buffer allocation fails, the already
    /// created vertex buffer is destroyed before the error propagates —
    /// no half-built mesh state exists.
    pub fn create_mesh(&mut self, data: &MeshData) -> Result<Handle<Mesh>> {
        if !data.is_well_formed() {
            return Err(core_err!("ember3d::vulkan",
                "Mesh data is malformed ({} floats, {} indices, {:?})",
                data.vertices.len(), data.indices.len(), data.format));
        }

        let vertex_buffer = self.create_vertex_buffer(bytemuck::cast_slice(&data.vertices))?;
        let index_buffer = match self.create_index_buffer(&data.indices) {
            Ok(handle) => handle,
            Err(e) => {
                self.destroy_buffer(vertex_buffer);
                return Err(e);
            }
        };

        Ok(self.meshes.insert(Mesh {
            vertex_buffer,
            index_buffer,
            index_count: data.index_count(),
        }))
    }

    /// Create a unit-cube mesh of edge length `size` in PositionColor
    /// format
    pub fn create_cube(&mut self, size: f32, color: Vec3) -> Result<Handle<Mesh>> {
        let data = cube_mesh(size, color);
        self.create_mesh(&data)
    }

    /// Destroy a mesh and both buffers it references
    pub fn destroy_mesh(&mut self, handle: Handle<Mesh>) {
        match self.meshes.remove(handle) {
            Some(mesh) => {
                self.destroy_buffer(mesh.vertex_buffer);
                self.destroy_buffer(mesh.index_buffer);
            }
            None => {
                core_warn!("ember3d::vulkan", "destroy_mesh: stale handle {:?}", handle);
            }
        }
    }

    /// Raw buffer handles and index count of a live mesh (for dependent
    /// subsystems recording their own draws)
    pub fn mesh_buffers(&self, handle: Handle<Mesh>) -> Option<(vk::Buffer, vk::Buffer, u32)> {
        let mesh = self.meshes.get(handle)?;
        let vertex_buffer = self.buffers.get(mesh.vertex_buffer)?.raw();
        let index_buffer = self.buffers.get(mesh.index_buffer)?.raw();
        Some((vertex_buffer, index_buffer, mesh.index_count))
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Draw a mesh with the given transform and color.
    ///
    /// Writes this draw's uniforms into its own slot of the per-frame
    /// uniform ring and binds the current texture's descriptor set with
    /// the matching dynamic offset — draws recorded earlier in the frame
    /// keep their own data. Safe no-op (with a trace/warn log) when no
    /// frame is open, the mesh or pipeline handle is stale, or the ring
    /// is exhausted.
    pub fn draw_mesh(&mut self, handle: Handle<Mesh>, transform: Mat4, color: Vec4) {
        if !self.pacer.is_frame_open() {
            core_trace!("ember3d::vulkan", "draw_mesh outside of a frame, ignored");
            return;
        }
        let Some(mesh) = self.meshes.get(handle) else {
            core_trace!("ember3d::vulkan", "draw_mesh: stale mesh handle {:?}", handle);
            return;
        };
        let Some(pipeline) = self.pipelines.get(self.current_pipeline) else {
            core_trace!("ember3d::vulkan", "draw_mesh with no pipeline bound, ignored");
            return;
        };
        let (Some(vertex_buffer), Some(index_buffer)) = (
            self.buffers.get(mesh.vertex_buffer),
            self.buffers.get(mesh.index_buffer),
        ) else {
            core_warn!("ember3d::vulkan", "draw_mesh: mesh {:?} references destroyed buffers", handle);
            return;
        };

        let descriptor_set = self
            .textures
            .get(self.current_texture)
            .or_else(|| self.textures.get(self.default_texture))
            .map(|t| t.descriptor_set());
        let Some(descriptor_set) = descriptor_set else {
            core_warn!("ember3d::vulkan", "draw_mesh: no usable texture descriptor set");
            return;
        };

        let vk_vertex_buffer = vertex_buffer.raw();
        let vk_index_buffer = index_buffer.raw();
        let index_count = mesh.index_count;
        let pipeline_layout = pipeline.layout;

        let Some(draw_index) = self.pacer.claim_draw() else {
            core_warn!("ember3d::vulkan",
                "draw_mesh: uniform ring exhausted ({} draws), draw dropped",
                self.frames.ring_capacity());
            return;
        };

        let slot_index = self.pacer.current_slot();
        let uniforms = ObjectUniforms {
            model: transform,
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            color,
        };
        if let Err(e) = self.frames.write_uniforms(slot_index, draw_index, &uniforms) {
            core_error!("ember3d::vulkan", "draw_mesh: uniform write failed: {}", e);
            return;
        }

        let dynamic_offset = self.frames.dynamic_offset(slot_index, draw_index);
        let command_buffer = self.frames.slot(slot_index).command_buffer;

        unsafe {
            self.device.cmd_bind_descriptor_sets(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                pipeline_layout,
                0,
                &[descriptor_set],
                &[dynamic_offset],
            );
            self.device
                .cmd_bind_vertex_buffers(command_buffer, 0, &[vk_vertex_buffer], &[0]);
            self.device
                .cmd_bind_index_buffer(command_buffer, vk_index_buffer, 0, vk::IndexType::UINT32);
            self.device
                .cmd_draw_indexed(command_buffer, index_count, 1, 0, 0, 0);
        }
    }

    /// Bind a vertex buffer and issue a non-indexed draw.
    ///
    /// Raw entry point for dependent subsystems; descriptor state is the
    /// caller's responsibility.
    pub fn draw_vertices(&mut self, vertex_buffer: Handle<Buffer>, vertex_count: u32) {
        if !self.pacer.is_frame_open() {
            core_trace!("ember3d::vulkan", "draw_vertices outside of a frame, ignored");
            return;
        }
        let Some(buffer) = self.buffers.get(vertex_buffer) else {
            core_trace!("ember3d::vulkan", "draw_vertices: stale buffer handle {:?}", vertex_buffer);
            return;
        };
        let vk_buffer = buffer.raw();
        let command_buffer = self.frames.slot(self.pacer.current_slot()).command_buffer;

        unsafe {
            self.device
                .cmd_bind_vertex_buffers(command_buffer, 0, &[vk_buffer], &[0]);
            self.device.cmd_draw(command_buffer, vertex_count, 1, 0, 0);
        }
    }

    /// Bind vertex + index buffers and issue an indexed draw.
    ///
    /// Raw entry point for dependent subsystems; descriptor state is the
    /// caller's responsibility.
    pub fn draw_indexed(
        &mut self,
        vertex_buffer: Handle<Buffer>,
        index_buffer: Handle<Buffer>,
        index_count: u32,
    ) {
        if !self.pacer.is_frame_open() {
            core_trace!("ember3d::vulkan", "draw_indexed outside of a frame, ignored");
            return;
        }
        let (Some(vertex), Some(index)) = (
            self.buffers.get(vertex_buffer),
            self.buffers.get(index_buffer),
        ) else {
            core_trace!("ember3d::vulkan", "draw_indexed: stale buffer handle");
            return;
        };
        let vk_vertex = vertex.raw();
        let vk_index = index.raw();
        let command_buffer = self.frames.slot(self.pacer.current_slot()).command_buffer;

        unsafe {
            self.device
                .cmd_bind_vertex_buffers(command_buffer, 0, &[vk_vertex], &[0]);
            self.device
                .cmd_bind_index_buffer(command_buffer, vk_index, 0, vk::IndexType::UINT32);
            self.device
                .cmd_draw_indexed(command_buffer, index_count, 1, 0, 0, 0);
        }
    }

    // ========================================================================
    // Camera / view
    // ========================================================================

    /// Place the camera at `eye` looking at `target`
    pub fn set_camera(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.camera.look_at(eye, target, up);
    }

    /// Perspective projection using the current surface aspect ratio
    pub fn set_perspective(&mut self, fov_y_degrees: f32, near: f32, far: f32) {
        let aspect = self.aspect_ratio();
        self.camera.set_perspective(fov_y_degrees, aspect, near, far);
    }

    /// Set the view matrix directly
    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.camera.set_view_matrix(view);
    }

    /// Set the projection matrix directly
    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.camera.set_projection_matrix(projection);
    }

    /// Current view matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    /// Current projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.camera.projection_matrix()
    }

    // ========================================================================
    // Accessors (for advanced use / extension)
    // ========================================================================

    /// Logical device (for dependent subsystems)
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    /// Physical device
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Graphics queue
    pub fn graphics_queue(&self) -> vk::Queue {
        self.gpu_context.graphics_queue
    }

    /// Graphics queue family index
    pub fn graphics_queue_family(&self) -> u32 {
        self.gpu_context.graphics_queue_family
    }

    /// The shared render pass (resize-independent)
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    /// The shared descriptor-set layout all pipelines link against
    pub fn descriptor_set_layout(&self) -> vk::DescriptorSetLayout {
        self.descriptor_set_layout
    }

    /// Command buffer of the open frame, for dependent subsystems
    /// recording their own draws into the same frame. `None` outside of
    /// begin/end.
    pub fn current_command_buffer(&self) -> Option<vk::CommandBuffer> {
        if self.pacer.is_frame_open() {
            Some(self.frames.slot(self.pacer.current_slot()).command_buffer)
        } else {
            None
        }
    }

    /// Dynamic uniform offset a given draw index of the open frame maps to
    pub fn uniform_offset(&self, draw_index: u32) -> u32 {
        self.frames.dynamic_offset(self.pacer.current_slot(), draw_index)
    }

    /// Draws recorded in the open frame so far
    pub fn draws_recorded(&self) -> u32 {
        self.pacer.draws_recorded()
    }

    /// Per-frame draw capacity (uniform ring slots)
    pub fn max_draws_per_frame(&self) -> u32 {
        self.frames.ring_capacity()
    }

    /// Current swapchain width in pixels
    pub fn width(&self) -> u32 {
        self.swapchain.extent().width
    }

    /// Current swapchain height in pixels
    pub fn height(&self) -> u32 {
        self.swapchain.extent().height
    }

    /// Width / height of the current swapchain
    pub fn aspect_ratio(&self) -> f32 {
        let extent = self.swapchain.extent();
        if extent.height == 0 {
            1.0
        } else {
            extent.width as f32 / extent.height as f32
        }
    }

    /// Swapchain image count
    pub fn image_count(&self) -> usize {
        self.swapchain.image_count()
    }

    /// Frames the CPU may record ahead of the GPU
    pub fn frames_in_flight(&self) -> usize {
        FRAMES_IN_FLIGHT
    }

    /// Change the background clear color
    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.config.clear_color = [r, g, b, a];
    }

    // ========================================================================
    // Internal setup helpers
    // ========================================================================

    /// Create the shared render pass: one color attachment (swapchain
    /// format, cleared, presented) and one depth attachment.
    fn create_render_pass(device: &ash::Device, color_format: vk::Format) -> Result<vk::RenderPass> {
        let attachments = [
            vk::AttachmentDescription {
                format: color_format,
                samples: vk::SampleCountFlags::TYPE_1,
                load_op: vk::AttachmentLoadOp::CLEAR,
                store_op: vk::AttachmentStoreOp::STORE,
                stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
                stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
                initial_layout: vk::ImageLayout::UNDEFINED,
                final_layout: vk::ImageLayout::PRESENT_SRC_KHR,
                ..Default::default()
            },
            vk::AttachmentDescription {
                format: DEPTH_FORMAT,
                samples: vk::SampleCountFlags::TYPE_1,
                load_op: vk::AttachmentLoadOp::CLEAR,
                store_op: vk::AttachmentStoreOp::DONT_CARE,
                stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
                stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
                initial_layout: vk::ImageLayout::UNDEFINED,
                final_layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                ..Default::default()
            },
        ];

        let color_refs = [vk::AttachmentReference {
            attachment: 0,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];
        let depth_ref = vk::AttachmentReference {
            attachment: 1,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        };

        let subpasses = [vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .depth_stencil_attachment(&depth_ref)];

        let dependencies = [vk::SubpassDependency {
            src_subpass: vk::SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            src_access_mask: vk::AccessFlags::empty(),
            dst_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            ..Default::default()
        }];

        let render_pass_create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        unsafe {
            device
                .create_render_pass(&render_pass_create_info, None)
                .map_err(|e| {
                    core_error!("ember3d::vulkan", "Failed to create render pass: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create render pass: {:?}", e))
                })
        }
    }

    /// Create the shared descriptor-set layout:
    /// binding 0 = per-draw uniforms (dynamic), binding 1 = texture.
    fn create_descriptor_set_layout(device: &ash::Device) -> Result<vk::DescriptorSetLayout> {
        let bindings = [
            vk::DescriptorSetLayoutBinding::default()
                .binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC)
                .descriptor_count(1)
                .stage_flags(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT),
            vk::DescriptorSetLayoutBinding::default()
                .binding(1)
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .descriptor_count(1)
                .stage_flags(vk::ShaderStageFlags::FRAGMENT),
        ];

        let layout_create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

        unsafe {
            device
                .create_descriptor_set_layout(&layout_create_info, None)
                .map_err(|e| {
                    core_error!("ember3d::vulkan", "Failed to create descriptor set layout: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create descriptor set layout: {:?}", e))
                })
        }
    }

    /// Create the shared descriptor pool (per-texture sets; FREE flag so
    /// destroyed textures return their sets).
    fn create_descriptor_pool(device: &ash::Device) -> Result<vk::DescriptorPool> {
        let pool_sizes = [
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
                descriptor_count: 1024,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                descriptor_count: 1024,
            },
        ];
        let pool_create_info = vk::DescriptorPoolCreateInfo::default()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .pool_sizes(&pool_sizes)
            .max_sets(1024);

        unsafe {
            device
                .create_descriptor_pool(&pool_create_info, None)
                .map_err(|e| {
                    core_error!("ember3d::vulkan", "Failed to create descriptor pool: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create descriptor pool: {:?}", e))
                })
        }
    }
}

impl Drop for RenderCore {
    fn drop(&mut self) {
        unsafe {
            // Wait for device to finish
            self.device.device_wait_idle().ok();

            // 1. Drop pooled resources while the device is alive.
            //    Meshes only reference buffer handles; buffers and textures
            //    free their native objects on drop.
            self.pipelines.drain();
            self.meshes.drain();
            self.textures.drain();
            self.buffers.drain();

            // 2. Frame machinery: sync objects, command pool, uniform ring
            ManuallyDrop::drop(&mut self.frames);

            // 3. Transfer path and sampler cache (both release their
            //    GpuContext references)
            ManuallyDrop::drop(&mut self.transfer);
            self.sampler_cache.shutdown();

            // 4. Swapchain, depth resources, framebuffers, surface
            ManuallyDrop::drop(&mut self.swapchain);

            // 5. RenderCore-owned pipeline plumbing
            self.device
                .destroy_descriptor_set_layout(self.descriptor_set_layout, None);
            self.device.destroy_render_pass(self.render_pass, None);

            // 6. Descriptor pool from GpuContext
            if let Ok(mut pool) = self.gpu_context.descriptor_pool.lock() {
                if *pool != vk::DescriptorPool::null() {
                    self.device.destroy_descriptor_pool(*pool, None);
                    *pool = vk::DescriptorPool::null();
                }
            }

            // 7. Drop allocator: free VkDeviceMemory pages BEFORE destroying
            //    the device. First this RenderCore's Arc, then GpuContext's.
            ManuallyDrop::drop(&mut self.allocator);
            if let Some(ctx) = Arc::get_mut(&mut self.gpu_context) {
                ManuallyDrop::drop(&mut ctx.allocator);
            } else {
                core_warn!("ember3d::vulkan",
                    "GpuContext still shared at shutdown; allocator not freed");
            }

            // 8. Destroy debug messenger BEFORE device and instance
            #[cfg(feature = "vulkan-validation")]
            if let Some((loader, messenger)) = self.debug_messenger.take() {
                loader.destroy_debug_utils_messenger(messenger, None);
            }

            // 9. Destroy device and instance
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}
