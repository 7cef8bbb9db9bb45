/// Pipeline - pooled graphics pipeline resource
///
/// Compiles a fixed-function-state + shader description into a bindable
/// pipeline object linked against the render core's shared descriptor-set
/// layout. Shader bytecode is read fresh from disk on every creation call.

use ember_3d_core::ember3d::Result;
use ember_3d_core::ember3d::render::{CullMode, PipelineDesc, PolygonMode, PrimitiveTopology, VertexFormat};
use ember_3d_core::{core_err, core_info};
use ash::vk;

use crate::vulkan_shader::{self, ShaderStage};

/// Vulkan pipeline resource
pub struct Pipeline {
    /// Vulkan graphics pipeline
    pub(crate) pipeline: vk::Pipeline,
    /// Pipeline layout (accessed internally for descriptor set binding)
    pub(crate) layout: vk::PipelineLayout,
    /// Vulkan device (for cleanup)
    pub(crate) device: ash::Device,
}

impl Pipeline {
    /// Build a graphics pipeline from `desc`.
    ///
    /// Failure at any step destroys everything created before it: missing
    /// or invalid shader bytecode aborts before any Vulkan object exists,
    /// and a pipeline-creation failure destroys the already-created
    /// pipeline layout. On error nothing is left allocated.
    pub(crate) fn create(
        device: &ash::Device,
        desc: &PipelineDesc,
        render_pass: vk::RenderPass,
        set_layout: vk::DescriptorSetLayout,
    ) -> Result<Self> {
        // Read both stages up front; no cleanup needed if either fails
        let vert_code = vulkan_shader::load_spirv(&desc.vertex_shader, ShaderStage::Vertex)?;
        let frag_code = vulkan_shader::load_spirv(&desc.fragment_shader, ShaderStage::Fragment)?;

        unsafe {
            let vert_module = vulkan_shader::create_shader_module(device, &vert_code)?;
            let frag_module = match vulkan_shader::create_shader_module(device, &frag_code) {
                Ok(module) => module,
                Err(e) => {
                    device.destroy_shader_module(vert_module, None);
                    return Err(e);
                }
            };

            let stages = [
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(ShaderStage::Vertex.to_vk())
                    .module(vert_module)
                    .name(c"main"),
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(ShaderStage::Fragment.to_vk())
                    .module(frag_module)
                    .name(c"main"),
            ];

            let binding_descriptions = [vertex_binding_to_vk(desc.vertex_format)];
            let attribute_descriptions = vertex_attributes_to_vk(desc.vertex_format);

            let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
                .vertex_binding_descriptions(&binding_descriptions)
                .vertex_attribute_descriptions(&attribute_descriptions);

            let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(topology_to_vk(desc.topology));

            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewport_count(1)
                .scissor_count(1);

            let rasterizer = vk::PipelineRasterizationStateCreateInfo::default()
                .polygon_mode(polygon_mode_to_vk(desc.polygon_mode))
                .line_width(1.0)
                .cull_mode(cull_mode_to_vk(desc.cull_mode))
                .front_face(vk::FrontFace::COUNTER_CLOCKWISE);

            let multisampling = vk::PipelineMultisampleStateCreateInfo::default()
                .rasterization_samples(vk::SampleCountFlags::TYPE_1);

            let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
                .depth_test_enable(desc.depth_test)
                .depth_write_enable(desc.depth_write)
                .depth_compare_op(vk::CompareOp::LESS);

            let mut color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA);
            if desc.alpha_blend {
                color_blend_attachment = color_blend_attachment
                    .blend_enable(true)
                    .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
                    .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
                    .color_blend_op(vk::BlendOp::ADD)
                    .src_alpha_blend_factor(vk::BlendFactor::ONE)
                    .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
                    .alpha_blend_op(vk::BlendOp::ADD);
            }

            let color_blend_attachments = [color_blend_attachment];
            let color_blending = vk::PipelineColorBlendStateCreateInfo::default()
                .attachments(&color_blend_attachments);

            let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
            let dynamic_state = vk::PipelineDynamicStateCreateInfo::default()
                .dynamic_states(&dynamic_states);

            let set_layouts = [set_layout];
            let layout_create_info = vk::PipelineLayoutCreateInfo::default()
                .set_layouts(&set_layouts);

            let layout = match device.create_pipeline_layout(&layout_create_info, None) {
                Ok(layout) => layout,
                Err(e) => {
                    device.destroy_shader_module(vert_module, None);
                    device.destroy_shader_module(frag_module, None);
                    return Err(core_err!("ember3d::vulkan", "Failed to create pipeline layout: {:?}", e));
                }
            };

            let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&stages)
                .vertex_input_state(&vertex_input)
                .input_assembly_state(&input_assembly)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterizer)
                .multisample_state(&multisampling)
                .depth_stencil_state(&depth_stencil)
                .color_blend_state(&color_blending)
                .dynamic_state(&dynamic_state)
                .layout(layout)
                .render_pass(render_pass)
                .subpass(0);

            let result = device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                &[pipeline_create_info],
                None,
            );

            // Stage modules are not needed once the pipeline exists (or failed)
            device.destroy_shader_module(vert_module, None);
            device.destroy_shader_module(frag_module, None);

            let pipeline = match result {
                Ok(pipelines) => pipelines[0],
                Err((_, e)) => {
                    device.destroy_pipeline_layout(layout, None);
                    return Err(core_err!("ember3d::vulkan", "Failed to create graphics pipeline: {:?}", e));
                }
            };

            core_info!("ember3d::vulkan", "Pipeline created: {:?}", desc.vertex_shader);

            Ok(Self {
                pipeline,
                layout,
                device: device.clone(),
            })
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            // Destroy pipeline
            self.device.destroy_pipeline(self.pipeline, None);
            // Destroy pipeline layout
            self.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

// ============================================================================
// Fixed-function state mapping
// ============================================================================

/// Convert PrimitiveTopology to the Vulkan topology
pub(crate) fn topology_to_vk(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
        PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

/// Convert PolygonMode to the Vulkan polygon mode
pub(crate) fn polygon_mode_to_vk(mode: PolygonMode) -> vk::PolygonMode {
    match mode {
        PolygonMode::Fill => vk::PolygonMode::FILL,
        PolygonMode::Line => vk::PolygonMode::LINE,
        PolygonMode::Point => vk::PolygonMode::POINT,
    }
}

/// Convert CullMode to the Vulkan cull flags
pub(crate) fn cull_mode_to_vk(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

/// Binding description for an interleaved vertex format
pub(crate) fn vertex_binding_to_vk(format: VertexFormat) -> vk::VertexInputBindingDescription {
    vk::VertexInputBindingDescription {
        binding: 0,
        stride: format.stride(),
        input_rate: vk::VertexInputRate::VERTEX,
    }
}

/// Attribute descriptions for an interleaved vertex format
pub(crate) fn vertex_attributes_to_vk(format: VertexFormat) -> Vec<vk::VertexInputAttributeDescription> {
    format
        .attributes()
        .iter()
        .map(|attr| vk::VertexInputAttributeDescription {
            location: attr.location,
            binding: 0,
            format: match attr.components {
                2 => vk::Format::R32G32_SFLOAT,
                3 => vk::Format::R32G32B32_SFLOAT,
                _ => vk::Format::R32G32B32A32_SFLOAT,
            },
            offset: attr.offset,
        })
        .collect()
}
