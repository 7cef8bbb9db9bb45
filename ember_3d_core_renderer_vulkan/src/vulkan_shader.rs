/// Shader module loading
///
/// Reads compiled SPIR-V from disk (fresh on every pipeline creation — no
/// cache), validates the bytecode before any Vulkan object exists, and
/// wraps module creation so the pipeline manager can roll back cleanly.

use ember_3d_core::ember3d::{Result, Error};
use ember_3d_core::{core_error, core_err};
use ash::vk;
use std::io::Cursor;
use std::path::Path;

/// Shader stages the render core links into a graphics pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_vk(self) -> vk::ShaderStageFlags {
        match self {
            ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
        }
    }
}

/// Load and validate SPIR-V bytecode from `path`.
///
/// Fails for missing files, empty or misaligned bytecode, a bad SPIR-V
/// magic number, or bytecode with no `main` entry point. No Vulkan objects
/// are created here, so failure leaves nothing to clean up.
pub(crate) fn load_spirv(path: &Path, stage: ShaderStage) -> Result<Vec<u32>> {
    let bytes = std::fs::read(path).map_err(|e| {
        core_error!("ember3d::vulkan", "Failed to read {:?} shader {:?}: {}", stage, path, e);
        Error::InvalidResource(format!("Failed to read shader {:?}: {}", path, e))
    })?;

    if bytes.is_empty() {
        return Err(core_err!("ember3d::vulkan", "Shader {:?} is empty", path));
    }

    // read_spv checks 4-byte alignment and the SPIR-V magic number
    let code = ash::util::read_spv(&mut Cursor::new(&bytes)).map_err(|e| {
        core_error!("ember3d::vulkan", "Shader {:?} is not valid SPIR-V: {}", path, e);
        Error::InvalidResource(format!("Shader {:?} is not valid SPIR-V: {}", path, e))
    })?;

    // Reflect the bytecode and confirm the expected entry point exists
    let entry_points = spirq::ReflectConfig::new()
        .spv(code.as_slice())
        .reflect()
        .map_err(|e| {
            core_error!("ember3d::vulkan", "SPIR-V reflection failed for {:?}: {:?}", path, e);
            Error::InvalidResource(format!("SPIR-V reflection failed for {:?}", path))
        })?;

    if !entry_points.iter().any(|entry| entry.name == "main") {
        return Err(core_err!("ember3d::vulkan",
            "Shader {:?} has no 'main' entry point", path));
    }

    Ok(code)
}

/// Create a shader module from validated bytecode.
///
/// The caller owns the module and must destroy it (pipeline creation
/// destroys both stage modules whether or not it succeeds).
pub(crate) fn create_shader_module(device: &ash::Device, code: &[u32]) -> Result<vk::ShaderModule> {
    let create_info = vk::ShaderModuleCreateInfo::default().code(code);
    unsafe {
        device.create_shader_module(&create_info, None)
            .map_err(|e| core_err!("ember3d::vulkan", "Failed to create shader module: {:?}", e))
    }
}
