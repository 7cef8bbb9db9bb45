//! Vulkan validation layer support
//!
//! Compiled in only with the `vulkan-validation` feature. Routes
//! VK_LAYER_KHRONOS_validation messages through the render core's logging
//! system.

use ash::vk;
use std::ffi::CStr;
use ember_3d_core::{core_debug, core_error, core_info, core_warn};

/// Debug messenger callback invoked by the validation layers.
///
/// # Safety
///
/// Called by the Vulkan loader with valid pointers for the duration of the
/// call.
pub(crate) unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }

    let data = *p_callback_data;
    let message = if data.p_message.is_null() {
        String::from("<no message>")
    } else {
        CStr::from_ptr(data.p_message).to_string_lossy().into_owned()
    };

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            core_error!("ember3d::vulkan::validation", "{}", message);
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            core_warn!("ember3d::vulkan::validation", "{}", message);
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => {
            core_info!("ember3d::vulkan::validation", "{}", message);
        }
        _ => {
            core_debug!("ember3d::vulkan::validation", "{}", message);
        }
    }

    // Never abort the triggering call
    vk::FALSE
}

/// Build the messenger create-info used both for the instance pNext chain
/// and the standalone messenger.
pub(crate) fn messenger_create_info<'a>() -> vk::DebugUtilsMessengerCreateInfoEXT<'a> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback))
}
