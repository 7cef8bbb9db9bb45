/// Render core configuration.
///
/// Passed once at construction; the clear color may be changed at runtime
/// through the render core itself.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Application name reported to the driver
    pub app_name: String,

    /// Initial window width in pixels
    pub width: u32,

    /// Initial window height in pixels
    pub height: u32,

    /// Enable the Khronos validation layers (requires the
    /// `vulkan-validation` feature on the backend crate)
    pub enable_validation: bool,

    /// Present with vsync (FIFO) instead of the lowest-latency mode
    /// available
    pub vsync: bool,

    /// Background clear color (RGBA)
    pub clear_color: [f32; 4],
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "Ember3D App".to_string(),
            width: 1280,
            height: 720,
            enable_validation: false,
            vsync: true,
            clear_color: [0.1, 0.1, 0.12, 1.0],
        }
    }
}
