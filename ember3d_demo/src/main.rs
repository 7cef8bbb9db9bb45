//! Spinning-cube demo for the Ember3D render core.
//!
//! Compile the shaders once before running:
//!
//! ```text
//! glslangValidator -V ember3d_demo/shaders/cube.vert -o ember3d_demo/shaders/cube.vert.spv
//! glslangValidator -V ember3d_demo/shaders/cube.frag -o ember3d_demo/shaders/cube.frag.spv
//! cargo run -p ember3d_demo
//! ```

use std::path::PathBuf;
use std::time::Instant;

use ember_3d_core::ember3d::CoreConfig;
use ember_3d_core::ember3d::render::PipelineDesc;
use ember_3d_core::ember3d::resource::Handle;
use ember_3d_core::{core_error, core_info};
use ember_3d_core_renderer_vulkan::ember3d::{Mesh, Pipeline, RenderCore};
use glam::{Mat4, Vec3, Vec4};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Shader directory; override with EMBER3D_SHADER_DIR
fn shader_dir() -> PathBuf {
    std::env::var_os("EMBER3D_SHADER_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("ember3d_demo/shaders"))
}

struct DemoApp {
    window: Option<Window>,
    core: Option<RenderCore>,
    pipeline: Handle<Pipeline>,
    cube: Handle<Mesh>,
    start: Instant,
}

impl DemoApp {
    fn new() -> Self {
        Self {
            window: None,
            core: None,
            pipeline: Handle::INVALID,
            cube: Handle::INVALID,
            start: Instant::now(),
        }
    }

    fn init_renderer(&mut self, window: &Window) -> bool {
        let size = window.inner_size();
        let config = CoreConfig {
            app_name: "Ember3D Demo".to_string(),
            width: size.width,
            height: size.height,
            clear_color: [0.05, 0.05, 0.08, 1.0],
            ..Default::default()
        };

        let mut core = match RenderCore::new(window, config) {
            Ok(core) => core,
            Err(e) => {
                core_error!("ember3d::demo", "Failed to initialize render core: {}", e);
                return false;
            }
        };

        let shaders = shader_dir();
        let desc = PipelineDesc {
            vertex_shader: shaders.join("cube.vert.spv"),
            fragment_shader: shaders.join("cube.frag.spv"),
            ..Default::default()
        };
        self.pipeline = match core.create_pipeline(&desc) {
            Ok(handle) => handle,
            Err(e) => {
                core_error!("ember3d::demo",
                    "Failed to create pipeline (compile the shaders first, see the header of main.rs): {}", e);
                return false;
            }
        };

        self.cube = match core.create_cube(1.0, Vec3::new(0.9, 0.5, 0.2)) {
            Ok(handle) => handle,
            Err(e) => {
                core_error!("ember3d::demo", "Failed to create cube mesh: {}", e);
                return false;
            }
        };

        core.set_camera(Vec3::new(2.0, 1.5, 2.5), Vec3::ZERO, Vec3::Y);
        core.set_perspective(60.0, 0.1, 100.0);

        core_info!("ember3d::demo", "Renderer ready ({}x{})", core.width(), core.height());
        self.core = Some(core);
        true
    }

    fn render(&mut self) {
        let Some(core) = self.core.as_mut() else { return };

        match core.begin_frame() {
            Ok(true) => {}
            // Surface stale or degenerate; retried next redraw
            Ok(false) => return,
            Err(e) => {
                core_error!("ember3d::demo", "begin_frame failed: {}", e);
                return;
            }
        }

        let t = self.start.elapsed().as_secs_f32();
        let transform = Mat4::from_rotation_y(t) * Mat4::from_rotation_x(t * 0.4);

        core.bind_pipeline(self.pipeline);
        core.draw_mesh(self.cube, transform, Vec4::ONE);

        if let Err(e) = core.end_frame() {
            core_error!("ember3d::demo", "end_frame failed: {}", e);
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Ember3D Demo")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => window,
            Err(e) => {
                core_error!("ember3d::demo", "Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if !self.init_renderer(&window) {
            // Unrecoverable setup failure: log and exit before the render loop
            event_loop.exit();
            return;
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(core) = self.core.as_mut() {
                    core.request_resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            core_error!("ember3d::demo", "Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp::new();
    if let Err(e) = event_loop.run_app(&mut app) {
        core_error!("ember3d::demo", "Event loop error: {}", e);
        std::process::exit(1);
    }
}
