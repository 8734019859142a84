//! Window shell: owns the event loop, the GPU context and the scene, and
//! drives continuous redraw.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use pollster::FutureExt as _;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::camera::Camera;
use crate::gfx::{RenderError, WgpuContext};
use crate::renderer::Renderer;
use crate::scene::Scene;

const ORBIT_SENSITIVITY: f32 = 0.005;
const ZOOM_SENSITIVITY: f32 = 1.5;

pub struct AppConfig {
    pub title: String,
    pub size: (u32, u32),
    pub model_path: Option<PathBuf>,
    pub object_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "pyrite".to_owned(),
            size: (1600, 900),
            model_path: None,
            object_count: 24,
        }
    }
}

struct AppState {
    ctx: WgpuContext,
    renderer: Renderer,
    scene: Scene,
    camera: Camera,
    last_frame: Instant,
}

struct App {
    config: AppConfig,
    state: Option<AppState>,
    mouse_pressed: bool,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            mouse_pressed: false,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        let (width, height) = self.config.size;
        let attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let ctx = WgpuContext::new(window).block_on()?;
        let mut renderer = Renderer::new(&ctx);
        let scene = Scene::demo(
            &ctx,
            &mut renderer,
            self.config.model_path.as_deref(),
            self.config.object_count,
        )?;

        Ok(AppState {
            ctx,
            renderer,
            scene,
            camera: Camera::default(),
            last_frame: Instant::now(),
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let now = Instant::now();
        let dt = now.duration_since(state.last_frame).as_secs_f32();
        state.last_frame = now;
        state.scene.update(dt);

        match state.renderer.render(&state.ctx, &state.scene, &state.camera) {
            Ok(()) => {}
            Err(RenderError::Surface(
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
            )) => {
                let size = state.ctx.window.inner_size();
                state.ctx.resize(size);
                state.renderer.resize(&state.ctx);
            }
            Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                log::warn!("surface timeout, skipping frame");
            }
            Err(RenderError::Surface(err)) => {
                log::error!("unrecoverable surface error: {err}");
                event_loop.exit();
            }
            Err(RenderError::Draw(err)) => {
                log::error!("draw submission rejected: {err}");
                event_loop.exit();
            }
        }

        state.ctx.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => {
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("startup failed: {err:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.ctx.resize(size);
                    state.renderer.resize(&state.ctx);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(state) = self.state.as_mut() {
                    let size = state.ctx.window.inner_size();
                    state.ctx.resize(size);
                    state.renderer.resize(&state.ctx);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.mouse_pressed = state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(state) = self.state.as_mut() {
                    let lines = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                    };
                    state.camera.zoom(lines * ZOOM_SENSITIVITY);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (x, y) } = event {
            if !self.mouse_pressed {
                return;
            }
            if let Some(state) = self.state.as_mut() {
                state
                    .camera
                    .orbit(x as f32 * ORBIT_SENSITIVITY, y as f32 * ORBIT_SENSITIVITY);
            }
        }
    }
}

pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
