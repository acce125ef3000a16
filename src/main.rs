use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use fpscene::controller::{FrameLoop, InputCallbacks};
use fpscene::model::World;
use fpscene::view::window::{key_action_from_winit, key_from_winit, mouse_button_from_winit};
use fpscene::view::{WgpuRenderer, WindowContext, WinitWindow};
use fpscene::{logging, AppConfig, AppError};

struct Running {
    window: Arc<Window>,
    frame_loop: FrameLoop<WinitWindow, WgpuRenderer>,
    last_frame: Instant,
}

struct App {
    config: AppConfig,
    world: World,
    running: Option<Running>,
    init_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            world: World::default(),
            running: None,
            init_error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(attributes).map_err(AppError::from)?);

        let renderer = pollster::block_on(WgpuRenderer::new(window.clone(), &self.world))
            .context("failed to initialize renderer")?;

        let frame_loop = FrameLoop::new(WinitWindow::new(window.clone()), renderer, self.config.clone());
        Ok(Running {
            window,
            frame_loop,
            last_frame: Instant::now(),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                info!(title = %self.config.title, "window created");
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => {
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else { return };
        if window_id != running.window.id() {
            return;
        }
        let frame_loop = &mut running.frame_loop;

        // HUD gets first pick only while the cursor is free
        let consumed = frame_loop.renderer_mut().on_window_event(&event);
        if consumed && !frame_loop.cursor_captured() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                frame_loop.request_close();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => frame_loop.on_resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key, state, repeat, .. },
                ..
            } => frame_loop.on_key(key_from_winit(physical_key), key_action_from_winit(state, repeat)),
            WindowEvent::MouseInput { state, button, .. } => {
                frame_loop.on_mouse_button(mouse_button_from_winit(button), key_action_from_winit(state, false))
            }
            // while captured, look input comes from raw device motion
            WindowEvent::CursorMoved { position, .. } if !frame_loop.cursor_captured() => {
                frame_loop.on_cursor_move(position.x, position.y)
            }
            WindowEvent::Focused(focused) => frame_loop.on_focus_changed(focused),
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - running.last_frame).as_secs_f64();
                running.last_frame = now;

                let captured = frame_loop.cursor_captured();
                frame_loop.renderer_mut().set_cursor_captured(captured);
                frame_loop.frame(dt);
                if !frame_loop.is_running() {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let (Some(running), DeviceEvent::MouseMotion { delta }) = (self.running.as_mut(), event) {
            running.frame_loop.on_mouse_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.frame_loop.window().request_redraw();
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    info!(?config, "starting");

    let event_loop = EventLoop::new().map_err(AppError::from)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).map_err(AppError::from)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
