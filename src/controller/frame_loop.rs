use tracing::{debug, error, info, trace, warn};

use crate::config::AppConfig;
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{InputState, Key, KeyAction, MouseButton};
use crate::model::{Camera, CameraView};
use crate::view::render::SceneRenderer;
use crate::view::window::{CursorMode, WindowContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Callbacks the window provider invokes while polling events.
pub trait InputCallbacks {
    fn on_key(&mut self, key: Key, action: KeyAction);

    fn on_mouse_button(&mut self, button: MouseButton, action: KeyAction);

    /// Absolute cursor position in window pixels.
    fn on_cursor_move(&mut self, x: f64, y: f64);

    fn on_resize(&mut self, width: u32, height: u32);
}

/// Owns all per-run state and drives one update + render per frame.
pub struct FrameLoop<W: WindowContext, R: SceneRenderer> {
    window: W,
    renderer: R,
    config: AppConfig,
    input: InputState,
    controller: CameraController,
    state: LoopState,
    cursor_captured: bool,
    frame_count: u64,
}

impl<W: WindowContext, R: SceneRenderer> FrameLoop<W, R> {
    /// Centers and captures the cursor, as on startup of the original scene.
    pub fn new(window: W, renderer: R, config: AppConfig) -> Self {
        let camera = Camera::new(config.start_position, config.start_yaw, config.start_pitch);
        let mut frame_loop = Self {
            window,
            renderer,
            config,
            input: InputState::new(),
            controller: CameraController::new(camera),
            state: LoopState::Running,
            cursor_captured: false,
            frame_count: 0,
        };
        frame_loop.window.center_cursor();
        frame_loop.set_cursor_mode(CursorMode::Locked);
        info!(
            width = frame_loop.config.width,
            height = frame_loop.config.height,
            timestep = ?frame_loop.config.timestep,
            "frame loop started"
        );
        frame_loop
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn cursor_captured(&self) -> bool {
        self.cursor_captured
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn camera_view(&self) -> CameraView {
        self.controller.view()
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Window-close signal. Running -> Terminated, never back.
    pub fn request_close(&mut self) {
        if self.state == LoopState::Running {
            info!(frames = self.frame_count, "close requested, terminating frame loop");
            self.state = LoopState::Terminated;
        }
    }

    /// One iteration after events have been polled: move the camera, then
    /// render and present. `dt` is the elapsed time since the previous frame.
    pub fn frame(&mut self, dt: f64) {
        if self.state == LoopState::Terminated {
            return;
        }

        let step = self.config.timestep.step(self.config.movement_speed, dt);
        self.controller.update_position(&self.input.keys, step);

        let view = self.controller.view();
        match self.renderer.render(&view) {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                error!("fatal render error: {e}");
                self.state = LoopState::Terminated;
                return;
            }
            Err(e) => warn!("frame skipped: {e}"),
        }
        self.frame_count += 1;
    }

    /// Relative pointer motion (raw device deltas). While captured the deltas
    /// are accumulated into a virtual cursor and fed to [`InputCallbacks::on_cursor_move`].
    pub fn on_mouse_motion(&mut self, dx: f64, dy: f64) {
        if !self.cursor_captured {
            return;
        }
        let (x, y) = self.input.cursor.unwrap_or((0.0, 0.0));
        self.on_cursor_move(x + dx, y + dy);
    }

    /// Focus loss drops held keys and releases the cursor.
    pub fn on_focus_changed(&mut self, focused: bool) {
        if !focused {
            debug!("focus lost, clearing keys");
            self.input.clear_keys();
            self.set_cursor_mode(CursorMode::Free);
        }
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) {
        let accepted = self.window.set_cursor_mode(mode);
        match mode {
            CursorMode::Locked => {
                if accepted && !self.cursor_captured {
                    self.controller.reset_mouse_tracking();
                }
                self.cursor_captured = accepted;
            }
            CursorMode::Free => self.cursor_captured = false,
        }
        debug!(?mode, captured = self.cursor_captured, "cursor mode changed");
    }
}

impl<W: WindowContext, R: SceneRenderer> InputCallbacks for FrameLoop<W, R> {
    fn on_key(&mut self, key: Key, action: KeyAction) {
        if let Some(movement) = self.input.apply_key(&self.config.bindings, key, action) {
            trace!(%movement, ?action, "movement key");
        }

        if action == KeyAction::Press && self.config.bindings.is_release_cursor(key) {
            self.set_cursor_mode(CursorMode::Free);
        }
    }

    fn on_mouse_button(&mut self, button: MouseButton, action: KeyAction) {
        if button == MouseButton::Left && action == KeyAction::Press {
            self.set_cursor_mode(CursorMode::Locked);
        }
    }

    fn on_cursor_move(&mut self, x: f64, y: f64) {
        self.input.set_cursor(x, y);
        if self.cursor_captured {
            self.controller
                .on_mouse_move(x, y, self.config.mouse_sensitivity);
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "resize");
        self.renderer.resize(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timestep;
    use crate::error::RenderError;
    use std::cell::{Cell, RefCell};

    struct MockWindow {
        accept_capture: bool,
        modes: RefCell<Vec<CursorMode>>,
        centered: Cell<u32>,
    }

    impl MockWindow {
        fn new(accept_capture: bool) -> Self {
            Self { accept_capture, modes: RefCell::new(Vec::new()), centered: Cell::new(0) }
        }
    }

    impl WindowContext for MockWindow {
        fn set_cursor_mode(&self, mode: CursorMode) -> bool {
            self.modes.borrow_mut().push(mode);
            mode == CursorMode::Free || self.accept_capture
        }
        fn inner_size(&self) -> (u32, u32) { (800, 600) }
        fn center_cursor(&self) { self.centered.set(self.centered.get() + 1); }
        fn request_redraw(&self) {}
    }

    #[derive(Default)]
    struct MockRenderer {
        views: Vec<CameraView>,
        sizes: Vec<(u32, u32)>,
        fail_with: Option<RenderError>,
    }

    impl SceneRenderer for MockRenderer {
        fn resize(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }
        fn render(&mut self, view: &CameraView) -> Result<(), RenderError> {
            self.views.push(*view);
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn new_loop() -> FrameLoop<MockWindow, MockRenderer> {
        FrameLoop::new(MockWindow::new(true), MockRenderer::default(), AppConfig::default())
    }

    #[test]
    fn startup_centers_and_captures() {
        let fl = new_loop();
        assert!(fl.is_running());
        assert!(fl.cursor_captured());
        assert_eq!(fl.window().centered.get(), 1);
        assert_eq!(*fl.window().modes.borrow(), vec![CursorMode::Locked]);
    }

    #[test]
    fn frame_moves_before_rendering() {
        let mut fl = new_loop();
        fl.on_key(Key::W, KeyAction::Press);
        fl.frame(0.016);
        let rendered = fl.renderer().views[0];
        assert!((rendered.position.z - (-0.03)).abs() < 1e-12);
        assert_eq!(fl.frame_count(), 1);
    }

    #[test]
    fn per_frame_speed_ignores_dt() {
        let mut fl = new_loop();
        fl.on_key(Key::W, KeyAction::Press);
        fl.frame(0.001);
        fl.frame(1.0);
        assert!((fl.camera_view().position.z - (-0.06)).abs() < 1e-12);
    }

    #[test]
    fn per_second_speed_scales_with_dt() {
        let config = AppConfig {
            movement_speed: 2.0,
            timestep: Timestep::PerSecond,
            ..AppConfig::default()
        };
        let mut fl = FrameLoop::new(MockWindow::new(true), MockRenderer::default(), config);
        fl.on_key(Key::S, KeyAction::Press);
        fl.frame(0.05);
        assert!((fl.camera_view().position.z - 0.1).abs() < 1e-12);
    }

    #[test]
    fn close_terminates_and_stops_rendering() {
        let mut fl = new_loop();
        fl.frame(0.0);
        fl.request_close();
        assert_eq!(fl.state(), LoopState::Terminated);
        fl.frame(0.0);
        assert_eq!(fl.renderer().views.len(), 1);
    }

    #[test]
    fn fatal_render_error_terminates() {
        let renderer = MockRenderer { fail_with: Some(RenderError::OutOfMemory), ..Default::default() };
        let mut fl = FrameLoop::new(MockWindow::new(true), renderer, AppConfig::default());
        fl.frame(0.0);
        assert_eq!(fl.state(), LoopState::Terminated);
    }

    #[test]
    fn recoverable_render_error_keeps_running() {
        let renderer = MockRenderer { fail_with: Some(RenderError::SurfaceLost), ..Default::default() };
        let mut fl = FrameLoop::new(MockWindow::new(true), renderer, AppConfig::default());
        fl.frame(0.0);
        fl.frame(0.0);
        assert!(fl.is_running());
        assert_eq!(fl.renderer().views.len(), 2);
    }

    #[test]
    fn escape_releases_and_click_recaptures_with_fresh_tracking() {
        let mut fl = new_loop();
        fl.on_cursor_move(100.0, 100.0);
        fl.on_cursor_move(110.0, 100.0);
        let yaw = fl.camera_view().yaw;
        assert!((yaw - (-89.0)).abs() < 1e-9);

        fl.on_key(Key::Escape, KeyAction::Press);
        assert!(!fl.cursor_captured());
        fl.on_cursor_move(500.0, 500.0);
        assert_eq!(fl.camera_view().yaw, yaw);
        assert_eq!(fl.input().cursor, Some((500.0, 500.0)));

        fl.on_mouse_button(MouseButton::Left, KeyAction::Press);
        assert!(fl.cursor_captured());
        assert!(fl.controller().mouse_tracking().first_sample_pending);
        fl.on_cursor_move(900.0, 0.0);
        assert_eq!(fl.camera_view().yaw, yaw);
    }

    #[test]
    fn refused_capture_leaves_look_disabled() {
        let mut fl = FrameLoop::new(MockWindow::new(false), MockRenderer::default(), AppConfig::default());
        assert!(!fl.cursor_captured());
        fl.on_cursor_move(0.0, 0.0);
        fl.on_cursor_move(50.0, 50.0);
        assert_eq!(fl.camera_view().yaw, -90.0);
    }

    #[test]
    fn mouse_motion_accumulates_into_virtual_cursor() {
        let mut fl = new_loop();
        fl.on_mouse_motion(5.0, 0.0);
        fl.on_mouse_motion(10.0, -20.0);
        assert_eq!(fl.input().cursor, Some((15.0, -20.0)));
        assert!((fl.camera_view().yaw - (-89.0)).abs() < 1e-9);
        assert!((fl.camera_view().pitch - 2.0).abs() < 1e-9);
    }

    #[test]
    fn focus_loss_clears_keys_and_releases_cursor() {
        let mut fl = new_loop();
        fl.on_key(Key::W, KeyAction::Press);
        fl.on_key(Key::A, KeyAction::Press);
        fl.on_focus_changed(false);
        assert!(!fl.input().keys.any());
        assert!(!fl.cursor_captured());
    }

    #[test]
    fn resize_is_forwarded_to_renderer() {
        let mut fl = new_loop();
        fl.on_resize(1024, 768);
        assert_eq!(fl.renderer().sizes, vec![(1024, 768)]);
        assert_eq!(fl.camera_view().position, AppConfig::default().start_position);
    }
}
