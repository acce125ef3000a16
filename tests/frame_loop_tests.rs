use std::cell::RefCell;
use std::rc::Rc;

use fpscene::controller::input::{Key, KeyAction, MouseButton};
use fpscene::controller::{FrameLoop, InputCallbacks, KeyBindings, LoopState};
use fpscene::model::CameraView;
use fpscene::view::{CursorMode, SceneRenderer, WindowContext};
use fpscene::{AppConfig, RenderError, Timestep};

/// Shared log of what the loop asked its collaborators to do.
#[derive(Default)]
struct Calls {
    cursor_modes: Vec<CursorMode>,
    rendered: Vec<CameraView>,
    resized: Vec<(u32, u32)>,
}

struct FakeWindow(Rc<RefCell<Calls>>);

impl WindowContext for FakeWindow {
    fn set_cursor_mode(&self, mode: CursorMode) -> bool {
        self.0.borrow_mut().cursor_modes.push(mode);
        true
    }

    fn inner_size(&self) -> (u32, u32) {
        (800, 600)
    }

    fn center_cursor(&self) {}

    fn request_redraw(&self) {}
}

struct FakeRenderer(Rc<RefCell<Calls>>);

impl SceneRenderer for FakeRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.0.borrow_mut().resized.push((width, height));
    }

    fn render(&mut self, view: &CameraView) -> Result<(), RenderError> {
        self.0.borrow_mut().rendered.push(*view);
        Ok(())
    }
}

fn setup(config: AppConfig) -> (FrameLoop<FakeWindow, FakeRenderer>, Rc<RefCell<Calls>>) {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let frame_loop = FrameLoop::new(FakeWindow(calls.clone()), FakeRenderer(calls.clone()), config);
    (frame_loop, calls)
}

#[test]
fn walk_forward_then_turn_and_strafe() {
    let (mut fl, calls) = setup(AppConfig::default());

    fl.on_key(Key::W, KeyAction::Press);
    for _ in 0..10 {
        fl.frame(1.0 / 60.0);
    }
    fl.on_key(Key::W, KeyAction::Release);

    let z_after_walk = fl.camera_view().position.z;
    assert!((z_after_walk - (-0.3)).abs() < 1e-9);

    // seed, then turn right 90 degrees
    fl.on_cursor_move(400.0, 300.0);
    fl.on_cursor_move(1300.0, 300.0);
    let view = fl.camera_view();
    assert!(view.yaw.abs() < 1e-9);
    assert!((view.front.x - 1.0).abs() < 1e-9);

    fl.on_key(Key::W, KeyAction::Press);
    fl.frame(1.0 / 60.0);
    let p = fl.camera_view().position;
    assert!((p.x - 0.03).abs() < 1e-9);
    assert!((p.z - z_after_walk).abs() < 1e-9);
    assert_eq!(p.y, 1.7);

    assert_eq!(calls.borrow().rendered.len(), 11);
}

#[test]
fn held_keys_repeat_without_changing_state() {
    let (mut fl, _calls) = setup(AppConfig::default());
    fl.on_key(Key::S, KeyAction::Press);
    fl.on_key(Key::S, KeyAction::Repeat);
    fl.on_key(Key::S, KeyAction::Repeat);
    fl.frame(0.016);
    assert!((fl.camera_view().position.z - 0.03).abs() < 1e-12);
}

#[test]
fn unbound_keys_are_ignored() {
    let (mut fl, _calls) = setup(AppConfig::default());
    fl.on_key(Key::ArrowUp, KeyAction::Press);
    fl.on_key(Key::Other, KeyAction::Press);
    fl.frame(0.016);
    assert_eq!(fl.camera_view().position, AppConfig::default().start_position);
}

#[test]
fn escape_and_click_toggle_capture() {
    let (mut fl, calls) = setup(AppConfig::default());
    assert!(fl.cursor_captured());

    fl.on_key(Key::Escape, KeyAction::Press);
    assert!(!fl.cursor_captured());

    // motion while free does not turn the camera
    fl.on_mouse_motion(100.0, 100.0);
    assert_eq!(fl.camera_view().yaw, -90.0);

    fl.on_mouse_button(MouseButton::Right, KeyAction::Press);
    assert!(!fl.cursor_captured());
    fl.on_mouse_button(MouseButton::Left, KeyAction::Press);
    assert!(fl.cursor_captured());

    assert_eq!(
        calls.borrow().cursor_modes,
        vec![CursorMode::Locked, CursorMode::Free, CursorMode::Locked]
    );
}

#[test]
fn per_second_timestep_is_frame_rate_independent() {
    let config = AppConfig {
        movement_speed: 1.5,
        timestep: Timestep::PerSecond,
        ..AppConfig::default()
    };

    let (mut fast, _) = setup(config.clone());
    fast.on_key(Key::W, KeyAction::Press);
    for _ in 0..60 {
        fast.frame(1.0 / 60.0);
    }

    let (mut slow, _) = setup(config);
    slow.on_key(Key::W, KeyAction::Press);
    for _ in 0..20 {
        slow.frame(1.0 / 20.0);
    }

    let a = fast.camera_view().position.z;
    let b = slow.camera_view().position.z;
    assert!((a - (-1.5)).abs() < 1e-9);
    assert!((a - b).abs() < 1e-9);
}

#[test]
fn long_stalls_are_clamped() {
    let config = AppConfig {
        movement_speed: 1.0,
        timestep: Timestep::PerSecond,
        ..AppConfig::default()
    };
    let (mut fl, _) = setup(config);
    fl.on_key(Key::W, KeyAction::Press);
    fl.frame(5.0);
    assert!((fl.camera_view().position.z - (-0.1)).abs() < 1e-9);
}

#[test]
fn resize_then_close() {
    let (mut fl, calls) = setup(AppConfig::default());
    fl.on_resize(0, 0);
    fl.on_resize(1920, 1080);
    assert_eq!(calls.borrow().resized, vec![(0, 0), (1920, 1080)]);

    fl.frame(0.0);
    fl.request_close();
    fl.request_close();
    assert_eq!(fl.state(), LoopState::Terminated);
    fl.frame(0.0);
    assert_eq!(calls.borrow().rendered.len(), 1);
}

#[test]
fn focus_loss_stops_movement() {
    let (mut fl, _) = setup(AppConfig::default());
    fl.on_key(Key::D, KeyAction::Press);
    fl.frame(0.0);
    let after_one = fl.camera_view().position;
    fl.on_focus_changed(false);
    fl.frame(0.0);
    assert_eq!(fl.camera_view().position, after_one);
    assert!(!fl.cursor_captured());

    // regaining focus alone does not recapture
    fl.on_focus_changed(true);
    assert!(!fl.cursor_captured());
}

#[test]
fn arrow_layout_drives_movement() {
    let config = AppConfig {
        bindings: KeyBindings::arrows(),
        ..AppConfig::default()
    };
    let (mut fl, _) = setup(config);

    fl.on_key(Key::W, KeyAction::Press);
    fl.frame(0.0);
    assert_eq!(fl.camera_view().position, AppConfig::default().start_position);

    fl.on_key(Key::ArrowUp, KeyAction::Press);
    fl.frame(0.0);
    assert!((fl.camera_view().position.z - (-0.03)).abs() < 1e-12);

    fl.on_key(Key::ArrowUp, KeyAction::Release);
    fl.on_key(Key::ArrowRight, KeyAction::Press);
    fl.frame(0.0);
    assert!(fl.camera_view().position.x < 0.0);
}
