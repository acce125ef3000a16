use std::sync::Arc;

use tracing::{debug, warn};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window};

use crate::controller::input::{Key, KeyAction, MouseButton};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Hidden and held in place; movement drives mouse look.
    Locked,
    /// Visible and free to leave the window.
    Free,
}

/// Window lifecycle and cursor control the frame loop depends on.
pub trait WindowContext {
    /// Returns false if the platform refused the request.
    fn set_cursor_mode(&self, mode: CursorMode) -> bool;

    /// Inner size in physical pixels.
    fn inner_size(&self) -> (u32, u32);

    fn center_cursor(&self);

    fn request_redraw(&self);
}

/// [`WindowContext`] backed by a winit window.
#[derive(Clone)]
pub struct WinitWindow {
    window: Arc<Window>,
}

impl WinitWindow {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl WindowContext for WinitWindow {
    fn set_cursor_mode(&self, mode: CursorMode) -> bool {
        match mode {
            CursorMode::Locked => {
                // Locked is unsupported on some platforms (X11, Windows); confine instead
                let grabbed = self
                    .window
                    .set_cursor_grab(CursorGrabMode::Locked)
                    .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
                match grabbed {
                    Ok(()) => {
                        self.window.set_cursor_visible(false);
                        true
                    }
                    Err(e) => {
                        warn!("cursor capture refused: {e}");
                        false
                    }
                }
            }
            CursorMode::Free => {
                if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
                    warn!("cursor release refused: {e}");
                }
                self.window.set_cursor_visible(true);
                true
            }
        }
    }

    fn inner_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn center_cursor(&self) {
        let (w, h) = self.inner_size();
        let center = PhysicalPosition::new(w as f64 / 2.0, h as f64 / 2.0);
        if let Err(e) = self.window.set_cursor_position(center) {
            debug!("could not center cursor: {e}");
        }
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

/// Map a winit physical key to the keys the core distinguishes.
pub fn key_from_winit(key: PhysicalKey) -> Key {
    match key {
        PhysicalKey::Code(KeyCode::KeyW) => Key::W,
        PhysicalKey::Code(KeyCode::KeyA) => Key::A,
        PhysicalKey::Code(KeyCode::KeyS) => Key::S,
        PhysicalKey::Code(KeyCode::KeyD) => Key::D,
        PhysicalKey::Code(KeyCode::ArrowUp) => Key::ArrowUp,
        PhysicalKey::Code(KeyCode::ArrowDown) => Key::ArrowDown,
        PhysicalKey::Code(KeyCode::ArrowLeft) => Key::ArrowLeft,
        PhysicalKey::Code(KeyCode::ArrowRight) => Key::ArrowRight,
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        _ => Key::Other,
    }
}

pub fn key_action_from_winit(state: ElementState, repeat: bool) -> KeyAction {
    match (state, repeat) {
        (ElementState::Released, _) => KeyAction::Release,
        (ElementState::Pressed, true) => KeyAction::Repeat,
        (ElementState::Pressed, false) => KeyAction::Press,
    }
}

pub fn mouse_button_from_winit(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}
