use glam::DVec3;
use tracing::trace;

use crate::controller::input::{KeyState, MovementKey};
use crate::model::{Camera, CameraView};

/// Sign applied to `right` for the strafe-right key. Negative keeps the
/// reference behaviour where the strafe-right key moves along -right.
pub const STRAFE_SIGN: f64 = -1.0;

/// Screen Y grows downward while pitch grows upward.
pub const VERTICAL_LOOK_SIGN: f64 = -1.0;

/// Pitch is hard-clamped to +/- this many degrees.
pub const PITCH_LIMIT_DEG: f64 = 89.0;

/// Cursor bookkeeping for turning absolute positions into deltas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseTracking {
    pub first_sample_pending: bool,
    pub last_cursor: (f64, f64),
}

impl Default for MouseTracking {
    fn default() -> Self {
        Self {
            first_sample_pending: true,
            last_cursor: (0.0, 0.0),
        }
    }
}

/// Handles camera movement and orientation
#[derive(Debug, Clone)]
pub struct CameraController {
    camera: Camera,
    mouse: MouseTracking,
}

impl CameraController {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            mouse: MouseTracking::default(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mouse_tracking(&self) -> &MouseTracking {
        &self.mouse
    }

    pub fn view(&self) -> CameraView {
        self.camera.view()
    }

    /// Forget the last cursor sample so the next one only seeds the tracker.
    pub fn reset_mouse_tracking(&mut self) {
        self.mouse.first_sample_pending = true;
    }

    /// Apply an absolute cursor position to yaw/pitch.
    pub fn on_mouse_move(&mut self, raw_x: f64, raw_y: f64, sensitivity: f64) {
        if self.mouse.first_sample_pending {
            self.mouse.last_cursor = (raw_x, raw_y);
            self.mouse.first_sample_pending = false;
            return;
        }

        let (last_x, last_y) = self.mouse.last_cursor;
        let dx = (raw_x - last_x) * sensitivity;
        let dy = VERTICAL_LOOK_SIGN * (raw_y - last_y) * sensitivity;
        self.mouse.last_cursor = (raw_x, raw_y);

        let yaw = self.camera.yaw() + dx;
        let pitch = (self.camera.pitch() + dy).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.camera.set_orientation(yaw, pitch);

        trace!(yaw, pitch, "camera look");
    }

    /// Move the camera in the horizontal plane for one step of `speed` units.
    ///
    /// Diagonal input is not normalized, so two keys give `speed * sqrt(2)`.
    pub fn update_position(&mut self, keys: &KeyState, speed: f64) {
        if !keys.any() {
            return;
        }

        let front = horizontal(self.camera.front());
        let right = horizontal(self.camera.right());
        let position = &mut self.camera.position;

        if keys.is_pressed(MovementKey::Forward) {
            *position += front * speed;
        }
        if keys.is_pressed(MovementKey::Back) {
            *position -= front * speed;
        }
        if keys.is_pressed(MovementKey::StrafeRight) {
            *position += right * (STRAFE_SIGN * speed);
        }
        if keys.is_pressed(MovementKey::StrafeLeft) {
            *position -= right * (STRAFE_SIGN * speed);
        }

        trace!(x = position.x, y = position.y, z = position.z, "camera moved");
    }
}

/// Walking camera: vertical look never moves the eye up or down.
fn horizontal(v: DVec3) -> DVec3 {
    DVec3::new(v.x, 0.0, v.z)
}
