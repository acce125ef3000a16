use glam::{DVec3, Mat4};

/// World vertical axis. The camera never rolls, so `up` is always this.
pub const WORLD_UP: DVec3 = DVec3::Y;

/// Yaw offset (degrees) from the facing direction to the right-hand vector.
/// At yaw = -90° (facing -Z) this yields right = +X.
pub const RIGHT_YAW_OFFSET_DEG: f64 = 90.0;

/// First-person camera state. `front` and `right` are derived from
/// `yaw`/`pitch` and only change through [`Camera::set_orientation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    yaw: f64,
    pitch: f64,
    front: DVec3,
    right: DVec3,
    up: DVec3,
}

impl Camera {
    pub fn new(position: DVec3, yaw: f64, pitch: f64) -> Self {
        let mut camera = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            front: DVec3::NEG_Z,
            right: DVec3::X,
            up: WORLD_UP,
        };
        camera.set_orientation(yaw, pitch);
        camera
    }

    /// Yaw in degrees, unbounded.
    pub fn yaw(&self) -> f64 { self.yaw }

    /// Pitch in degrees.
    pub fn pitch(&self) -> f64 { self.pitch }

    pub fn front(&self) -> DVec3 { self.front }

    pub fn right(&self) -> DVec3 { self.right }

    pub fn up(&self) -> DVec3 { self.up }

    /// Store new angles and rebuild the orientation basis in one step.
    /// Pitch limiting is the caller's job.
    pub fn set_orientation(&mut self, yaw: f64, pitch: f64) {
        self.yaw = yaw;
        self.pitch = pitch;
        let (front, right) = orientation_basis(yaw, pitch);
        self.front = front;
        self.right = right;
    }

    pub fn view(&self) -> CameraView {
        CameraView {
            position: self.position,
            front: self.front,
            up: self.up,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }
}

/// Front and right unit vectors for the given yaw/pitch (degrees).
///
/// `right` only depends on yaw so it stays horizontal at any pitch.
pub fn orientation_basis(yaw_deg: f64, pitch_deg: f64) -> (DVec3, DVec3) {
    let yaw = yaw_deg.to_radians();
    let pitch = pitch_deg.to_radians();

    let front = DVec3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize();

    let right_yaw = (yaw_deg + RIGHT_YAW_OFFSET_DEG).to_radians();
    let right = DVec3::new(right_yaw.cos(), 0.0, right_yaw.sin());

    (front, right)
}

/// Snapshot of the camera handed to the renderer once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: DVec3,
    pub front: DVec3,
    pub up: DVec3,
    pub yaw: f64,
    pub pitch: f64,
}

impl CameraView {
    pub fn target(&self) -> DVec3 { self.position + self.front }

    /// Look-at transform from `position` toward `position + front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            self.position.as_vec3(),
            self.target().as_vec3(),
            self.up.as_vec3(),
        )
    }
}

/// Perspective projection. Only the aspect ratio changes at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov_y: 45f32.to_radians(),
            aspect: 1.0,
            z_near: 0.1,
            z_far: 100.0,
        };
        projection.set_aspect(width, height);
        projection
    }

    /// Returns false and keeps the old aspect for a zero-sized (minimized) window.
    pub fn set_aspect(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self, view: &CameraView) -> Mat4 {
        self.matrix() * view.view_matrix()
    }
}
