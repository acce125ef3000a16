use std::str::FromStr;

use glam::DVec3;
use tracing::warn;

use crate::controller::input::KeyBindings;

/// Longest frame accepted by [`Timestep::PerSecond`], in seconds.
pub const MAX_FRAME_DT: f64 = 0.1;

/// How `movement_speed` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timestep {
    /// Units per frame; effective speed depends on frame rate.
    #[default]
    PerFrame,
    /// Units per second, scaled by the frame's elapsed time.
    PerSecond,
}

impl Timestep {
    /// Displacement for one frame that took `dt` seconds.
    pub fn step(self, speed: f64, dt: f64) -> f64 {
        match self {
            Timestep::PerFrame => speed,
            Timestep::PerSecond => speed * dt.clamp(0.0, MAX_FRAME_DT),
        }
    }
}

impl FromStr for Timestep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frame" | "per-frame" => Ok(Timestep::PerFrame),
            "second" | "seconds" | "per-second" => Ok(Timestep::PerSecond),
            other => Err(format!("unknown timestep '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub movement_speed: f64,
    pub mouse_sensitivity: f64,
    pub timestep: Timestep,
    pub start_position: DVec3,
    pub start_yaw: f64,
    pub start_pitch: f64,
    pub bindings: KeyBindings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "First-Person 3D Space".to_string(),
            movement_speed: 0.03,
            mouse_sensitivity: 0.1,
            timestep: Timestep::PerFrame,
            // eye height of a standing person, facing -Z
            start_position: DVec3::new(0.0, 1.7, 0.0),
            start_yaw: -90.0,
            start_pitch: 0.0,
            bindings: KeyBindings::default(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `FPSCENE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(w) = parse_var::<u32, _, _>(&lookup, "FPSCENE_WIDTH", |v| *v > 0) {
            config.width = w;
        }
        if let Some(h) = parse_var::<u32, _, _>(&lookup, "FPSCENE_HEIGHT", |v| *v > 0) {
            config.height = h;
        }
        if let Some(speed) = parse_var::<f64, _, _>(&lookup, "FPSCENE_MOVE_SPEED", |v| v.is_finite() && *v > 0.0) {
            config.movement_speed = speed;
        }
        if let Some(sens) = parse_var::<f64, _, _>(&lookup, "FPSCENE_MOUSE_SENSITIVITY", |v| v.is_finite() && *v > 0.0) {
            config.mouse_sensitivity = sens;
        }
        if let Some(ts) = parse_var::<Timestep, _, _>(&lookup, "FPSCENE_TIMESTEP", |_| true) {
            config.timestep = ts;
        }
        if let Some(bindings) = parse_var::<KeyBindings, _, _>(&lookup, "FPSCENE_KEYS", |_| true) {
            config.bindings = bindings;
        }

        config
    }
}

fn parse_var<T, F, V>(lookup: &F, name: &str, valid: V) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
    V: Fn(&T) -> bool,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Some(value),
        _ => {
            warn!(var = name, value = %raw, "ignoring invalid config value, keeping default");
            None
        }
    }
}
