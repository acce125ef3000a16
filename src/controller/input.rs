/// Platform-agnostic input state
use std::fmt;
use std::str::FromStr;

/// Keys the core cares about. Everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

/// The four movement directions tracked by [`KeyState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
}

impl fmt::Display for MovementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MovementKey::Forward => "forward",
            MovementKey::Back => "back",
            MovementKey::StrafeLeft => "strafe-left",
            MovementKey::StrafeRight => "strafe-right",
        };
        f.write_str(name)
    }
}

/// Pressed flags for the movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
}

impl KeyState {
    pub fn is_pressed(&self, key: MovementKey) -> bool {
        match key {
            MovementKey::Forward => self.forward,
            MovementKey::Back => self.back,
            MovementKey::StrafeLeft => self.strafe_left,
            MovementKey::StrafeRight => self.strafe_right,
        }
    }

    pub fn set(&mut self, key: MovementKey, pressed: bool) {
        match key {
            MovementKey::Forward => self.forward = pressed,
            MovementKey::Back => self.back = pressed,
            MovementKey::StrafeLeft => self.strafe_left = pressed,
            MovementKey::StrafeRight => self.strafe_right = pressed,
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.back || self.strafe_left || self.strafe_right
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: Key,
    pub back: Key,
    pub strafe_left: Key,
    pub strafe_right: Key,
    pub release_cursor: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            back: Key::S,
            strafe_left: Key::A,
            strafe_right: Key::D,
            release_cursor: Key::Escape,
        }
    }
}

impl KeyBindings {
    /// Arrow keys for movement, Escape still releases the cursor.
    pub fn arrows() -> Self {
        Self {
            forward: Key::ArrowUp,
            back: Key::ArrowDown,
            strafe_left: Key::ArrowLeft,
            strafe_right: Key::ArrowRight,
            ..Self::default()
        }
    }

    pub fn movement_for(&self, key: Key) -> Option<MovementKey> {
        if key == Key::Other {
            return None;
        }
        if key == self.forward {
            Some(MovementKey::Forward)
        } else if key == self.back {
            Some(MovementKey::Back)
        } else if key == self.strafe_left {
            Some(MovementKey::StrafeLeft)
        } else if key == self.strafe_right {
            Some(MovementKey::StrafeRight)
        } else {
            None
        }
    }

    pub fn is_release_cursor(&self, key: Key) -> bool {
        key != Key::Other && key == self.release_cursor
    }
}

impl FromStr for KeyBindings {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wasd" => Ok(Self::default()),
            "arrows" => Ok(Self::arrows()),
            other => Err(format!("unknown key layout '{other}'")),
        }
    }
}

/// Written by the event callbacks, read once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keys: KeyState,
    /// Last raw cursor position reported by the window, if any.
    pub cursor: Option<(f64, f64)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update movement flags. Returns the movement key that was affected;
    /// keys without a movement binding are ignored.
    pub fn apply_key(
        &mut self,
        bindings: &KeyBindings,
        key: Key,
        action: KeyAction,
    ) -> Option<MovementKey> {
        let movement = bindings.movement_for(key)?;
        match action {
            KeyAction::Press | KeyAction::Repeat => self.keys.set(movement, true),
            KeyAction::Release => self.keys.set(movement, false),
        }
        Some(movement)
    }

    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = Some((x, y));
    }

    pub fn clear_keys(&mut self) {
        self.keys.clear();
    }
}
