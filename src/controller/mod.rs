// CONTROLLER: Input, camera control, and update loop
pub mod input;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{InputState, KeyBindings, KeyState, MovementKey};
pub use camera_controller::{CameraController, MouseTracking};
pub use frame_loop::{FrameLoop, InputCallbacks, LoopState};
