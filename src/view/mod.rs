// VIEW: Window, GPU and drawing
pub mod window;
pub mod render;
pub mod gpu_init;
pub mod mesh;

pub use window::{CursorMode, WindowContext, WinitWindow};
pub use render::{SceneRenderer, WgpuRenderer};
pub use gpu_init::GpuContext;
pub use mesh::MeshBuffer;
