use thiserror::Error;

/// Fatal startup failures. Any of these ends the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to initialize the windowing system")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open GPU device")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    UnsupportedSurface,
}

/// Per-frame rendering failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("surface lost or outdated")]
    SurfaceLost,

    #[error("timed out acquiring the next frame")]
    Timeout,

    #[error("out of GPU memory")]
    OutOfMemory,

    #[error("render failed: {0}")]
    Other(String),
}

impl RenderError {
    /// Errors the frame loop cannot continue after.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::OutOfMemory)
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => RenderError::SurfaceLost,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(other.to_string()),
        }
    }
}
