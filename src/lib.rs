pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::{AppConfig, Timestep};
pub use error::{AppError, RenderError};
