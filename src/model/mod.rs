// MODEL: Camera state and world geometry
pub mod camera;
pub mod world;

pub use camera::{Camera, CameraView, Projection};
pub use world::{Cube, Mesh, Vertex, World};
