//! wgpu-based skydome cloud renderer.

pub mod camera;
pub mod driver;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod texture;
pub mod vertex;

pub use camera::{DomeUniforms, SkyCamera};
pub use driver::FrameDriver;
pub use mesh::{Mesh, MeshBuffers};
pub use renderer::{RenderError, RenderSettings, Renderer, ViewMode};
pub use texture::Texture;
pub use vertex::Vertex;
