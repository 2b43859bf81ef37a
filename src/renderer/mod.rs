//! WebGPU rendering module
//!
//! Tessellates snapshot shapes into a flat-colored triangle list.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use vertex::Vertex;
