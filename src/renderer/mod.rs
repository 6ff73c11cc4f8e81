//! Board rendering
//!
//! `scene` builds triangle lists from board state; `pipeline` pushes them to
//! a WebGPU surface.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::board_vertices;
pub use vertex::Vertex;
