//! One-shot GPU resource setup.
//!
//! Shader compilation, program linking, buffer upload and attribute binding,
//! each taking an explicit [`RenderContext`](crate::context::RenderContext).
//! Every step returns `Result`; the first failure ends the setup sequence.

mod attributes;
mod error;
mod geometry;
mod program;
mod shader;

pub use attributes::{bind_attributes, bind_index_buffer};
pub use error::SetupError;
pub use geometry::{upload_indices, upload_vertices, IndexBuffer, VertexBuffer};
pub use program::{link_program, AttributeSlot, Program, UniformSlot};
pub use shader::{compile_named, compile_shader, CompiledShader, ShaderKind, ShaderLibrary, ShaderSource};
