//! Rendering-surface capability set.
//!
//! [`RenderContext`] is the fixed surface the setup and render layers call
//! into: shader/program objects, buffer objects, attribute and uniform state,
//! clears and draw calls. It is shaped after a bind-to-edit graphics API so
//! that state (active program, bound buffers, enabled attributes) lives in the
//! context and is passed explicitly rather than captured from globals.
//!
//! Implementations:
//! - [`GpuContext`]: wgpu-backed, renders to a window surface.
//! - [`RecordingContext`]: headless; validates shaders and records every call.
//!
//! Shaders are WGSL. Attribute and uniform locations are the `@location` and
//! `@binding` numbers the shader declares; both backends reflect them with
//! naga at link time.

mod gpu;
mod recording;
pub(crate) mod reflect;

pub use gpu::GpuContext;
pub use recording::{AttribState, Command, RecordingContext};

use crate::setup::ShaderKind;

/// Opaque compiled-shader handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ShaderId(pub(crate) u32);

/// Opaque linked-program handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ProgramId(pub(crate) u32);

/// Opaque buffer-object handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BufferId(pub(crate) u32);

/// Program-specific uniform location.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub(crate) program: ProgramId,
    pub(crate) binding: u32,
}

impl UniformLocation {
    pub fn program(self) -> ProgramId {
        self.program
    }

    /// Binding number declared by the shader.
    pub fn binding(self) -> u32 {
        self.binding
    }
}

/// Buffer binding point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Vertex,
    /// Element indices for indexed draws.
    Index,
}

/// Expected update frequency of a buffer's contents.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    Static,
    /// Rewritten occasionally.
    Dynamic,
}

/// Numeric type of attribute components.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttribType {
    F32,
}

/// Memory layout of one attribute within its buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttribLayout {
    pub components: u32,
    pub kind: AttribType,
    pub normalized: bool,
    /// Byte distance between consecutive vertices; `0` means tightly packed.
    pub stride: u32,
    /// Byte offset of the first component.
    pub offset: u32,
}

impl AttribLayout {
    /// Tightly packed, non-interleaved `f32` components.
    pub const fn packed_f32(components: u32) -> Self {
        Self {
            components,
            kind: AttribType::F32,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    /// Stride in bytes with the packed case resolved.
    pub fn effective_stride(&self) -> u32 {
        if self.stride == 0 {
            self.components * 4
        } else {
            self.stride
        }
    }

    /// Number of whole vertices this layout reads from a buffer of `len` bytes.
    pub fn vertex_capacity(&self, len: u64) -> u64 {
        let element = u64::from(self.components) * 4;
        let start = u64::from(self.offset);
        if len < start + element {
            return 0;
        }
        (len - start - element) / u64::from(self.effective_stride()) + 1
    }
}

/// Primitive assembly mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Triangles,
}

/// Element index width.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexType {
    U16,
}

impl IndexType {
    pub fn size_bytes(self) -> u64 {
        match self {
            Self::U16 => 2,
        }
    }
}

/// Buffers affected by [`RenderContext::clear`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR_DEPTH: Self = Self { color: true, depth: true };
}

/// Graphics capability surface used by setup and rendering.
///
/// State set through one call (bound buffer, active program, enabled
/// attributes) persists until changed. Draw calls read the state current at
/// the time they are issued. Misuse (e.g. uploading with no buffer bound) is
/// recorded by the implementation and the call is ignored, mirroring how a
/// bind-to-edit API reports errors out of band.
pub trait RenderContext {
    /// Compiles `source` for `kind`. `Err` carries the compiler info log.
    fn compile_shader(&mut self, kind: ShaderKind, source: &str) -> Result<ShaderId, String>;

    /// Links a vertex and a fragment shader. `Err` carries the linker info log.
    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String>;

    /// Makes `program` the active program for subsequent draws.
    fn use_program(&mut self, program: ProgramId);

    /// Location of the vertex input named `name`, if the program declares it.
    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32>;

    /// Location of the uniform named `name`, if the program declares it.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn create_buffer(&mut self) -> BufferId;

    /// Binds `buffer` to `target`, or unbinds the target with `None`.
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);

    /// Replaces the contents of the buffer bound to `target`.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    fn enable_vertex_attrib(&mut self, location: u32);

    /// Declares the layout of `location`, sourced from the buffer currently
    /// bound to [`BufferTarget::Vertex`].
    fn vertex_attrib_pointer(&mut self, location: u32, layout: AttribLayout);

    /// Uploads a column-major 4x4 matrix to `location` of the active program.
    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]);

    fn clear_color(&mut self, rgba: [f32; 4]);

    fn clear_depth(&mut self, depth: f32);

    fn clear(&mut self, mask: ClearMask);

    /// Draws `count` vertices starting at `first`.
    fn draw_arrays(&mut self, mode: Primitive, first: u32, count: u32);

    /// Draws `count` indices from the bound index buffer, starting `offset`
    /// bytes in.
    fn draw_elements(&mut self, mode: Primitive, count: u32, index_type: IndexType, offset: u64);

    /// Submits all work issued so far.
    fn flush(&mut self);
}
