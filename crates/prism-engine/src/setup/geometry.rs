use crate::context::{BufferId, BufferTarget, BufferUsage, RenderContext};

/// GPU-resident per-vertex attribute data (`f32` components).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBuffer {
    handle: BufferId,
    len: usize,
}

impl VertexBuffer {
    pub fn handle(&self) -> BufferId {
        self.handle
    }

    /// Number of `f32` components uploaded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Vertex count when every vertex holds `components` floats.
    pub fn vertex_count(&self, components: u32) -> u32 {
        if components == 0 {
            return 0;
        }
        (self.len / components as usize) as u32
    }
}

/// GPU-resident `u16` indices into a [`VertexBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuffer {
    handle: BufferId,
    len: u32,
}

impl IndexBuffer {
    pub fn handle(&self) -> BufferId {
        self.handle
    }

    /// Number of indices uploaded.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Copies `data` into a new static vertex buffer.
///
/// The vertex target is left unbound afterwards.
pub fn upload_vertices<C>(ctx: &mut C, data: &[f32]) -> VertexBuffer
where
    C: RenderContext + ?Sized,
{
    let handle = upload(ctx, BufferTarget::Vertex, bytemuck::cast_slice(data));
    VertexBuffer {
        handle,
        len: data.len(),
    }
}

/// Copies `data` into a new static index buffer.
///
/// The index target is left unbound afterwards.
pub fn upload_indices<C>(ctx: &mut C, data: &[u16]) -> IndexBuffer
where
    C: RenderContext + ?Sized,
{
    let handle = upload(ctx, BufferTarget::Index, bytemuck::cast_slice(data));
    IndexBuffer {
        handle,
        len: data.len() as u32,
    }
}

fn upload<C>(ctx: &mut C, target: BufferTarget, bytes: &[u8]) -> BufferId
where
    C: RenderContext + ?Sized,
{
    let buffer = ctx.create_buffer();
    ctx.bind_buffer(target, Some(buffer));
    ctx.buffer_data(target, bytes, BufferUsage::Static);
    ctx.bind_buffer(target, None);

    log::trace!("uploaded {} bytes to {target:?} buffer {buffer:?}", bytes.len());
    buffer
}
