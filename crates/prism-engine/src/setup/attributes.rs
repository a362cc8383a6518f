use crate::context::{AttribLayout, BufferTarget, RenderContext};

use super::{AttributeSlot, IndexBuffer, SetupError, VertexBuffer};

/// Binds each buffer to its slot on the active program.
///
/// `buffers[i]` feeds `slots[i]`; both sequences must have the same length.
/// Every slot is declared tightly packed `f32` data with the slot's component
/// count. All bindings complete before this returns, so any draw issued
/// afterwards sees the full layout.
pub fn bind_attributes<C>(
    ctx: &mut C,
    buffers: &[&VertexBuffer],
    slots: &[AttributeSlot],
) -> Result<(), SetupError>
where
    C: RenderContext + ?Sized,
{
    if buffers.len() != slots.len() {
        return Err(SetupError::AttributeCountMismatch {
            buffers: buffers.len(),
            slots: slots.len(),
        });
    }

    for (buffer, slot) in buffers.iter().zip(slots) {
        ctx.bind_buffer(BufferTarget::Vertex, Some(buffer.handle()));
        ctx.enable_vertex_attrib(slot.location());
        ctx.vertex_attrib_pointer(slot.location(), AttribLayout::packed_f32(slot.components()));
        log::trace!(
            "attribute `{}` (location {}) <- {:?}, {} components",
            slot.name(),
            slot.location(),
            buffer.handle(),
            slot.components()
        );
    }

    Ok(())
}

/// Binds `indices` as the source for subsequent indexed draws.
pub fn bind_index_buffer<C>(ctx: &mut C, indices: &IndexBuffer)
where
    C: RenderContext + ?Sized,
{
    ctx.bind_buffer(BufferTarget::Index, Some(indices.handle()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AttribType, RecordingContext};
    use crate::setup::{compile_shader, link_program, upload_indices, upload_vertices, ShaderKind, ShaderSource};

    const VS: &str = "
        struct VertexOut {
            @builtin(position) clip: vec4<f32>,
            @location(0) color: vec4<f32>,
        };

        @vertex
        fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VertexOut {
            var out: VertexOut;
            out.clip = vec4<f32>(position, 1.0);
            out.color = color;
            return out;
        }
    ";

    const FS: &str = "
        @fragment
        fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
            return color;
        }
    ";

    fn slots(ctx: &mut RecordingContext) -> Vec<AttributeSlot> {
        let vs = compile_shader(ctx, &ShaderSource::new("vs", ShaderKind::Vertex, VS)).unwrap();
        let fs = compile_shader(ctx, &ShaderSource::new("fs", ShaderKind::Fragment, FS)).unwrap();
        let program = link_program(ctx, vs, fs).unwrap();
        vec![
            program.attribute(&*ctx, "position", 3).unwrap(),
            program.attribute(&*ctx, "color", 4).unwrap(),
        ]
    }

    #[test]
    fn binds_one_slot_per_buffer() {
        let mut ctx = RecordingContext::new();
        let slots = slots(&mut ctx);
        let positions = upload_vertices(&mut ctx, &[0.0; 9]);
        let colors = upload_vertices(&mut ctx, &[1.0; 12]);

        bind_attributes(&mut ctx, &[&positions, &colors], &slots).unwrap();

        let enabled = ctx.enabled_attributes();
        assert_eq!(enabled.len(), 2);
        assert_eq!(enabled[0].location, 0);
        assert_eq!(enabled[0].buffer, Some(positions.handle()));
        assert_eq!(enabled[0].layout.map(|l| l.components), Some(3));
        assert_eq!(enabled[1].location, 1);
        assert_eq!(enabled[1].buffer, Some(colors.handle()));
        assert_eq!(enabled[1].layout.map(|l| l.components), Some(4));

        let layout = enabled[1].layout.unwrap();
        assert_eq!(layout.kind, AttribType::F32);
        assert!(!layout.normalized);
        assert_eq!((layout.stride, layout.offset), (0, 0));
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn rebinding_is_idempotent() {
        let mut ctx = RecordingContext::new();
        let slots = slots(&mut ctx);
        let positions = upload_vertices(&mut ctx, &[0.0; 9]);
        let colors = upload_vertices(&mut ctx, &[1.0; 12]);

        bind_attributes(&mut ctx, &[&positions, &colors], &slots).unwrap();
        let first = ctx.enabled_attributes();
        bind_attributes(&mut ctx, &[&positions, &colors], &slots).unwrap();

        assert_eq!(ctx.enabled_attributes(), first);
    }

    #[test]
    fn mismatched_lengths_issue_no_calls() {
        let mut ctx = RecordingContext::new();
        let slots = slots(&mut ctx);
        let positions = upload_vertices(&mut ctx, &[0.0; 9]);
        let before = ctx.commands().len();

        let err = bind_attributes(&mut ctx, &[&positions], &slots).unwrap_err();
        assert!(matches!(err, SetupError::AttributeCountMismatch { buffers: 1, slots: 2 }));
        assert_eq!(ctx.commands().len(), before);
        assert!(ctx.enabled_attributes().is_empty());
    }

    #[test]
    fn index_buffer_stays_bound() {
        let mut ctx = RecordingContext::new();
        let ibo = upload_indices(&mut ctx, &[0, 1, 2]);
        bind_index_buffer(&mut ctx, &ibo);
        assert_eq!(ctx.bound_buffer(BufferTarget::Index), Some(ibo.handle()));
    }
}
