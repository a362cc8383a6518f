use std::time::Duration;

use glam::Mat4;

use crate::context::{ClearMask, IndexType, Primitive, RenderContext};
use crate::setup::{bind_index_buffer, UniformSlot};
use crate::transform::{Spin, TransformSet};

use super::{DrawableInstance, Geometry};

/// Draws instances with a shared view/projection through one mvp uniform.
///
/// Every draw is preceded by its own mvp upload, and every frame is cleared
/// first and flushed last.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    mvp: UniformSlot,
    transforms: TransformSet,
    clear_color: [f32; 4],
    clear_depth: f32,
}

impl FrameRenderer {
    /// Opaque black color clear, depth cleared to 1.0.
    pub fn new(mvp: UniformSlot, transforms: TransformSet) -> Self {
        Self {
            mvp,
            transforms,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            clear_depth: 1.0,
        }
    }

    pub fn with_clear_color(mut self, rgba: [f32; 4]) -> Self {
        self.clear_color = rgba;
        self
    }

    pub fn with_clear_depth(mut self, depth: f32) -> Self {
        self.clear_depth = depth;
        self
    }

    pub fn transforms(&self) -> &TransformSet {
        &self.transforms
    }

    /// Replaces the projection, e.g. after the window aspect changed.
    pub fn set_projection(&mut self, projection: Mat4) {
        self.transforms.set_projection(projection);
    }

    pub fn clear<C>(&self, ctx: &mut C)
    where
        C: RenderContext + ?Sized,
    {
        ctx.clear_color(self.clear_color);
        ctx.clear_depth(self.clear_depth);
        ctx.clear(ClearMask::COLOR_DEPTH);
    }

    /// Uploads the instance's mvp, then issues its draw.
    pub fn draw_instance<C>(&mut self, ctx: &mut C, instance: &DrawableInstance)
    where
        C: RenderContext + ?Sized,
    {
        self.transforms.set_model(instance.model);
        ctx.uniform_matrix4(self.mvp.location(), &self.transforms.mvp_cols());

        match &instance.geometry {
            Geometry::Arrays { first, count } => ctx.draw_arrays(Primitive::Triangles, *first, *count),
            Geometry::Indexed(indices) => {
                bind_index_buffer(ctx, indices);
                ctx.draw_elements(Primitive::Triangles, indices.len(), IndexType::U16, 0);
            }
        }
    }

    /// One complete static frame: clear, one draw per instance, flush.
    pub fn draw_static<C>(&mut self, ctx: &mut C, instances: &[DrawableInstance])
    where
        C: RenderContext + ?Sized,
    {
        self.clear(ctx);
        for instance in instances {
            self.draw_instance(ctx, instance);
        }
        ctx.flush();
        log::trace!("static frame: {} draws", instances.len());
    }

    /// One animation tick: `geometry` rotated by `spin` for `elapsed`.
    pub fn draw_animated<C>(&mut self, ctx: &mut C, geometry: &Geometry, spin: &Spin, elapsed: Duration)
    where
        C: RenderContext + ?Sized,
    {
        self.clear(ctx);
        let instance = DrawableInstance::new(geometry.clone(), spin.model_at(elapsed));
        self.draw_instance(ctx, &instance);
        ctx.flush();
    }
}
