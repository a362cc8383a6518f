use std::time::Duration;

use glam::Vec3;
use prism_engine::context::RenderContext;
use prism_engine::render::{DrawableInstance, FrameRenderer, Geometry};
use prism_engine::setup::{bind_attributes, upload_vertices, SetupError, ShaderLibrary};
use prism_engine::transform::{Camera, Perspective, TransformSet};

use crate::scene::{build_program, Scene};

pub const POSITIONS: [f32; 9] = [
    0.0, 1.0, 0.0, //
    1.0, 0.0, 0.0, //
    -1.0, 0.0, 0.0,
];

pub const EYE: Vec3 = Vec3::new(0.0, 1.0, 3.0);
pub const FOVY_DEGREES: f32 = 90.0;

/// Single white triangle seen from slightly above.
pub struct Triangle {
    renderer: FrameRenderer,
    perspective: Perspective,
    instance: DrawableInstance,
}

impl Triangle {
    pub fn setup(ctx: &mut dyn RenderContext, shaders: &ShaderLibrary, aspect: f32) -> Result<Self, SetupError> {
        let program = build_program(ctx, shaders, "position.vert", "white.frag")?;
        let position = program.attribute(&*ctx, "position", 3)?;
        let mvp = program.uniform(&*ctx, "mvp_matrix")?;

        let vbo = upload_vertices(ctx, &POSITIONS);
        bind_attributes(ctx, &[&vbo], &[position])?;

        let perspective = Perspective::new(FOVY_DEGREES, aspect, 0.1, 100.0);
        let transforms = TransformSet::from_camera(&Camera::looking_at_origin(EYE), &perspective);

        Ok(Self {
            renderer: FrameRenderer::new(mvp, transforms),
            perspective,
            instance: DrawableInstance::at_origin(Geometry::arrays(vbo.vertex_count(3))),
        })
    }
}

impl Scene for Triangle {
    fn draw(&mut self, ctx: &mut dyn RenderContext, _elapsed: Duration) {
        self.renderer.draw_static(ctx, std::slice::from_ref(&self.instance));
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.perspective = self.perspective.with_aspect(aspect);
        self.renderer.set_projection(self.perspective.matrix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::builtin_shaders;
    use prism_engine::context::{Command, Primitive, RecordingContext};

    #[test]
    fn draws_one_triangle() {
        let mut ctx = RecordingContext::new();
        let mut scene = Triangle::setup(&mut ctx, &builtin_shaders().unwrap(), 1.0).unwrap();
        ctx.clear_commands();

        scene.draw(&mut ctx, Duration::ZERO);

        let draws: Vec<_> = ctx.draw_calls().cloned().collect();
        assert_eq!(
            draws,
            [Command::DrawArrays {
                mode: Primitive::Triangles,
                first: 0,
                count: 3
            }]
        );
        assert_eq!(ctx.commands().last(), Some(&Command::Flush));
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn uploads_view_projection() {
        let mut ctx = RecordingContext::new();
        let mut scene = Triangle::setup(&mut ctx, &builtin_shaders().unwrap(), 1.0).unwrap();
        scene.draw(&mut ctx, Duration::ZERO);

        let expected = Perspective::new(90.0, 1.0, 0.1, 100.0).matrix() * Camera::looking_at_origin(EYE).view();
        let uploaded = ctx
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::UniformMatrix4 { matrix, .. } => Some(*matrix),
                _ => None,
            })
            .unwrap();
        assert!(glam::Mat4::from_cols_array(&uploaded).abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn aspect_change_updates_projection() {
        let mut ctx = RecordingContext::new();
        let mut scene = Triangle::setup(&mut ctx, &builtin_shaders().unwrap(), 1.0).unwrap();
        scene.set_aspect(2.0);

        let expected = Perspective::new(90.0, 2.0, 0.1, 100.0).matrix();
        assert!(scene.renderer.transforms().projection().abs_diff_eq(expected, 1e-6));
    }
}
