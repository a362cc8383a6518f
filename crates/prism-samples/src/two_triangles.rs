use std::time::Duration;

use glam::{Mat4, Vec3};
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

/// Red, green, blue corners.
pub const COLORS: [f32; 12] = [
    1.0, 0.0, 0.0, 1.0, //
    0.0, 1.0, 0.0, 1.0, //
    0.0, 0.0, 1.0, 1.0,
];

pub const EYE: Vec3 = Vec3::new(0.0, 0.0, 3.0);
pub const FOVY_DEGREES: f32 = 90.0;
pub const OFFSETS: [f32; 2] = [1.5, -1.5];

/// The same colored triangle placed twice, right then left.
pub struct TwoTriangles {
    renderer: FrameRenderer,
    perspective: Perspective,
    instances: Vec<DrawableInstance>,
}

impl TwoTriangles {
    pub fn setup(ctx: &mut dyn RenderContext, shaders: &ShaderLibrary, aspect: f32) -> Result<Self, SetupError> {
        let program = build_program(ctx, shaders, "color.vert", "color.frag")?;
        let slots = [
            program.attribute(&*ctx, "position", 3)?,
            program.attribute(&*ctx, "color", 4)?,
        ];
        let mvp = program.uniform(&*ctx, "mvp_matrix")?;

        let positions = upload_vertices(ctx, &POSITIONS);
        let colors = upload_vertices(ctx, &COLORS);
        bind_attributes(ctx, &[&positions, &colors], &slots)?;

        let perspective = Perspective::new(FOVY_DEGREES, aspect, 0.1, 100.0);
        let transforms = TransformSet::from_camera(&Camera::looking_at_origin(EYE), &perspective);

        let count = positions.vertex_count(3);
        let instances = OFFSETS
            .iter()
            .map(|&x| DrawableInstance::new(Geometry::arrays(count), Mat4::from_translation(Vec3::new(x, 0.0, 0.0))))
            .collect();

        Ok(Self {
            renderer: FrameRenderer::new(mvp, transforms),
            perspective,
            instances,
        })
    }
}

impl Scene for TwoTriangles {
    fn draw(&mut self, ctx: &mut dyn RenderContext, _elapsed: Duration) {
        self.renderer.draw_static(ctx, &self.instances);
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
    use prism_engine::context::{Command, RecordingContext};

    fn drawn() -> RecordingContext {
        let mut ctx = RecordingContext::new();
        let mut scene = TwoTriangles::setup(&mut ctx, &builtin_shaders().unwrap(), 1.0).unwrap();
        ctx.clear_commands();
        scene.draw(&mut ctx, Duration::ZERO);
        ctx
    }

    #[test]
    fn two_draws_each_after_its_own_upload() {
        let ctx = drawn();
        let cmds = ctx.commands();

        let draws: Vec<usize> = cmds
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_draw())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(draws.len(), 2);

        for &i in &draws {
            assert!(matches!(cmds[i - 1], Command::UniformMatrix4 { .. }), "draw {i} not preceded by upload");
            assert!(matches!(cmds[i], Command::DrawArrays { first: 0, count: 3, .. }));
        }
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn instances_sit_either_side_of_origin() {
        let ctx = drawn();
        let pv = Perspective::new(90.0, 1.0, 0.1, 100.0).matrix() * Camera::looking_at_origin(EYE).view();

        let uploads: Vec<Mat4> = ctx
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::UniformMatrix4 { matrix, .. } => Some(Mat4::from_cols_array(matrix)),
                _ => None,
            })
            .collect();

        assert_eq!(uploads.len(), 2);
        for (upload, x) in uploads.iter().zip(OFFSETS) {
            let expected = pv * Mat4::from_translation(Vec3::new(x, 0.0, 0.0));
            assert!(upload.abs_diff_eq(expected, 1e-5));
        }
    }

    #[test]
    fn both_attributes_enabled() {
        let ctx = drawn();
        let enabled = ctx.enabled_attributes();
        let components: Vec<_> = enabled.iter().map(|a| a.layout.map(|l| l.components)).collect();
        assert_eq!(components, [Some(3), Some(4)]);
    }
}
