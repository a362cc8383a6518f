use std::time::Duration;

use glam::Vec3;
use prism_engine::context::RenderContext;
use prism_engine::render::{FrameRenderer, Geometry};
use prism_engine::setup::{bind_attributes, bind_index_buffer, upload_indices, upload_vertices, SetupError, ShaderLibrary};
use prism_engine::transform::{Camera, Perspective, Spin, TransformSet};

use crate::scene::{build_program, Scene};

pub const POSITIONS: [f32; 12] = [
    0.0, 1.0, 0.0, //
    1.0, 0.0, 0.0, //
    -1.0, 0.0, 0.0, //
    0.0, -1.0, 0.0,
];

pub const COLORS: [f32; 16] = [
    1.0, 0.0, 0.0, 1.0, //
    0.0, 1.0, 0.0, 1.0, //
    0.0, 0.0, 1.0, 1.0, //
    1.0, 1.0, 1.0, 1.0,
];

/// Two triangles sharing the 1-2 edge.
pub const INDICES: [u16; 6] = [0, 1, 2, 1, 2, 3];

pub const EYE: Vec3 = Vec3::new(0.0, 0.0, 5.0);
pub const FOVY_DEGREES: f32 = 45.0;
pub const AXIS: Vec3 = Vec3::new(2.0, 3.0, 1.0);

/// Indexed quad turning a quarter turn per second.
pub struct RotatingQuad {
    renderer: FrameRenderer,
    perspective: Perspective,
    geometry: Geometry,
    spin: Spin,
}

impl RotatingQuad {
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

        let indices = upload_indices(ctx, &INDICES);
        bind_index_buffer(ctx, &indices);

        let perspective = Perspective::new(FOVY_DEGREES, aspect, 0.1, 100.0);
        let transforms = TransformSet::from_camera(&Camera::looking_at_origin(EYE), &perspective);

        let spin = spin_about(AXIS)?;

        Ok(Self {
            renderer: FrameRenderer::new(mvp, transforms),
            perspective,
            geometry: Geometry::Indexed(indices),
            spin,
        })
    }
}

fn spin_about(axis: Vec3) -> Result<Spin, SetupError> {
    Spin::new(axis).ok_or(SetupError::DegenerateAxis(axis.to_array()))
}

impl Scene for RotatingQuad {
    fn draw(&mut self, ctx: &mut dyn RenderContext, elapsed: Duration) {
        self.renderer.draw_animated(ctx, &self.geometry, &self.spin, elapsed);
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.perspective = self.perspective.with_aspect(aspect);
        self.renderer.set_projection(self.perspective.matrix());
    }

    fn is_animated(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::builtin_shaders;
    use glam::Mat4;
    use prism_engine::context::{Command, IndexType, Primitive, RecordingContext};
    use std::f32::consts::FRAC_PI_2;

    fn setup() -> (RecordingContext, RotatingQuad) {
        let mut ctx = RecordingContext::new();
        let scene = RotatingQuad::setup(&mut ctx, &builtin_shaders().unwrap(), 1.0).unwrap();
        ctx.clear_commands();
        (ctx, scene)
    }

    #[test]
    fn one_indexed_draw_per_tick() {
        let (mut ctx, mut scene) = setup();
        scene.draw(&mut ctx, Duration::from_millis(16));

        let draws: Vec<_> = ctx.draw_calls().cloned().collect();
        assert_eq!(
            draws,
            [Command::DrawElements {
                mode: Primitive::Triangles,
                count: 6,
                index_type: IndexType::U16,
                offset: 0
            }]
        );
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn pose_after_one_second_is_quarter_turn() {
        let (mut ctx, mut scene) = setup();
        scene.draw(&mut ctx, Duration::from_secs(1));

        let model = Mat4::from_axis_angle(AXIS.normalize(), FRAC_PI_2);
        let pv = Perspective::new(45.0, 1.0, 0.1, 100.0).matrix() * Camera::looking_at_origin(EYE).view();

        let uploaded = ctx
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::UniformMatrix4 { matrix, .. } => Some(Mat4::from_cols_array(matrix)),
                _ => None,
            })
            .unwrap();
        assert!(uploaded.abs_diff_eq(pv * model, 1e-5));
    }

    #[test]
    fn zero_axis_fails_setup() {
        assert!(matches!(
            spin_about(Vec3::ZERO),
            Err(SetupError::DegenerateAxis(axis)) if axis == [0.0; 3]
        ));
        assert!(spin_about(AXIS).is_ok());
    }

    #[test]
    fn each_tick_clears_and_flushes() {
        let (mut ctx, mut scene) = setup();
        for ms in [0, 16, 33] {
            scene.draw(&mut ctx, Duration::from_millis(ms));
        }

        let clears = ctx.commands().iter().filter(|c| matches!(c, Command::Clear(_))).count();
        let flushes = ctx.commands().iter().filter(|c| matches!(c, Command::Flush)).count();
        assert_eq!((clears, flushes, ctx.draw_calls().count()), (3, 3, 3));
    }
}
