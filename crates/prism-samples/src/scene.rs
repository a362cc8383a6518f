use std::time::Duration;

use prism_engine::context::RenderContext;
use prism_engine::setup::{compile_named, link_program, Program, SetupError, ShaderLibrary, ShaderSource};

use crate::rotating_quad::RotatingQuad;
use crate::triangle::Triangle;
use crate::two_triangles::TwoTriangles;

/// A sample whose GPU resources are already set up.
pub trait Scene {
    /// Draws one complete frame. Static scenes ignore `elapsed`.
    fn draw(&mut self, ctx: &mut dyn RenderContext, elapsed: Duration);

    /// Rebuilds the projection for a new surface aspect ratio.
    fn set_aspect(&mut self, aspect: f32);

    fn is_animated(&self) -> bool {
        false
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, clap::ValueEnum)]
pub enum Sample {
    /// One white triangle.
    Triangle,
    /// One vertex-colored triangle drawn twice, side by side.
    TwoTriangles,
    /// Indexed four-vertex quad spinning about (2, 3, 1).
    RotatingQuad,
}

impl Sample {
    pub fn name(self) -> &'static str {
        match self {
            Self::Triangle => "triangle",
            Self::TwoTriangles => "two-triangles",
            Self::RotatingQuad => "rotating-quad",
        }
    }

    /// Runs the sample's setup sequence; the first failing step aborts it.
    pub fn build(
        self,
        ctx: &mut dyn RenderContext,
        shaders: &ShaderLibrary,
        aspect: f32,
    ) -> Result<Box<dyn Scene>, SetupError> {
        Ok(match self {
            Self::Triangle => Box::new(Triangle::setup(ctx, shaders, aspect)?),
            Self::TwoTriangles => Box::new(TwoTriangles::setup(ctx, shaders, aspect)?),
            Self::RotatingQuad => Box::new(RotatingQuad::setup(ctx, shaders, aspect)?),
        })
    }
}

/// Shaders compiled into the binary, keyed like files in a shader directory.
pub fn builtin_shaders() -> Result<ShaderLibrary, SetupError> {
    let sources = [
        ("position.vert", "x-shader/x-vertex", include_str!("../shaders/position.vert.wgsl")),
        ("white.frag", "x-shader/x-fragment", include_str!("../shaders/white.frag.wgsl")),
        ("color.vert", "x-shader/x-vertex", include_str!("../shaders/color.vert.wgsl")),
        ("color.frag", "x-shader/x-fragment", include_str!("../shaders/color.frag.wgsl")),
    ];

    let mut library = ShaderLibrary::new();
    for (id, declared, text) in sources {
        library.insert(ShaderSource::declared(id, declared, text)?);
    }
    Ok(library)
}

/// Compiles `vertex` and `fragment` from `shaders` and links them.
pub fn build_program(
    ctx: &mut dyn RenderContext,
    shaders: &ShaderLibrary,
    vertex: &str,
    fragment: &str,
) -> Result<Program, SetupError> {
    let vs = compile_named(ctx, shaders, vertex)?;
    let fs = compile_named(ctx, shaders, fragment)?;
    link_program(ctx, vs, fs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::context::RecordingContext;

    #[test]
    fn builtin_shaders_compile_and_link() {
        let shaders = builtin_shaders().unwrap();
        assert_eq!(shaders.len(), 4);

        let mut ctx = RecordingContext::new();
        build_program(&mut ctx, &shaders, "position.vert", "white.frag").unwrap();
        build_program(&mut ctx, &shaders, "color.vert", "color.frag").unwrap();
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn shader_dir_matches_builtins() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders");
        let loaded = ShaderLibrary::load_dir(&dir).unwrap();
        let builtin = builtin_shaders().unwrap();

        for id in ["position.vert", "white.frag", "color.vert", "color.frag"] {
            assert_eq!(loaded.get(id).unwrap(), builtin.get(id).unwrap());
        }
    }

    #[test]
    fn missing_shader_stops_setup() {
        let mut ctx = RecordingContext::new();
        let shaders = ShaderLibrary::new();

        let err = Sample::Triangle.build(&mut ctx, &shaders, 1.0).err().unwrap();
        assert!(matches!(err, SetupError::MissingSource(id) if id == "position.vert"));
        assert_eq!(ctx.draw_calls().count(), 0);
    }

    #[test]
    fn every_sample_builds() {
        let shaders = builtin_shaders().unwrap();
        for sample in [Sample::Triangle, Sample::TwoTriangles, Sample::RotatingQuad] {
            let mut ctx = RecordingContext::new();
            let scene = sample.build(&mut ctx, &shaders, 4.0 / 3.0).unwrap();
            assert_eq!(scene.is_animated(), sample == Sample::RotatingQuad, "{}", sample.name());
        }
    }
}
