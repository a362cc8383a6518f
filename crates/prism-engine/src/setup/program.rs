use crate::context::{ProgramId, RenderContext, UniformLocation};

use super::{CompiledShader, SetupError, ShaderKind};

/// A linked vertex + fragment program.
///
/// Owns the two compiled shaders it was linked from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    handle: ProgramId,
    vertex: CompiledShader,
    fragment: CompiledShader,
}

impl Program {
    pub fn handle(&self) -> ProgramId {
        self.handle
    }

    pub fn vertex(&self) -> &CompiledShader {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledShader {
        &self.fragment
    }

    /// Resolves the input slot named `name`, declaring it `components` wide.
    pub fn attribute<C>(&self, ctx: &C, name: &str, components: u32) -> Result<AttributeSlot, SetupError>
    where
        C: RenderContext + ?Sized,
    {
        if !(1..=4).contains(&components) {
            return Err(SetupError::InvalidComponents {
                name: name.to_string(),
                components,
            });
        }

        let location = ctx
            .attrib_location(self.handle, name)
            .ok_or_else(|| SetupError::UnknownAttribute(name.to_string()))?;

        Ok(AttributeSlot {
            name: name.to_string(),
            location,
            components,
        })
    }

    /// Resolves the uniform named `name`.
    pub fn uniform<C>(&self, ctx: &C, name: &str) -> Result<UniformSlot, SetupError>
    where
        C: RenderContext + ?Sized,
    {
        let location = ctx
            .uniform_location(self.handle, name)
            .ok_or_else(|| SetupError::UnknownUniform(name.to_string()))?;

        Ok(UniformSlot {
            name: name.to_string(),
            location,
        })
    }
}

/// Program input slot for per-vertex data. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    name: String,
    location: u32,
    components: u32,
}

impl AttributeSlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> u32 {
        self.location
    }

    /// Number of `f32` components per vertex.
    pub fn components(&self) -> u32 {
        self.components
    }
}

/// Per-draw program input, such as a transform matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    name: String,
    location: UniformLocation,
}

impl UniformSlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> UniformLocation {
        self.location
    }
}

/// Links `vertex` and `fragment` and activates the result.
///
/// Stage mismatches are reported as link failures. The linker's info log is
/// reported through the logger and returned in [`SetupError::ProgramLink`].
pub fn link_program<C>(
    ctx: &mut C,
    vertex: CompiledShader,
    fragment: CompiledShader,
) -> Result<Program, SetupError>
where
    C: RenderContext + ?Sized,
{
    let link_error = |log: String| {
        log::error!(
            "program `{}` + `{}` failed to link:\n{log}",
            vertex.source_id(),
            fragment.source_id()
        );
        SetupError::ProgramLink {
            vertex: vertex.source_id().to_string(),
            fragment: fragment.source_id().to_string(),
            log,
        }
    };

    if vertex.kind() != ShaderKind::Vertex {
        return Err(link_error(format!(
            "`{}` is a {} shader attached as the vertex stage",
            vertex.source_id(),
            vertex.kind()
        )));
    }
    if fragment.kind() != ShaderKind::Fragment {
        return Err(link_error(format!(
            "`{}` is a {} shader attached as the fragment stage",
            fragment.source_id(),
            fragment.kind()
        )));
    }

    let handle = ctx
        .link_program(vertex.handle(), fragment.handle())
        .map_err(link_error)?;

    ctx.use_program(handle);
    log::debug!(
        "linked program {handle:?} from `{}` + `{}`",
        vertex.source_id(),
        fragment.source_id()
    );

    Ok(Program {
        handle,
        vertex,
        fragment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RecordingContext;
    use crate::setup::{compile_shader, ShaderSource};

    const VS: &str = "
        struct VertexOut {
            @builtin(position) clip: vec4<f32>,
            @location(0) color: vec4<f32>,
        };

        @group(0) @binding(0) var<uniform> mvp_matrix: mat4x4<f32>;

        @vertex
        fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VertexOut {
            var out: VertexOut;
            out.clip = mvp_matrix * vec4<f32>(position, 1.0);
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

    const FS_NEEDS_UV: &str = "
        @fragment
        fn fs_main(@location(3) uv: vec2<f32>) -> @location(0) vec4<f32> {
            return vec4<f32>(uv, 0.0, 1.0);
        }
    ";

    fn compile(ctx: &mut RecordingContext, id: &str, kind: ShaderKind, text: &str) -> CompiledShader {
        compile_shader(ctx, &ShaderSource::new(id, kind, text)).unwrap()
    }

    #[test]
    fn link_activates_program() {
        let mut ctx = RecordingContext::new();
        let vs = compile(&mut ctx, "vs", ShaderKind::Vertex, VS);
        let fs = compile(&mut ctx, "fs", ShaderKind::Fragment, FS);

        let program = link_program(&mut ctx, vs, fs).unwrap();
        assert_eq!(ctx.active_program(), Some(program.handle()));
    }

    #[test]
    fn resolves_attributes_and_uniforms() {
        let mut ctx = RecordingContext::new();
        let vs = compile(&mut ctx, "vs", ShaderKind::Vertex, VS);
        let fs = compile(&mut ctx, "fs", ShaderKind::Fragment, FS);
        let program = link_program(&mut ctx, vs, fs).unwrap();

        let position = program.attribute(&ctx, "position", 3).unwrap();
        let color = program.attribute(&ctx, "color", 4).unwrap();
        assert_eq!((position.location(), position.components()), (0, 3));
        assert_eq!((color.location(), color.components()), (1, 4));

        assert!(program.uniform(&ctx, "mvp_matrix").is_ok());
        assert!(matches!(
            program.uniform(&ctx, "model"),
            Err(SetupError::UnknownUniform(_))
        ));
        assert!(matches!(
            program.attribute(&ctx, "normal", 3),
            Err(SetupError::UnknownAttribute(_))
        ));
        assert!(matches!(
            program.attribute(&ctx, "position", 5),
            Err(SetupError::InvalidComponents { .. })
        ));
    }

    #[test]
    fn swapped_stages_fail_to_link() {
        let mut ctx = RecordingContext::new();
        let vs = compile(&mut ctx, "vs", ShaderKind::Vertex, VS);
        let fs = compile(&mut ctx, "fs", ShaderKind::Fragment, FS);

        let err = link_program(&mut ctx, fs, vs).unwrap_err();
        assert!(matches!(err, SetupError::ProgramLink { .. }));
        assert_eq!(ctx.active_program(), None);
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let mut ctx = RecordingContext::new();
        let vs = compile(&mut ctx, "vs", ShaderKind::Vertex, VS);
        let fs = compile(&mut ctx, "fs", ShaderKind::Fragment, FS_NEEDS_UV);

        match link_program(&mut ctx, vs, fs).unwrap_err() {
            SetupError::ProgramLink { log, .. } => assert!(log.contains("location 3")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.active_program(), None);
        assert_eq!(ctx.info_logs().len(), 1);
    }
}
