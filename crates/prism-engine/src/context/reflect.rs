//! WGSL front-end shared by both context implementations.
//!
//! Parses and validates shader text with naga, then extracts the stage
//! interface (entry point, `@location` inputs/outputs, uniform bindings) that
//! the link step checks and that attribute/uniform queries read.

use naga::{AddressSpace, Binding, ScalarKind, ShaderStage, TypeInner, VectorSize};

use crate::setup::ShaderKind;

/// One `@location` input or output of an entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InterfaceVar {
    pub name: String,
    pub location: u32,
    /// Scalar/vector width; `0` for types that cannot be vertex data.
    pub components: u32,
    pub float: bool,
}

/// A `var<uniform>` declared by the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformVar {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub is_mat4: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ShaderInterface {
    pub kind: ShaderKind,
    pub entry_point: String,
    pub inputs: Vec<InterfaceVar>,
    pub outputs: Vec<InterfaceVar>,
    pub uniforms: Vec<UniformVar>,
}

/// Linked program interface.
#[derive(Debug, Clone)]
pub(crate) struct ProgramInterface {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Vertex inputs, sorted by location.
    pub attributes: Vec<InterfaceVar>,
    /// Uniforms of both stages, sorted by binding.
    pub uniforms: Vec<UniformVar>,
}

impl ProgramInterface {
    pub fn attribute(&self, name: &str) -> Option<&InterfaceVar> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformVar> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    pub fn has_uniform_binding(&self, binding: u32) -> bool {
        self.uniforms.iter().any(|u| u.binding == binding)
    }
}

/// Parses and validates `source`, returning the interface of its `kind` entry point.
///
/// `Err` holds a human-readable diagnostic with source excerpts.
pub(crate) fn compile(kind: ShaderKind, source: &str) -> Result<ShaderInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let stage = match kind {
        ShaderKind::Vertex => ShaderStage::Vertex,
        ShaderKind::Fragment => ShaderStage::Fragment,
    };

    let mut entry_points = module.entry_points.iter().filter(|ep| ep.stage == stage);
    let entry = entry_points
        .next()
        .ok_or_else(|| format!("no @{kind} entry point"))?;
    if let Some(extra) = entry_points.next() {
        return Err(format!(
            "multiple @{kind} entry points (`{}`, `{}`)",
            entry.name, extra.name
        ));
    }

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_locations(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_locations(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    inputs.sort_by_key(|v| v.location);
    outputs.sort_by_key(|v| v.location);

    let uniforms = module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            Some(UniformVar {
                name: var.name.clone().unwrap_or_default(),
                group: binding.group,
                binding: binding.binding,
                is_mat4: is_mat4(&module.types[var.ty].inner),
            })
        })
        .collect();

    Ok(ShaderInterface {
        kind,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        uniforms,
    })
}

/// Checks that `vertex` feeds `fragment` and merges their interfaces.
pub(crate) fn link(vertex: &ShaderInterface, fragment: &ShaderInterface) -> Result<ProgramInterface, String> {
    if vertex.kind != ShaderKind::Vertex {
        return Err(format!("{} shader attached as the vertex stage", vertex.kind));
    }
    if fragment.kind != ShaderKind::Fragment {
        return Err(format!("{} shader attached as the fragment stage", fragment.kind));
    }

    let mut errors = Vec::new();

    for input in &vertex.inputs {
        if input.components == 0 || !input.float {
            errors.push(format!(
                "vertex input `{}` at location {} must be an f32 scalar or vector",
                input.name, input.location
            ));
        }
    }

    for input in &fragment.inputs {
        match vertex.outputs.iter().find(|o| o.location == input.location) {
            None => errors.push(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            )),
            Some(output) if output.components != input.components => errors.push(format!(
                "location {} is {} components wide in the vertex stage but {} in the fragment stage",
                input.location, output.components, input.components
            )),
            Some(_) => {}
        }
    }

    let mut uniforms: Vec<UniformVar> = Vec::new();
    for u in vertex.uniforms.iter().chain(&fragment.uniforms) {
        if u.group != 0 {
            errors.push(format!("uniform `{}` must live in @group(0), found @group({})", u.name, u.group));
            continue;
        }
        if !u.is_mat4 {
            errors.push(format!("uniform `{}` must be mat4x4<f32>", u.name));
            continue;
        }
        match uniforms.iter().find(|seen| seen.binding == u.binding) {
            Some(seen) if seen.name != u.name => errors.push(format!(
                "@binding({}) is declared as both `{}` and `{}`",
                u.binding, seen.name, u.name
            )),
            Some(_) => {}
            None => uniforms.push(u.clone()),
        }
    }
    uniforms.sort_by_key(|u| u.binding);

    if !errors.is_empty() {
        return Err(errors.join("\n"));
    }

    Ok(ProgramInterface {
        vertex_entry: vertex.entry_point.clone(),
        fragment_entry: fragment.entry_point.clone(),
        attributes: vertex.inputs.clone(),
        uniforms,
    })
}

fn collect_locations(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<InterfaceVar>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(Binding::Location { location, .. }) => {
            let (components, float) = vector_shape(inner);
            out.push(InterfaceVar {
                name: name.unwrap_or_default().to_string(),
                location: *location,
                components,
                float,
            });
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = inner {
                for member in members {
                    collect_locations(module, member.name.as_deref(), member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn vector_shape(inner: &TypeInner) -> (u32, bool) {
    match inner {
        TypeInner::Scalar(scalar) => (1, scalar.kind == ScalarKind::Float && scalar.width == 4),
        TypeInner::Vector { size, scalar } => (
            *size as u32,
            scalar.kind == ScalarKind::Float && scalar.width == 4,
        ),
        _ => (0, false),
    }
}

fn is_mat4(inner: &TypeInner) -> bool {
    matches!(
        inner,
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar,
        } if scalar.kind == ScalarKind::Float && scalar.width == 4
    )
}
