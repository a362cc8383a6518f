use std::collections::{BTreeMap, HashMap};

use crate::setup::ShaderKind;

use super::reflect::{self, ProgramInterface, ShaderInterface};
use super::{
    AttribLayout, BufferId, BufferTarget, BufferUsage, ClearMask, IndexType, Primitive, ProgramId,
    RenderContext, ShaderId, UniformLocation,
};

/// One call made against a [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CompileShader { shader: Option<ShaderId>, kind: ShaderKind, ok: bool },
    LinkProgram { program: Option<ProgramId>, ok: bool },
    UseProgram(ProgramId),
    CreateBuffer(BufferId),
    BindBuffer { target: BufferTarget, buffer: Option<BufferId> },
    BufferData { target: BufferTarget, buffer: BufferId, len: usize, usage: BufferUsage },
    EnableVertexAttrib(u32),
    VertexAttribPointer { location: u32, layout: AttribLayout },
    UniformMatrix4 { location: UniformLocation, matrix: [f32; 16] },
    ClearColor([f32; 4]),
    ClearDepth(f32),
    Clear(ClearMask),
    DrawArrays { mode: Primitive, first: u32, count: u32 },
    DrawElements { mode: Primitive, count: u32, index_type: IndexType, offset: u64 },
    Flush,
}

impl Command {
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawArrays { .. } | Self::DrawElements { .. })
    }
}

/// Vertex attribute slot state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttribState {
    pub location: u32,
    pub enabled: bool,
    /// Buffer that was bound to the vertex target when the layout was declared.
    pub buffer: Option<BufferId>,
    pub layout: Option<AttribLayout>,
}

#[derive(Debug, Default)]
struct BufferObject {
    bytes: Vec<u8>,
    usage: Option<BufferUsage>,
}

/// Headless [`RenderContext`].
///
/// Compiles and links for real (WGSL through naga), tracks the same state a
/// GPU context would, and appends every call to a command log. Misuse that a
/// GPU API would flag is collected in [`errors`](Self::errors) and the call
/// is dropped.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<Command>,
    info_logs: Vec<String>,
    errors: Vec<String>,

    shaders: Vec<ShaderInterface>,
    programs: Vec<ProgramInterface>,
    buffers: Vec<BufferObject>,

    active_program: Option<ProgramId>,
    bound_vertex: Option<BufferId>,
    bound_index: Option<BufferId>,
    attribs: BTreeMap<u32, AttribState>,
    uniforms: HashMap<UniformLocation, [f32; 16]>,

    clear_color: [f32; 4],
    clear_depth: f32,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            clear_depth: 1.0,
            ..Self::default()
        }
    }

    /// Every call in issue order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Draw calls in issue order.
    pub fn draw_calls(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| c.is_draw())
    }

    /// Compiler and linker diagnostics of failed compile/link calls.
    pub fn info_logs(&self) -> &[String] {
        &self.info_logs
    }

    /// API misuse detected so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Forgets recorded commands; state is kept.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn active_program(&self) -> Option<ProgramId> {
        self.active_program
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        match target {
            BufferTarget::Vertex => self.bound_vertex,
            BufferTarget::Index => self.bound_index,
        }
    }

    pub fn buffer_contents(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(buffer.0 as usize).map(|b| b.bytes.as_slice())
    }

    /// Enabled attribute slots, sorted by location.
    pub fn enabled_attributes(&self) -> Vec<AttribState> {
        self.attribs.values().filter(|a| a.enabled).cloned().collect()
    }

    /// Last matrix uploaded to `location`.
    pub fn uniform(&self, location: UniformLocation) -> Option<&[f32; 16]> {
        self.uniforms.get(&location)
    }

    pub fn clear_values(&self) -> ([f32; 4], f32) {
        (self.clear_color, self.clear_depth)
    }

    fn error(&mut self, message: String) {
        log::warn!("recording context: {message}");
        self.errors.push(message);
    }

    fn bound(&self, target: BufferTarget) -> Option<BufferId> {
        self.bound_buffer(target)
    }

    fn program(&self, program: ProgramId) -> Option<&ProgramInterface> {
        self.programs.get(program.0 as usize)
    }

    /// Checks the state a draw reads; returns `false` if the draw must be dropped.
    fn validate_draw(&mut self) -> bool {
        let Some(program) = self.active_program else {
            self.error("draw issued with no active program".to_string());
            return false;
        };

        let Some(iface) = self.program(program) else {
            self.error(format!("active program {program:?} does not exist"));
            return false;
        };

        let missing: Vec<String> = iface
            .attributes
            .iter()
            .filter(|attr| {
                self.attribs
                    .get(&attr.location)
                    .is_none_or(|s| !s.enabled || s.buffer.is_none() || s.layout.is_none())
            })
            .map(|attr| format!("`{}` (location {})", attr.name, attr.location))
            .collect();

        if !missing.is_empty() {
            self.error(format!("draw with unbound attributes: {}", missing.join(", ")));
            return false;
        }
        true
    }

    /// First active attribute whose buffer holds fewer than `end` vertices.
    fn vertex_shortfall(&self, end: u32) -> Option<String> {
        let iface = self.program(self.active_program?)?;
        iface.attributes.iter().find_map(|attr| {
            let state = self.attribs.get(&attr.location)?;
            let len = self.buffer_contents(state.buffer?)?.len() as u64;
            let capacity = state.layout?.vertex_capacity(len);
            (u64::from(end) > capacity).then(|| format!("`{}` ({capacity} vertices)", attr.name))
        })
    }
}

impl RenderContext for RecordingContext {
    fn compile_shader(&mut self, kind: ShaderKind, source: &str) -> Result<ShaderId, String> {
        match reflect::compile(kind, source) {
            Ok(iface) => {
                let id = ShaderId(self.shaders.len() as u32);
                self.shaders.push(iface);
                self.commands.push(Command::CompileShader { shader: Some(id), kind, ok: true });
                Ok(id)
            }
            Err(log) => {
                self.commands.push(Command::CompileShader { shader: None, kind, ok: false });
                self.info_logs.push(log.clone());
                Err(log)
            }
        }
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String> {
        let result = match (self.shaders.get(vertex.0 as usize), self.shaders.get(fragment.0 as usize)) {
            (Some(vs), Some(fs)) => reflect::link(vs, fs),
            _ => Err("unknown shader handle".to_string()),
        };

        match result {
            Ok(iface) => {
                let id = ProgramId(self.programs.len() as u32);
                self.programs.push(iface);
                self.commands.push(Command::LinkProgram { program: Some(id), ok: true });
                Ok(id)
            }
            Err(log) => {
                self.commands.push(Command::LinkProgram { program: None, ok: false });
                self.info_logs.push(log.clone());
                Err(log)
            }
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        if self.program(program).is_none() {
            self.error(format!("use_program: unknown program {program:?}"));
            return;
        }
        self.active_program = Some(program);
        self.commands.push(Command::UseProgram(program));
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.program(program)?.attribute(name).map(|a| a.location)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let binding = self.program(program)?.uniform(name)?.binding;
        Some(UniformLocation { program, binding })
    }

    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(BufferObject::default());
        self.commands.push(Command::CreateBuffer(id));
        id
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        if let Some(b) = buffer.filter(|b| self.buffers.get(b.0 as usize).is_none()) {
            self.error(format!("bind_buffer: unknown buffer {b:?}"));
            return;
        }

        match target {
            BufferTarget::Vertex => self.bound_vertex = buffer,
            BufferTarget::Index => self.bound_index = buffer,
        }
        self.commands.push(Command::BindBuffer { target, buffer });
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let Some(buffer) = self.bound(target) else {
            self.error(format!("buffer_data: no buffer bound to {target:?}"));
            return;
        };

        if let Some(obj) = self.buffers.get_mut(buffer.0 as usize) {
            obj.bytes = data.to_vec();
            obj.usage = Some(usage);
        }
        self.commands.push(Command::BufferData { target, buffer, len: data.len(), usage });
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        self.attribs
            .entry(location)
            .or_insert_with(|| AttribState {
                location,
                enabled: false,
                buffer: None,
                layout: None,
            })
            .enabled = true;
        self.commands.push(Command::EnableVertexAttrib(location));
    }

    fn vertex_attrib_pointer(&mut self, location: u32, layout: AttribLayout) {
        let Some(buffer) = self.bound_vertex else {
            self.error(format!("vertex_attrib_pointer({location}): no vertex buffer bound"));
            return;
        };
        if !(1..=4).contains(&layout.components) {
            self.error(format!("vertex_attrib_pointer({location}): {} components", layout.components));
            return;
        }

        let slot = self.attribs.entry(location).or_insert_with(|| AttribState {
            location,
            enabled: false,
            buffer: None,
            layout: None,
        });
        slot.buffer = Some(buffer);
        slot.layout = Some(layout);
        self.commands.push(Command::VertexAttribPointer { location, layout });
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]) {
        if self.active_program != Some(location.program) {
            self.error(format!(
                "uniform_matrix4: location belongs to {:?}, active program is {:?}",
                location.program, self.active_program
            ));
            return;
        }
        self.uniforms.insert(location, *matrix);
        self.commands.push(Command::UniformMatrix4 { location, matrix: *matrix });
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = rgba;
        self.commands.push(Command::ClearColor(rgba));
    }

    fn clear_depth(&mut self, depth: f32) {
        self.clear_depth = depth;
        self.commands.push(Command::ClearDepth(depth));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.commands.push(Command::Clear(mask));
    }

    fn draw_arrays(&mut self, mode: Primitive, first: u32, count: u32) {
        let Some(end) = first.checked_add(count) else {
            self.error(format!("draw_arrays: {count} vertices from {first} overflow"));
            return;
        };
        if !self.validate_draw() {
            return;
        }
        if let Some(short) = self.vertex_shortfall(end) {
            self.error(format!("draw_arrays: vertices {first}..{end} overrun {short}"));
            return;
        }
        self.commands.push(Command::DrawArrays { mode, first, count });
    }

    fn draw_elements(&mut self, mode: Primitive, count: u32, index_type: IndexType, offset: u64) {
        let Some(ibo) = self.bound_index else {
            self.error("draw_elements: no index buffer bound".to_string());
            return;
        };

        let available = self
            .buffer_contents(ibo)
            .map_or(0, |b| b.len() as u64 / index_type.size_bytes());
        let needed = offset / index_type.size_bytes() + u64::from(count);
        if needed > available {
            self.error(format!("draw_elements: {needed} indices needed, {available} in buffer"));
            return;
        }

        if !self.validate_draw() {
            return;
        }
        self.commands.push(Command::DrawElements { mode, count, index_type, offset });
    }

    fn flush(&mut self) {
        self.commands.push(Command::Flush);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "
        @group(0) @binding(0) var<uniform> mvp_matrix: mat4x4<f32>;

        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return mvp_matrix * vec4<f32>(position, 1.0);
        }
    ";

    const FS: &str = "
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 1.0, 1.0, 1.0);
        }
    ";

    fn linked() -> (RecordingContext, ProgramId) {
        let mut ctx = RecordingContext::new();
        let vs = ctx.compile_shader(ShaderKind::Vertex, VS).unwrap();
        let fs = ctx.compile_shader(ShaderKind::Fragment, FS).unwrap();
        let program = ctx.link_program(vs, fs).unwrap();
        ctx.use_program(program);
        (ctx, program)
    }

    #[test]
    fn buffer_data_without_binding_is_an_error() {
        let mut ctx = RecordingContext::new();
        let _ = ctx.create_buffer();
        ctx.buffer_data(BufferTarget::Vertex, &[0; 12], BufferUsage::Static);
        assert_eq!(ctx.errors().len(), 1);
        assert!(!ctx.commands().iter().any(|c| matches!(c, Command::BufferData { .. })));
    }

    #[test]
    fn draw_without_program_is_dropped() {
        let mut ctx = RecordingContext::new();
        ctx.draw_arrays(Primitive::Triangles, 0, 3);
        assert_eq!(ctx.draw_calls().count(), 0);
        assert_eq!(ctx.errors().len(), 1);
    }

    #[test]
    fn draw_arrays_checks_vertex_range() {
        let (mut ctx, _) = linked();
        let vbo = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::Vertex, Some(vbo));
        ctx.buffer_data(BufferTarget::Vertex, &[0; 36], BufferUsage::Static);
        ctx.enable_vertex_attrib(0);
        ctx.vertex_attrib_pointer(0, AttribLayout::packed_f32(3));

        ctx.draw_arrays(Primitive::Triangles, 1, 3);
        ctx.draw_arrays(Primitive::Triangles, u32::MAX, 3);
        assert_eq!(ctx.draw_calls().count(), 0);
        assert!(ctx.errors()[0].contains("`position` (3 vertices)"));
        assert!(ctx.errors()[1].contains("overflow"));

        ctx.draw_arrays(Primitive::Triangles, 0, 3);
        assert_eq!(ctx.draw_calls().count(), 1);
    }

    #[test]
    fn vertex_capacity_follows_layout() {
        let packed = AttribLayout::packed_f32(3);
        assert_eq!(packed.vertex_capacity(36), 3);
        assert_eq!(packed.vertex_capacity(35), 2);
        assert_eq!(packed.vertex_capacity(0), 0);

        let interleaved = AttribLayout {
            stride: 28,
            offset: 12,
            ..AttribLayout::packed_f32(4)
        };
        assert_eq!(interleaved.vertex_capacity(56), 2);
        assert_eq!(interleaved.vertex_capacity(8), 0);
    }

    #[test]
    fn draw_with_unbound_attribute_is_dropped() {
        let (mut ctx, _) = linked();
        ctx.draw_arrays(Primitive::Triangles, 0, 3);
        assert_eq!(ctx.draw_calls().count(), 0);
        assert!(ctx.errors()[0].contains("`position`"));
    }

    #[test]
    fn draw_elements_checks_index_range() {
        let (mut ctx, _) = linked();
        let vbo = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::Vertex, Some(vbo));
        ctx.buffer_data(BufferTarget::Vertex, &[0; 36], BufferUsage::Static);
        ctx.enable_vertex_attrib(0);
        ctx.vertex_attrib_pointer(0, AttribLayout::packed_f32(3));

        let ibo = ctx.create_buffer();
        ctx.bind_buffer(BufferTarget::Index, Some(ibo));
        ctx.buffer_data(BufferTarget::Index, bytemuck::cast_slice(&[0u16, 1, 2]), BufferUsage::Static);

        ctx.draw_elements(Primitive::Triangles, 6, IndexType::U16, 0);
        assert_eq!(ctx.draw_calls().count(), 0);

        ctx.draw_elements(Primitive::Triangles, 3, IndexType::U16, 0);
        assert_eq!(ctx.draw_calls().count(), 1);
    }

    #[test]
    fn uniform_for_inactive_program_is_rejected() {
        let (mut ctx, program) = linked();
        let location = ctx.uniform_location(program, "mvp_matrix").unwrap();

        let vs = ctx.compile_shader(ShaderKind::Vertex, VS).unwrap();
        let fs = ctx.compile_shader(ShaderKind::Fragment, FS).unwrap();
        let other = ctx.link_program(vs, fs).unwrap();
        ctx.use_program(other);

        ctx.uniform_matrix4(location, &[0.0; 16]);
        assert_eq!(ctx.uniform(location), None);
        assert_eq!(ctx.errors().len(), 1);
    }

    #[test]
    fn link_failure_records_info_log() {
        let mut ctx = RecordingContext::new();
        let vs = ctx.compile_shader(ShaderKind::Vertex, VS).unwrap();
        assert!(ctx.link_program(vs, vs).is_err());
        assert_eq!(ctx.info_logs().len(), 1);
        assert_eq!(ctx.active_program(), None);
    }
}
