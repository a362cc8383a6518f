use std::borrow::Cow;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::ops::Range;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};
use crate::setup::ShaderKind;

use super::reflect::{self, ProgramInterface, ShaderInterface};
use super::{
    AttribLayout, BufferId, BufferTarget, BufferUsage, ClearMask, IndexType, Primitive, ProgramId,
    RenderContext, ShaderId, UniformLocation,
};

/// Size of one `mat4x4<f32>` uniform.
const MAT4_BYTES: u64 = 64;

/// Per-draw uniform slot stride. Matches the default
/// `min_uniform_buffer_offset_alignment`.
const UNIFORM_SLOT: u64 = 256;

struct GpuShader {
    iface: ShaderInterface,
    module: wgpu::ShaderModule,
}

/// Per-draw uniform snapshots for one program.
///
/// Each recorded draw copies the program's current uniform values into fresh
/// slots; the draw binds them through dynamic offsets. Slots are uploaded and
/// recycled on flush.
#[derive(Default)]
struct UniformArena {
    buffer: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
    capacity_slots: u64,
    staged: Vec<u8>,
}

impl UniformArena {
    /// Stages `bytes` in a new slot and returns its byte offset.
    fn push(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.staged.len() as u64;
        self.staged.extend_from_slice(bytes);
        self.staged.resize((offset + UNIFORM_SLOT) as usize, 0);
        offset as u32
    }

    fn staged_slots(&self) -> u64 {
        self.staged.len() as u64 / UNIFORM_SLOT
    }
}

struct GpuProgram {
    iface: ProgramInterface,
    vertex: usize,
    fragment: usize,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    uniform_values: HashMap<u32, [f32; 16]>,
    arena: UniformArena,
}

#[derive(Default)]
struct GpuBuffer {
    buffer: Option<wgpu::Buffer>,
    len: u64,
}

#[derive(Debug, Copy, Clone, Default)]
struct AttribBinding {
    enabled: bool,
    buffer: Option<BufferId>,
    layout: Option<AttribLayout>,
}

/// Vertex layout + topology a pipeline was built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    primitive: Primitive,
    /// One entry per program attribute, sorted by location.
    attributes: Vec<(u32, AttribLayout)>,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingDraw {
    program: usize,
    key: PipelineKey,
    /// Vertex buffer per key attribute, same order.
    vertex_buffers: Vec<BufferId>,
    index_buffer: Option<BufferId>,
    /// Vertex range, or index range for indexed draws.
    range: Range<u32>,
    uniform_offsets: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
enum PendingOp {
    Clear([f32; 4]),
    Draw(PendingDraw),
}

/// One render pass worth of pending work.
#[derive(Debug, Clone, PartialEq)]
struct PassPlan {
    clear: Option<[f32; 4]>,
    draws: Vec<usize>,
}

/// Splits pending work into render passes: each color clear opens a new
/// pass, draws before the first clear load the existing contents.
fn plan_passes(ops: &[PendingOp]) -> Vec<PassPlan> {
    let mut passes = Vec::new();
    let mut current: Option<PassPlan> = None;

    for (i, op) in ops.iter().enumerate() {
        match op {
            PendingOp::Clear(color) => {
                passes.extend(current.take());
                current = Some(PassPlan {
                    clear: Some(*color),
                    draws: Vec::new(),
                });
            }
            PendingOp::Draw(_) => current
                .get_or_insert_with(|| PassPlan {
                    clear: None,
                    draws: Vec::new(),
                })
                .draws
                .push(i),
        }
    }

    passes.extend(current);
    passes
}

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn topology(primitive: Primitive) -> wgpu::PrimitiveTopology {
    match primitive {
        Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
    }
}

fn to_wgpu_color(c: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: c[0] as f64,
        g: c[1] as f64,
        b: c[2] as f64,
        a: c[3] as f64,
    }
}

/// wgpu-backed [`RenderContext`] drawing into a window surface.
///
/// Draw calls are recorded together with a snapshot of the uniform values and
/// attribute bindings current at the time of the call. [`flush`] encodes them
/// into render passes on the frame acquired by [`begin_frame`] and submits;
/// [`end_frame`] flushes anything left and presents.
///
/// Pipelines are built lazily per (program, vertex layout, topology) and
/// cached on the program.
///
/// Depth clears are accepted and ignored: no sample enables depth testing,
/// so no depth attachment is created.
///
/// [`flush`]: RenderContext::flush
/// [`begin_frame`]: GpuContext::begin_frame
/// [`end_frame`]: GpuContext::end_frame
pub struct GpuContext<'w> {
    gpu: Gpu<'w>,
    frame: Option<GpuFrame>,

    shaders: Vec<GpuShader>,
    programs: Vec<GpuProgram>,
    buffers: Vec<GpuBuffer>,

    active_program: Option<usize>,
    bound_vertex: Option<BufferId>,
    bound_index: Option<BufferId>,
    attribs: HashMap<u32, AttribBinding>,

    clear_color: [f32; 4],
    pending: Vec<PendingOp>,
}

impl<'w> GpuContext<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        Self {
            gpu,
            frame: None,
            shaders: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            active_program: None,
            bound_vertex: None,
            bound_index: None,
            attribs: HashMap::new(),
            clear_color: [0.0, 0.0, 0.0, 0.0],
            pending: Vec::new(),
        }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    /// Width over height of the drawable surface.
    pub fn aspect_ratio(&self) -> f32 {
        let size = self.gpu.size();
        size.width.max(1) as f32 / size.height.max(1) as f32
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// Acquires the next surface texture as the target for subsequent passes.
    pub fn begin_frame(&mut self) -> Result<(), SurfaceErrorAction> {
        match self.gpu.begin_frame() {
            Ok(frame) => {
                self.frame = Some(frame);
                Ok(())
            }
            Err(err) => {
                log::debug!("surface acquisition failed: {err:?}");
                Err(self.gpu.handle_surface_error(err))
            }
        }
    }

    /// Flushes remaining work and presents the current frame.
    pub fn end_frame(&mut self, window: &Window) {
        self.flush();
        if let Some(frame) = self.frame.take() {
            window.pre_present_notify();
            self.gpu.present(frame);
        }
    }

    fn buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(id.0 as usize)?.buffer.as_ref()
    }

    fn bound(&self, target: BufferTarget) -> Option<BufferId> {
        match target {
            BufferTarget::Vertex => self.bound_vertex,
            BufferTarget::Index => self.bound_index,
        }
    }

    fn build_pipeline(&self, program: &GpuProgram, key: &PipelineKey) -> wgpu::RenderPipeline {
        let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
            .attributes
            .iter()
            .map(|(location, layout)| {
                [wgpu::VertexAttribute {
                    format: vertex_format(layout.components),
                    offset: 0,
                    shader_location: *location,
                }]
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = key
            .attributes
            .iter()
            .zip(&attributes)
            .map(|((_, layout), attrs)| wgpu::VertexBufferLayout {
                array_stride: layout.effective_stride() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        self.gpu.device().create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("prism program pipeline"),
            layout: Some(&program.pipeline_layout),

            vertex: wgpu::VertexState {
                module: &self.shaders[program.vertex].module,
                entry_point: Some(program.iface.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.shaders[program.fragment].module,
                entry_point: Some(program.iface.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.surface_format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: topology(key.primitive),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    /// Snapshots current state into a pending draw; `None` if the draw is invalid.
    fn record_draw(
        &mut self,
        primitive: Primitive,
        index_buffer: Option<BufferId>,
        range: Range<u32>,
    ) -> Option<PendingDraw> {
        let Some(program_index) = self.active_program else {
            log::warn!("draw issued with no active program; dropped");
            return None;
        };

        let mut attributes = Vec::new();
        let mut vertex_buffers = Vec::new();
        for attr in &self.programs[program_index].iface.attributes {
            let binding = self.attribs.get(&attr.location).copied().unwrap_or_default();
            match (binding.enabled, binding.buffer, binding.layout) {
                (true, Some(buffer), Some(layout)) if self.buffer(buffer).is_some() => {
                    let available = self.buffers[buffer.0 as usize].len;
                    if index_buffer.is_none() && u64::from(range.end) > layout.vertex_capacity(available) {
                        log::warn!(
                            "draw skipped: vertices {}..{} overrun attribute `{}` ({} bytes)",
                            range.start,
                            range.end,
                            attr.name,
                            available
                        );
                        return None;
                    }
                    attributes.push((attr.location, layout));
                    vertex_buffers.push(buffer);
                }
                _ => {
                    log::warn!(
                        "draw skipped: attribute `{}` (location {}) has no enabled buffer",
                        attr.name,
                        attr.location
                    );
                    return None;
                }
            }
        }

        let key = PipelineKey {
            primitive,
            attributes,
        };

        if !self.programs[program_index].pipelines.contains_key(&key) {
            let pipeline = self.build_pipeline(&self.programs[program_index], &key);
            self.programs[program_index].pipelines.insert(key.clone(), pipeline);
        }

        let program = &mut self.programs[program_index];
        let uniform_offsets = program
            .iface
            .uniforms
            .iter()
            .map(|u| {
                let value = program.uniform_values.get(&u.binding).copied().unwrap_or([0.0; 16]);
                program.arena.push(bytemuck::cast_slice(&value))
            })
            .collect();

        Some(PendingDraw {
            program: program_index,
            key,
            vertex_buffers,
            index_buffer,
            range,
            uniform_offsets,
        })
    }

    /// Grows arenas to fit the staged slots and uploads them.
    fn upload_uniforms(&mut self) {
        let device = self.gpu.device();
        let queue = self.gpu.queue();

        for program in &mut self.programs {
            let slots = program.arena.staged_slots();
            if slots == 0 {
                continue;
            }
            let Some(bgl) = program.bind_group_layout.as_ref() else {
                program.arena.staged.clear();
                continue;
            };

            if slots > program.arena.capacity_slots || program.arena.buffer.is_none() {
                let capacity = slots.next_power_of_two().max(16);
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("prism uniform arena"),
                    size: capacity * UNIFORM_SLOT,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });

                let entries: Vec<wgpu::BindGroupEntry<'_>> = program
                    .iface
                    .uniforms
                    .iter()
                    .map(|u| wgpu::BindGroupEntry {
                        binding: u.binding,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &buffer,
                            offset: 0,
                            size: NonZeroU64::new(MAT4_BYTES),
                        }),
                    })
                    .collect();

                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("prism uniform bind group"),
                    layout: bgl,
                    entries: &entries,
                });

                log::debug!("uniform arena grown to {capacity} slots");
                program.arena.bind_group = Some(bind_group);
                program.arena.buffer = Some(buffer);
                program.arena.capacity_slots = capacity;
            }

            if let Some(buffer) = program.arena.buffer.as_ref() {
                queue.write_buffer(buffer, 0, &program.arena.staged);
            }
            program.arena.staged.clear();
        }
    }

    fn encode_draw(&self, rpass: &mut wgpu::RenderPass<'_>, draw: &PendingDraw) -> Option<()> {
        let program = self.programs.get(draw.program)?;
        rpass.set_pipeline(program.pipelines.get(&draw.key)?);

        if !draw.uniform_offsets.is_empty() {
            rpass.set_bind_group(0, program.arena.bind_group.as_ref()?, &draw.uniform_offsets);
        }

        for (slot, (buffer, (_, layout))) in draw.vertex_buffers.iter().zip(&draw.key.attributes).enumerate() {
            let buffer = self.buffer(*buffer)?;
            rpass.set_vertex_buffer(slot as u32, buffer.slice(layout.offset as u64..));
        }

        match draw.index_buffer {
            Some(ibo) => {
                rpass.set_index_buffer(self.buffer(ibo)?.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(draw.range.clone(), 0, 0..1);
            }
            None => rpass.draw(draw.range.clone(), 0..1),
        }
        Some(())
    }
}

impl RenderContext for GpuContext<'_> {
    fn compile_shader(&mut self, kind: ShaderKind, source: &str) -> Result<ShaderId, String> {
        let iface = reflect::compile(kind, source)?;

        let module = self.gpu.device().create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(match kind {
                ShaderKind::Vertex => "prism vertex shader",
                ShaderKind::Fragment => "prism fragment shader",
            }),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.to_string())),
        });

        let id = ShaderId(self.shaders.len() as u32);
        self.shaders.push(GpuShader { iface, module });
        Ok(id)
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String> {
        let (Some(vs), Some(fs)) = (
            self.shaders.get(vertex.0 as usize),
            self.shaders.get(fragment.0 as usize),
        ) else {
            return Err("unknown shader handle".to_string());
        };

        let iface = reflect::link(&vs.iface, &fs.iface)?;
        let device = self.gpu.device();

        let bind_group_layout = (!iface.uniforms.is_empty()).then(|| {
            let entries: Vec<wgpu::BindGroupLayoutEntry> = iface
                .uniforms
                .iter()
                .map(|u| wgpu::BindGroupLayoutEntry {
                    binding: u.binding,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(MAT4_BYTES),
                    },
                    count: None,
                })
                .collect();

            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("prism uniform bgl"),
                entries: &entries,
            })
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism program pipeline layout"),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(GpuProgram {
            iface,
            vertex: vertex.0 as usize,
            fragment: fragment.0 as usize,
            bind_group_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            uniform_values: HashMap::new(),
            arena: UniformArena::default(),
        });
        Ok(id)
    }

    fn use_program(&mut self, program: ProgramId) {
        if (program.0 as usize) < self.programs.len() {
            self.active_program = Some(program.0 as usize);
        } else {
            log::warn!("use_program: unknown program {program:?}");
        }
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        let program = self.programs.get(program.0 as usize)?;
        program.iface.attribute(name).map(|a| a.location)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let binding = self.programs.get(program.0 as usize)?.iface.uniform(name)?.binding;
        Some(UniformLocation { program, binding })
    }

    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(GpuBuffer::default());
        id
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        if let Some(b) = buffer.filter(|b| b.0 as usize >= self.buffers.len()) {
            log::warn!("bind_buffer: unknown buffer {b:?}");
            return;
        }
        match target {
            BufferTarget::Vertex => self.bound_vertex = buffer,
            BufferTarget::Index => self.bound_index = buffer,
        }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let Some(id) = self.bound(target) else {
            log::warn!("buffer_data: no buffer bound to {target:?}");
            return;
        };

        let buffer = (!data.is_empty()).then(|| {
            let mut usages = wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::INDEX;
            if usage == BufferUsage::Dynamic {
                usages |= wgpu::BufferUsages::COPY_DST;
            }
            self.gpu.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(match target {
                    BufferTarget::Vertex => "prism vbo",
                    BufferTarget::Index => "prism ibo",
                }),
                contents: data,
                usage: usages,
            })
        });

        if let Some(slot) = self.buffers.get_mut(id.0 as usize) {
            slot.buffer = buffer;
            slot.len = data.len() as u64;
        }
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        self.attribs.entry(location).or_default().enabled = true;
    }

    fn vertex_attrib_pointer(&mut self, location: u32, layout: AttribLayout) {
        let Some(buffer) = self.bound_vertex else {
            log::warn!("vertex_attrib_pointer({location}): no vertex buffer bound");
            return;
        };
        if !(1..=4).contains(&layout.components) {
            log::warn!("vertex_attrib_pointer({location}): {} components", layout.components);
            return;
        }
        let slot = self.attribs.entry(location).or_default();
        slot.buffer = Some(buffer);
        slot.layout = Some(layout);
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]) {
        let program_index = location.program.0 as usize;
        if self.active_program != Some(program_index) {
            log::warn!("uniform_matrix4: location belongs to an inactive program");
            return;
        }
        let program = &mut self.programs[program_index];
        if program.iface.has_uniform_binding(location.binding) {
            program.uniform_values.insert(location.binding, *matrix);
        }
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = rgba;
    }

    fn clear_depth(&mut self, _depth: f32) {}

    fn clear(&mut self, mask: ClearMask) {
        if mask.color {
            self.pending.push(PendingOp::Clear(self.clear_color));
        }
    }

    fn draw_arrays(&mut self, mode: Primitive, first: u32, count: u32) {
        let Some(end) = first.checked_add(count) else {
            log::warn!("draw_arrays: {count} vertices from {first} overflow");
            return;
        };
        if let Some(draw) = self.record_draw(mode, None, first..end) {
            self.pending.push(PendingOp::Draw(draw));
        }
    }

    fn draw_elements(&mut self, mode: Primitive, count: u32, index_type: IndexType, offset: u64) {
        let Some(ibo) = self.bound_index else {
            log::warn!("draw_elements: no index buffer bound");
            return;
        };

        let available = self.buffers.get(ibo.0 as usize).map_or(0, |b| b.len / index_type.size_bytes());
        let first = offset / index_type.size_bytes();
        if first + u64::from(count) > available {
            log::warn!("draw_elements: {count} indices from {first} exceed {available}");
            return;
        }

        let Some(range) = u32::try_from(first).ok().and_then(|f| Some(f..f.checked_add(count)?)) else {
            log::warn!("draw_elements: index range from {first} does not fit in u32");
            return;
        };
        if let Some(draw) = self.record_draw(mode, Some(ibo), range) {
            self.pending.push(PendingOp::Draw(draw));
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        if self.frame.is_none() {
            log::warn!("flush with no acquired frame; {} operations dropped", self.pending.len());
            self.pending.clear();
            for program in &mut self.programs {
                program.arena.staged.clear();
            }
            return;
        }

        self.upload_uniforms();

        let pending = std::mem::take(&mut self.pending);
        let passes = plan_passes(&pending);

        let Some(frame) = self.frame.as_ref() else { return };
        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism flush encoder"),
            });

        for pass in &passes {
            let load = match pass.clear {
                Some(color) => wgpu::LoadOp::Clear(to_wgpu_color(color)),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for &i in &pass.draws {
                let PendingOp::Draw(draw) = &pending[i] else { continue };
                if self.encode_draw(&mut rpass, draw).is_none() {
                    log::warn!("draw {i} skipped: resources released before flush");
                }
            }
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        log::trace!("flushed {} passes", passes.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw() -> PendingOp {
        PendingOp::Draw(PendingDraw {
            program: 0,
            key: PipelineKey {
                primitive: Primitive::Triangles,
                attributes: vec![(0, AttribLayout::packed_f32(3))],
            },
            vertex_buffers: vec![BufferId(0)],
            index_buffer: None,
            range: 0..3,
            uniform_offsets: vec![0],
        })
    }

    const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn clear_then_draws_share_one_pass() {
        let passes = plan_passes(&[PendingOp::Clear(BLACK), draw(), draw()]);
        assert_eq!(
            passes,
            [PassPlan {
                clear: Some(BLACK),
                draws: vec![1, 2]
            }]
        );
    }

    #[test]
    fn draws_before_clear_load_existing_contents() {
        let passes = plan_passes(&[draw(), PendingOp::Clear(RED), draw()]);
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].clear, None);
        assert_eq!(passes[0].draws, [0]);
        assert_eq!(passes[1].clear, Some(RED));
        assert_eq!(passes[1].draws, [2]);
    }

    #[test]
    fn clear_alone_still_gets_a_pass() {
        let passes = plan_passes(&[PendingOp::Clear(BLACK)]);
        assert_eq!(passes.len(), 1);
        assert!(passes[0].draws.is_empty());
    }

    #[test]
    fn uniform_slots_are_aligned() {
        let mut arena = UniformArena::default();
        assert_eq!(arena.push(&[1; 64]), 0);
        assert_eq!(arena.push(&[2; 64]), 256);
        assert_eq!(arena.staged_slots(), 2);
        assert_eq!(arena.staged[256], 2);
    }

    #[test]
    fn vertex_formats_follow_component_count() {
        assert_eq!(vertex_format(1), wgpu::VertexFormat::Float32);
        assert_eq!(vertex_format(3), wgpu::VertexFormat::Float32x3);
        assert_eq!(vertex_format(4), wgpu::VertexFormat::Float32x4);
    }
}
