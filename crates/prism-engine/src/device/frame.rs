/// The surface texture currently being drawn into.
///
/// Holding it blocks acquisition of the next frame; present it through
/// [`Gpu::present`](super::Gpu::present) once every pass has been submitted.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}
