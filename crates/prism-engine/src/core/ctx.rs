use winit::window::{Window, WindowId};

use crate::context::GpuContext;
use crate::device::SurfaceErrorAction;
use crate::render::Scheduler;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Width over height of the client area; 1.0 while minimized.
    pub fn aspect_ratio(&self) -> f32 {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return 1.0;
        }
        size.width as f32 / size.height as f32
    }
}

/// Context passed to [`App::setup`](super::App::setup).
pub struct SetupCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub render: &'a mut GpuContext<'w>,
    pub scheduler: &'a mut dyn Scheduler,
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window borrow carried by the GPU context
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub render: &'a mut GpuContext<'w>,
    pub time: FrameTime,
    pub scheduler: &'a mut dyn Scheduler,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'w> FrameCtx<'_, 'w> {
    /// Acquires the surface, runs `draw`, then flushes and presents.
    ///
    /// A surface error skips `draw`; only a fatal one ends the app.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&mut GpuContext<'w>, &mut dyn Scheduler),
    {
        if let Err(action) = self.render.begin_frame() {
            return after_surface_error(action, &mut *self.scheduler);
        }

        draw(&mut *self.render, &mut *self.scheduler);
        self.render.end_frame(self.window.window);

        AppControl::Continue
    }
}

/// A fatal error returns `Exit`. Otherwise another frame is requested, so a
/// running loop survives a dropped or reconfigured frame.
fn after_surface_error(action: SurfaceErrorAction, scheduler: &mut dyn Scheduler) -> AppControl {
    match action {
        SurfaceErrorAction::Fatal => {
            log::error!("surface lost for good; exiting");
            AppControl::Exit
        }
        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
            scheduler.request_frame();
            AppControl::Continue
        }
    }
}
