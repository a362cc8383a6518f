use winit::event::WindowEvent;

use crate::render::Scheduler;

use super::ctx::{FrameCtx, SetupCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Contract between the runtime and a sample.
pub trait App {
    /// Called once, after the window and its GPU context exist and before
    /// the first frame. An error ends the run and is returned from
    /// [`Runtime::run`](crate::window::Runtime::run).
    fn setup(&mut self, ctx: &mut SetupCtx<'_, '_>) -> anyhow::Result<()>;

    /// Called for every redraw the host delivers.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    fn on_window_event(&mut self, event: &WindowEvent, scheduler: &mut dyn Scheduler) -> AppControl {
        let _ = (event, scheduler);
        AppControl::Continue
    }

    /// Called after the surface was resized, with the new width / height.
    fn on_resize(&mut self, aspect: f32) {
        let _ = aspect;
    }
}
