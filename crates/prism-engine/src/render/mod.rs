//! Per-frame drawing on top of the setup layer.
//!
//! [`FrameRenderer`] turns [`DrawableInstance`]s into clear / uniform upload
//! / draw / flush sequences. [`RenderLoop`] drives it once per host frame
//! through a [`Scheduler`].

mod drawable;
mod frame;
mod render_loop;

pub use drawable::{DrawableInstance, Geometry};
pub use frame::FrameRenderer;
pub use render_loop::{CancelToken, LoopState, RenderLoop, Scheduler};
