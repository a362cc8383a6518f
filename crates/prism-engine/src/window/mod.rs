//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, wires them to the GPU
//! context, and turns [`Scheduler`](crate::render::Scheduler) requests into
//! redraws.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
