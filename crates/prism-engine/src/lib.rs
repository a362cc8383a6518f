//! prism engine crate.
//!
//! Shared setup and drawing routines for the rendering samples, written
//! against an explicit [`context::RenderContext`], plus the winit/wgpu
//! runtime that hosts them.

pub mod context;
pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod setup;
pub mod time;
pub mod transform;
pub mod window;
