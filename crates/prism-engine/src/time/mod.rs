//! Frame timing.
//!
//! One [`FrameClock`] per window; call `tick()` once per redraw to obtain the
//! [`FrameTime`] that drives animation.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
