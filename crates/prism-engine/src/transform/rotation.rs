use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use glam::{Mat4, Vec3};

/// Quarter turn per second.
pub const RADIANS_PER_SECOND: f32 = FRAC_PI_2;

/// Angle reached after `elapsed`: `elapsed_ms * (pi / 2) / 1000`.
pub fn rotation_angle(elapsed: Duration) -> f32 {
    elapsed.as_secs_f32() * RADIANS_PER_SECOND
}

/// Constant-speed rotation about a fixed axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spin {
    axis: Vec3,
}

impl Spin {
    /// `None` for a zero (or non-finite) axis. The axis is normalized.
    pub fn new(axis: Vec3) -> Option<Self> {
        axis.try_normalize().map(|axis| Self { axis })
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Model matrix after `elapsed`: identity rotated about the axis.
    pub fn model_at(&self, elapsed: Duration) -> Mat4 {
        Mat4::IDENTITY * Mat4::from_axis_angle(self.axis, rotation_angle(elapsed))
    }
}
