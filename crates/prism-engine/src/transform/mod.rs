//! Model/view/projection matrices.
//!
//! Matrices are `glam::Mat4`: column-major, right-handed, clip depth in
//! `[0, 1]`. Uploads go through [`TransformSet::mvp_cols`].

mod camera;
mod rotation;
mod set;

pub use camera::{Camera, Perspective};
pub use rotation::{rotation_angle, Spin, RADIANS_PER_SECOND};
pub use set::TransformSet;
