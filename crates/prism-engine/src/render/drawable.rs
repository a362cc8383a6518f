use glam::Mat4;

use crate::setup::IndexBuffer;

/// What a draw call reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// `count` vertices from the bound attributes, starting at `first`.
    Arrays { first: u32, count: u32 },
    /// Every index of `indices`, as `u16`, from offset 0.
    Indexed(IndexBuffer),
}

impl Geometry {
    /// All `count` vertices from the start.
    pub fn arrays(count: u32) -> Self {
        Self::Arrays { first: 0, count }
    }

    /// Vertices (or indices) one draw consumes.
    pub fn count(&self) -> u32 {
        match self {
            Self::Arrays { count, .. } => *count,
            Self::Indexed(indices) => indices.len(),
        }
    }
}

/// Geometry placed in the world by a model matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableInstance {
    pub geometry: Geometry,
    pub model: Mat4,
}

impl DrawableInstance {
    pub fn new(geometry: Geometry, model: Mat4) -> Self {
        Self { geometry, model }
    }

    /// Instance drawn where its vertices are, with no model transform.
    pub fn at_origin(geometry: Geometry) -> Self {
        Self::new(geometry, Mat4::IDENTITY)
    }
}
