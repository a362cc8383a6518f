use glam::Mat4;

use super::{Camera, Perspective};

/// Model, view and projection with their cached product.
///
/// `mvp` is recomputed by every setter, so it always equals
/// `projection * view * model`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformSet {
    model: Mat4,
    view: Mat4,
    projection: Mat4,
    mvp: Mat4,
}

impl Default for TransformSet {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

impl TransformSet {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model,
            view,
            projection,
            mvp: projection * view * model,
        }
    }

    pub fn from_camera(camera: &Camera, perspective: &Perspective) -> Self {
        Self::new(Mat4::IDENTITY, camera.view(), perspective.matrix())
    }

    pub fn set_model(&mut self, model: Mat4) {
        self.model = model;
        self.recompute();
    }

    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
        self.recompute();
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
        self.recompute();
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn mvp(&self) -> Mat4 {
        self.mvp
    }

    /// `mvp` as 16 column-major floats.
    pub fn mvp_cols(&self) -> [f32; 16] {
        self.mvp.to_cols_array()
    }

    fn recompute(&mut self) {
        self.mvp = self.projection * self.view * self.model;
    }
}
