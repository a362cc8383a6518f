use glam::{Mat4, Vec3};

/// Look-at camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    /// Camera at `eye` looking at the origin with +Y up.
    pub fn looking_at_origin(eye: Vec3) -> Self {
        Self {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Perspective projection; the field of view is vertical, in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Perspective {
    pub fovy_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn new(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fovy_degrees,
            aspect,
            near,
            far,
        }
    }

    pub fn with_aspect(self, aspect: f32) -> Self {
        Self { aspect, ..self }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn view_moves_eye_to_origin() {
        let camera = Camera::looking_at_origin(Vec3::new(0.0, 1.0, 3.0));
        let eye = camera.view().transform_point3(camera.eye);
        assert!(eye.length() < 1e-5);

        let target = camera.view().transform_point3(Vec3::ZERO);
        assert!(target.z < 0.0, "target should be in front of the camera");
    }

    #[test]
    fn near_and_far_map_to_unit_depth() {
        let p = Perspective::new(90.0, 1.0, 0.1, 100.0).matrix();

        let near = p * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn fov_is_in_degrees() {
        let p = Perspective::new(90.0, 1.0, 0.1, 100.0).matrix();
        // tan(45deg) == 1, so the y scale is 1.
        assert!((p.y_axis.y - 1.0).abs() < 1e-5);
    }
}
