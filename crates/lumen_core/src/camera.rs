use glam::Mat4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 45.0f32.to_radians(),
            aspect_ratio: 16.0 / 9.0, // Standard monitor
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    /// Computes the "Projection Matrix" (View -> Clip)
    pub fn compute_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_projection_matches_glam() {
        let camera = Camera::default();
        let expected = Mat4::perspective_rh(45.0f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        assert_eq!(camera.compute_projection_matrix(), expected);
    }
}
