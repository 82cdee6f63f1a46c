use glam::{Mat4, Quat, Vec3};

/// Translation / rotation / scale relative to a parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Default::default()
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    /// Builds a transform from raw arrays, the shape most scene parsers hand back.
    /// The rotation is renormalised so slightly drifted source quaternions stay unit length.
    pub fn from_trs(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        let rotation = Quat::from_array(rotation);
        Self {
            translation: translation.into(),
            rotation: if rotation.length_squared() > 0.0 {
                rotation.normalize()
            } else {
                Quat::IDENTITY
            },
            scale: scale.into(),
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    // --- Matrices ---

    /// Creates the Model Matrix: `Translate * Rotate * Scale`.
    pub fn compute_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// A transform already resolved against the scene root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform(pub Mat4);

impl Default for GlobalTransform {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

impl GlobalTransform {
    /// Chains a child's local transform under this one (`parent * local`).
    pub fn mul_transform(&self, local: &Transform) -> GlobalTransform {
        GlobalTransform(self.0 * local.compute_matrix())
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.0.transform_point3(point)
    }

    pub fn translation(&self) -> Vec3 {
        self.0.w_axis.truncate()
    }
}

impl From<Transform> for GlobalTransform {
    fn from(transform: Transform) -> Self {
        GlobalTransform(transform.compute_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_matrix_is_translate_rotate_scale() {
        let transform = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_z(FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };

        let expected = Mat4::from_translation(transform.translation)
            * Mat4::from_quat(transform.rotation)
            * Mat4::from_scale(transform.scale);

        assert!(transform.compute_matrix().abs_diff_eq(expected, 1e-6));

        // (1,0,0) -> scaled to (2,0,0) -> rotated to (0,2,0) -> moved to (1,4,3)
        let p = transform.compute_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 4.0, 3.0), 1e-5));
    }

    #[test]
    fn test_from_trs_normalizes_rotation() {
        let t = Transform::from_trs([0.0; 3], [0.0, 0.0, 0.0, 2.0], [1.0; 3]);
        assert!(t.rotation.is_normalized());
        assert!(t.is_identity());

        let zero = Transform::from_trs([0.0; 3], [0.0; 4], [1.0; 3]);
        assert_eq!(zero.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_global_chain() {
        let parent = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, 10.0));
        let child = parent.mul_transform(&Transform::from_scale(Vec3::splat(0.5)));

        let p = child.transform_point(Vec3::new(2.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.0, 10.0), 1e-6));
        assert_eq!(child.translation(), Vec3::new(0.0, 0.0, 10.0));
    }
}
