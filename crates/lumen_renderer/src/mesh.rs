use bytemuck::{Pod, Zeroable};
use glam::Mat4;

// #[repr(C)] ensures the compiler doesn't reorder fields.
// Pod (Plain Old Data) and Zeroable allow us to cast this struct to raw bytes safely.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshUniform {
    // 1. The Model Matrix (4x4 floats)
    // Places the part's vertices in the world: global transform * geometry transform.
    pub model: [[f32; 4]; 4],

    // 2. The Normal Matrix (4x4 floats)
    // (Technically 3x3 is enough, but GPUs prefer 4x4 alignment).
    pub normal_matrix: [[f32; 4]; 4],
}

impl MeshUniform {
    pub fn from_model(model: Mat4) -> Self {
        // Lighting math: Transpose(Inverse(Model))
        // If you squash a sphere, the normals shouldn't squash; they should stretch.
        let normal_matrix = model.inverse().transpose();

        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
        }
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}
