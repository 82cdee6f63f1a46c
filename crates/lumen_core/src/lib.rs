pub use glam;

pub mod camera;
pub mod light;
pub mod transform;

pub use camera::Camera;
pub use light::{DirectionalLight, PointLight, SpotLight};
pub use transform::{GlobalTransform, Transform};
