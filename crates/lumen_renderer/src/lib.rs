//! The GPU side of the import pipeline: device contract, upload pass and draw list.

pub mod device;
pub mod draw;
pub mod error;
pub mod layout;
pub mod mesh;
pub mod upload;

pub use device::{
    BufferDescriptor, BufferUsage, RecordedBuffer, RecordedTexture, RecordingDevice, RenderDevice,
    TextureDescriptor,
};
pub use draw::{DrawItem, collect_draws};
pub use error::UploadError;
pub use layout::{GpuVertex, VertexAttribute, VertexBufferLayout, VertexFormat};
pub use mesh::MeshUniform;
pub use upload::{UploadOptions, UploadStats, upload_scene};
