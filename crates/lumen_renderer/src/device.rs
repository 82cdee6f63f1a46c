use std::collections::HashMap;

use lumen_assets::{GpuBuffer, GpuTexture, Handle, TextureFormat};

use crate::error::UploadError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
    /// Per-part constants (`MeshUniform`).
    Uniform,
}

pub struct BufferDescriptor<'a> {
    pub label: &'a str,
    pub contents: &'a [u8],
    pub usage: BufferUsage,
}

pub struct TextureDescriptor<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Tightly packed rows, `width * bytes_per_pixel` each.
    pub data: &'a [u8],
}

/// The GPU side of the upload boundary. It sees flat byte buffers only, never the node tree.
pub trait RenderDevice {
    fn create_buffer(&mut self, desc: &BufferDescriptor) -> Result<Handle<GpuBuffer>, UploadError>;
    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<Handle<GpuTexture>, UploadError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedBuffer {
    pub label: String,
    pub usage: BufferUsage,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedTexture {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub bytes: Vec<u8>,
}

/// An in-memory device that keeps a copy of everything uploaded to it.
/// Used by the `lumen` binary for dry runs and by tests.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    buffers: HashMap<Handle<GpuBuffer>, RecordedBuffer>,
    textures: HashMap<Handle<GpuTexture>, RecordedTexture>,
    // Upper bound on a single buffer, in bytes
    max_buffer_size: Option<usize>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_buffer_size(mut self, bytes: usize) -> Self {
        self.max_buffer_size = Some(bytes);
        self
    }

    pub fn buffer(&self, handle: Handle<GpuBuffer>) -> Option<&RecordedBuffer> {
        self.buffers.get(&handle)
    }

    pub fn texture(&self, handle: Handle<GpuTexture>) -> Option<&RecordedTexture> {
        self.textures.get(&handle)
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn bytes_uploaded(&self) -> usize {
        let buffers: usize = self.buffers.values().map(|b| b.bytes.len()).sum();
        let textures: usize = self.textures.values().map(|t| t.bytes.len()).sum();
        buffers + textures
    }
}

impl RenderDevice for RecordingDevice {
    fn create_buffer(&mut self, desc: &BufferDescriptor) -> Result<Handle<GpuBuffer>, UploadError> {
        if let Some(limit) = self.max_buffer_size.filter(|&limit| desc.contents.len() > limit) {
            return Err(UploadError::Device(format!(
                "buffer '{}' is {} bytes, limit is {limit}",
                desc.label,
                desc.contents.len()
            )));
        }

        let handle = Handle::new();
        self.buffers.insert(
            handle,
            RecordedBuffer {
                label: desc.label.to_string(),
                usage: desc.usage,
                bytes: desc.contents.to_vec(),
            },
        );
        Ok(handle)
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<Handle<GpuTexture>, UploadError> {
        let expected = desc.width as usize * desc.height as usize * desc.format.bytes_per_pixel() as usize;
        if desc.data.len() != expected {
            return Err(UploadError::Device(format!(
                "texture '{}' has {} bytes, {}x{} {:?} needs {expected}",
                desc.label,
                desc.data.len(),
                desc.width,
                desc.height,
                desc.format
            )));
        }

        let handle = Handle::new();
        self.textures.insert(
            handle,
            RecordedTexture {
                label: desc.label.to_string(),
                width: desc.width,
                height: desc.height,
                format: desc.format,
                bytes: desc.data.to_vec(),
            },
        );
        Ok(handle)
    }
}
