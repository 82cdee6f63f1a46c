use std::mem::{offset_of, size_of};

use lumen_assets::{MeshVertex, PbrVertex, Vertex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    pub fn size(self) -> u64 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub offset: u64,
    pub shader_location: u32,
    pub format: VertexFormat,
}

/// How the device reads one vertex record; must agree byte for byte with the Rust struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexBufferLayout {
    pub array_stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

/// A vertex record the device knows how to read.
pub trait GpuVertex: MeshVertex {
    fn desc() -> VertexBufferLayout;
}

fn attribute(offset: usize, shader_location: u32, format: VertexFormat) -> VertexAttribute {
    VertexAttribute {
        offset: offset as u64,
        shader_location,
        format,
    }
}

impl GpuVertex for Vertex {
    fn desc() -> VertexBufferLayout {
        VertexBufferLayout {
            array_stride: size_of::<Vertex>() as u64,
            attributes: vec![
                attribute(offset_of!(Vertex, position), 0, VertexFormat::Float32x3), // @location(0)
                attribute(offset_of!(Vertex, color), 1, VertexFormat::Float32x4),
                attribute(offset_of!(Vertex, normal), 2, VertexFormat::Float32x3),
                attribute(offset_of!(Vertex, uv), 3, VertexFormat::Float32x2),
            ],
        }
    }
}

impl GpuVertex for PbrVertex {
    fn desc() -> VertexBufferLayout {
        VertexBufferLayout {
            array_stride: size_of::<PbrVertex>() as u64,
            attributes: vec![
                attribute(offset_of!(PbrVertex, position), 0, VertexFormat::Float32x3),
                attribute(offset_of!(PbrVertex, color), 1, VertexFormat::Float32x4),
                attribute(offset_of!(PbrVertex, normal), 2, VertexFormat::Float32x3),
                attribute(offset_of!(PbrVertex, tangent), 3, VertexFormat::Float32x3),
                attribute(offset_of!(PbrVertex, bitangent), 4, VertexFormat::Float32x3),
                attribute(offset_of!(PbrVertex, uv), 5, VertexFormat::Float32x2),
            ],
        }
    }
}
