use std::hash::{Hash, Hasher};
use std::{cmp::Ordering, fmt::Debug, marker::PhantomData};

use bytemuck::{Pod, Zeroable};
use uuid::Uuid;

use crate::texture_table::TextureId;

// 1. The ID (Handle)
// It's just a unique number. Efficient to copy.
// The upload collaborator mints these; the importer never does.
#[derive(Debug)]
pub struct Handle<T> {
    pub id: Uuid,
    marker: PhantomData<T>,
}

impl<T> Handle<T> {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            marker: PhantomData,
        }
    }

    pub fn from_id(id: Uuid) -> Self {
        Self {
            id,
            marker: PhantomData,
        }
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

// Implement Hash manually
// Crucial for using Handle in HashMaps
impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // We only compare the ID, completely ignoring the generic marker
        self.id.cmp(&other.id)
    }
}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Marker for device buffers (vertex, index, constant).
#[derive(Debug)]
pub struct GpuBuffer;

/// Marker for device textures.
#[derive(Debug)]
pub struct GpuTexture;

/// Every attribute a single triangle corner can carry, with missing streams already defaulted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerAttributes {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub uv: [f32; 2],
}

impl Default for CornerAttributes {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            color: [1.0, 1.0, 1.0, 1.0],
            normal: [0.0; 3],
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
            uv: [0.0; 2],
        }
    }
}

/// A fixed-layout vertex record the mesh part builder can emit.
///
/// The byte layout is shared verbatim with the device, and welding compares those bytes,
/// so implementors must be `#[repr(C)]` with no padding (`Pod` enforces this).
pub trait MeshVertex: Pod + PartialEq + Debug + Send + Sync + 'static {
    fn from_corner(corner: &CornerAttributes) -> Self;
    fn position(&self) -> [f32; 3];
}

// #[repr(C)] ensures the compiler doesn't reorder fields.
// Field order is the vertex-input order the renderer declares.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex for Vertex {
    fn from_corner(corner: &CornerAttributes) -> Self {
        Self {
            position: corner.position,
            color: corner.color,
            normal: corner.normal,
            uv: corner.uv,
        }
    }

    fn position(&self) -> [f32; 3] {
        self.position
    }
}

/// Vertex record for normal-mapped (PBR) rendering.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PbrVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex for PbrVertex {
    fn from_corner(corner: &CornerAttributes) -> Self {
        Self {
            position: corner.position,
            color: corner.color,
            normal: corner.normal,
            tangent: corner.tangent,
            bitangent: corner.bitangent,
            uv: corner.uv,
        }
    }

    fn position(&self) -> [f32; 3] {
        self.position
    }
}

/// Device handles filled in by the upload pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GpuMeshPart {
    pub vertex_buffer: Handle<GpuBuffer>,
    pub index_buffer: Handle<GpuBuffer>,
    pub constant_buffer: Handle<GpuBuffer>,
}

/// One material-homogeneous, welded, indexed triangle batch.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshPart<V = Vertex> {
    /// Index into the source scene's material library, if the partition had one.
    pub material_index: Option<usize>,
    pub vertices: Vec<V>,
    /// Three entries per triangle, each an offset into `vertices`.
    pub indices: Vec<u32>,
    pub color_texture: Option<TextureId>,
    pub gpu: Option<GpuMeshPart>,
}

impl<V: MeshVertex> MeshPart<V> {
    pub fn empty(material_index: Option<usize>) -> Self {
        Self {
            material_index,
            vertices: Vec::new(),
            indices: Vec::new(),
            color_texture: None,
            gpu: None,
        }
    }

    /// Empty parts come from partitions with no triangles; upload and draw must skip them.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
