//! The parsed source scene: what a format parser hands to the importer.
//!
//! Meshes are polygon soup in the shape most DCC formats use: faces are runs of corners,
//! and every attribute is an optional stream with its own value pool indexed per corner.

use glam::Vec3;
use lumen_core::{Camera, DirectionalLight, PointLight, SpotLight, Transform};

use crate::{assets::CornerAttributes, error::AssetError, triangulate::triangulate_polygon};

/// One per-corner attribute: a pool of values and, for each corner, an index into it.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexStream<T> {
    pub values: Vec<T>,
    pub indices: Vec<u32>,
}

impl<T: Copy> VertexStream<T> {
    pub fn new(values: Vec<T>, indices: Vec<u32>) -> Self {
        Self { values, indices }
    }

    /// One value per corner, in corner order.
    pub fn per_corner(values: Vec<T>) -> Self {
        let indices = (0..values.len() as u32).collect();
        Self { values, indices }
    }

    pub fn get(&self, corner: u32) -> T {
        self.values[self.indices[corner as usize] as usize]
    }

    fn validate(&self, attribute: &str, corner_count: u32) -> Result<(), AssetError> {
        if (self.indices.len() as u64) < corner_count as u64 {
            return Err(AssetError::InvalidSource(format!(
                "{attribute} stream covers {} corners, faces need {corner_count}",
                self.indices.len()
            )));
        }
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= self.values.len()) {
            return Err(AssetError::InvalidSource(format!(
                "{attribute} index {bad} out of range ({} values)",
                self.values.len()
            )));
        }
        Ok(())
    }
}

/// A polygon: `num_indices` consecutive corners starting at `index_begin`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub index_begin: u32,
    pub num_indices: u32,
}

impl Face {
    pub fn triangle_count(&self) -> u32 {
        self.num_indices.saturating_sub(2)
    }
}

/// The faces of a mesh that share one material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceMeshPart {
    /// Index into `SourceScene::materials`.
    pub material: Option<usize>,
    pub face_indices: Vec<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceMesh {
    pub name: String,
    pub faces: Vec<Face>,
    pub positions: Option<VertexStream<[f32; 3]>>,
    pub colors: Option<VertexStream<[f32; 4]>>,
    pub normals: Option<VertexStream<[f32; 3]>>,
    pub tangents: Option<VertexStream<[f32; 3]>>,
    pub bitangents: Option<VertexStream<[f32; 3]>>,
    pub uvs: Option<VertexStream<[f32; 2]>>,
    /// Material partitions, in source order.
    pub parts: Vec<SourceMeshPart>,
}

impl SourceMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builds a mesh from indexed polygons. Every polygon goes into a single,
    /// material-less partition; use [`SourceMesh::with_parts`] to split it.
    pub fn from_polygons(name: impl Into<String>, positions: Vec<[f32; 3]>, polygons: &[Vec<u32>]) -> Self {
        let mut faces = Vec::with_capacity(polygons.len());
        let mut corners = Vec::new();
        for polygon in polygons {
            faces.push(Face {
                index_begin: corners.len() as u32,
                num_indices: polygon.len() as u32,
            });
            corners.extend_from_slice(polygon);
        }

        let parts = vec![SourceMeshPart {
            material: None,
            face_indices: (0..faces.len() as u32).collect(),
        }];

        Self {
            name: name.into(),
            faces,
            positions: Some(VertexStream::new(positions, corners)),
            parts,
            ..Default::default()
        }
    }

    pub fn with_colors(mut self, colors: VertexStream<[f32; 4]>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_normals(mut self, normals: VertexStream<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_tangents(mut self, tangents: VertexStream<[f32; 3]>, bitangents: VertexStream<[f32; 3]>) -> Self {
        self.tangents = Some(tangents);
        self.bitangents = Some(bitangents);
        self
    }

    pub fn with_uvs(mut self, uvs: VertexStream<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn with_parts(mut self, parts: Vec<SourceMeshPart>) -> Self {
        self.parts = parts;
        self
    }

    /// Number of corners the faces address. Fails if a face runs past `u32::MAX`.
    pub fn corner_count(&self) -> Result<u32, AssetError> {
        self.faces.iter().try_fold(0, |count, f| {
            let end = f.index_begin.checked_add(f.num_indices).ok_or_else(|| {
                AssetError::InvalidSource(format!(
                    "mesh '{}': face at corner {} with {} corners overflows",
                    self.name, f.index_begin, f.num_indices
                ))
            })?;
            Ok(count.max(end))
        })
    }

    pub fn part_triangle_count(&self, part: &SourceMeshPart) -> usize {
        part.face_indices
            .iter()
            .map(|&f| self.faces[f as usize].triangle_count() as usize)
            .sum()
    }

    pub fn max_face_triangles(&self) -> u32 {
        self.faces.iter().map(Face::triangle_count).max().unwrap_or(0)
    }

    /// Splits a face into triangles, appending corner indices (not local indices) to `out`.
    pub fn triangulate_face(&self, face: Face, out: &mut Vec<u32>) -> u32 {
        let corners = face.index_begin..face.index_begin + face.num_indices;
        let outline: Vec<Vec3> = corners
            .clone()
            .map(|c| {
                self.positions
                    .as_ref()
                    .map_or(Vec3::ZERO, |p| Vec3::from(p.get(c)))
            })
            .collect();

        let start = out.len();
        let count = triangulate_polygon(&outline, out);
        for local in &mut out[start..] {
            *local += face.index_begin;
        }
        count
    }

    /// Fetches every attribute of one corner, defaulting absent streams.
    pub fn corner(&self, corner: u32) -> CornerAttributes {
        let mut attributes = CornerAttributes::default();
        if let Some(s) = &self.positions {
            attributes.position = s.get(corner);
        }
        if let Some(s) = &self.colors {
            attributes.color = s.get(corner);
        }
        if let Some(s) = &self.normals {
            attributes.normal = s.get(corner);
        }
        if let Some(s) = &self.tangents {
            attributes.tangent = s.get(corner);
        }
        if let Some(s) = &self.bitangents {
            attributes.bitangent = s.get(corner);
        }
        if let Some(s) = &self.uvs {
            attributes.uv = s.get(corner);
        }
        attributes
    }

    /// Rejects meshes whose faces or streams point out of range, so the builder can index freely.
    pub fn validate(&self) -> Result<(), AssetError> {
        let corners = self.corner_count()?;

        let with_name = |e: AssetError| match e {
            AssetError::InvalidSource(msg) => {
                AssetError::InvalidSource(format!("mesh '{}': {msg}", self.name))
            }
            other => other,
        };

        if let Some(s) = &self.positions {
            s.validate("position", corners).map_err(with_name)?;
        }
        if let Some(s) = &self.colors {
            s.validate("color", corners).map_err(with_name)?;
        }
        if let Some(s) = &self.normals {
            s.validate("normal", corners).map_err(with_name)?;
        }
        if let Some(s) = &self.tangents {
            s.validate("tangent", corners).map_err(with_name)?;
        }
        if let Some(s) = &self.bitangents {
            s.validate("bitangent", corners).map_err(with_name)?;
        }
        if let Some(s) = &self.uvs {
            s.validate("uv", corners).map_err(with_name)?;
        }

        for part in &self.parts {
            if let Some(&bad) = part
                .face_indices
                .iter()
                .find(|&&f| f as usize >= self.faces.len())
            {
                return Err(AssetError::InvalidSource(format!(
                    "mesh '{}': face {bad} out of range ({} faces)",
                    self.name,
                    self.faces.len()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceMaterial {
    pub name: String,
    pub base_color: [f32; 4],
    /// Filename of the base-color texture exactly as the source material stores it.
    pub base_color_texture: Option<String>,
}

/// A texture in the scene's material library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceTexture {
    /// Relative (or absolute) filename as written in the source file.
    pub filename: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SourceLight {
    Point(PointLight),
    Spot(SpotLight),
    Directional(DirectionalLight),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceNode {
    pub name: String,
    pub transform: Transform,
    pub geometry_transform: Option<Transform>,
    pub mesh: Option<usize>,
    pub light: Option<usize>,
    pub camera: Option<usize>,
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            geometry_transform: None,
            mesh: None,
            light: None,
            camera: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_geometry_transform(mut self, transform: Transform) -> Self {
        self.geometry_transform = Some(transform);
        self
    }

    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_light(mut self, light: usize) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_camera(mut self, camera: usize) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceScene {
    pub name: String,
    pub root: SourceNode,
    pub meshes: Vec<SourceMesh>,
    pub materials: Vec<SourceMaterial>,
    pub textures: Vec<SourceTexture>,
    pub lights: Vec<SourceLight>,
    pub cameras: Vec<Camera>,
}

impl SourceScene {
    pub fn new(name: impl Into<String>, root: SourceNode) -> Self {
        Self {
            name: name.into(),
            root,
            meshes: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Structural checks a parser must pass before the scene reaches the importer.
    pub fn validate(&self) -> Result<(), AssetError> {
        for mesh in &self.meshes {
            mesh.validate()?;
            for part in &mesh.parts {
                if part.material.is_some_and(|m| m >= self.materials.len()) {
                    return Err(AssetError::InvalidSource(format!(
                        "mesh '{}' references missing material {:?}",
                        mesh.name, part.material
                    )));
                }
            }
        }

        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            let dangling = node.mesh.is_some_and(|i| i >= self.meshes.len())
                || node.light.is_some_and(|i| i >= self.lights.len())
                || node.camera.is_some_and(|i| i >= self.cameras.len());
            if dangling {
                return Err(AssetError::InvalidSource(format!(
                    "node '{}' references a missing mesh, light or camera",
                    node.name
                )));
            }
            stack.extend(node.children.iter());
        }
        Ok(())
    }
}
