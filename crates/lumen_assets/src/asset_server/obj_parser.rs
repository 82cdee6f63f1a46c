use std::path::Path;

use crate::{
    asset_server::{SceneParser, scene_name},
    error::AssetError,
    source::{
        Face, SourceMaterial, SourceMesh, SourceMeshPart, SourceNode, SourceScene, SourceTexture,
        VertexStream,
    },
};

/// Wavefront OBJ with its MTL library. Polygons are kept as written, so quads and n-gons
/// reach the mesh part builder untriangulated.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjParser;

impl SceneParser for ObjParser {
    fn parse(&self, path: &Path) -> Result<SourceScene, AssetError> {
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: false,
                single_index: false,
                ignore_points: true,
                ignore_lines: true,
                ..Default::default()
            },
        )?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("No MTL library for {} ({e}), using no materials", path.display());
            Vec::new()
        });

        Ok(build_scene(&scene_name(path), &models, &materials))
    }
}

/// OBJ has no hierarchy: every model becomes a mesh node directly under the root.
pub fn build_scene(name: &str, models: &[tobj::Model], materials: &[tobj::Material]) -> SourceScene {
    // --- STEP 1: TEXTURES ---
    // Every map the library names, once, in order of appearance.
    let mut textures: Vec<SourceTexture> = Vec::new();
    for mtl in materials {
        let maps = [
            &mtl.diffuse_texture,
            &mtl.normal_texture,
            &mtl.specular_texture,
            &mtl.ambient_texture,
            &mtl.shininess_texture,
            &mtl.dissolve_texture,
        ];
        for filename in maps.into_iter().flatten() {
            if !textures.iter().any(|t| &t.filename == filename) {
                textures.push(SourceTexture {
                    filename: filename.clone(),
                });
            }
        }
    }

    // --- STEP 2: MATERIALS ---
    let source_materials = materials
        .iter()
        .enumerate()
        .map(|(i, mtl)| {
            let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
            SourceMaterial {
                name: if mtl.name.is_empty() {
                    format!("material_{i}")
                } else {
                    mtl.name.clone()
                },
                // Alpha from dissolve
                base_color: [diffuse[0], diffuse[1], diffuse[2], mtl.dissolve.unwrap_or(1.0)],
                base_color_texture: mtl.diffuse_texture.clone(),
            }
        })
        .collect();

    // --- STEP 3: MESHES & NODES ---
    // tobj starts a new model at every `usemtl` inside an object; runs of models sharing a
    // name are one mesh with one partition per model.
    let mut root = SourceNode::new(name);
    let mut meshes = Vec::new();

    for group in models.chunk_by(|a, b| a.name == b.name) {
        let mut pools = ObjPools::default();
        for model in group {
            let material = model.mesh.material_id.filter(|&m| {
                let known = m < materials.len();
                if !known {
                    log::warn!("-> '{}' uses unknown material {m}", model.name);
                }
                known
            });
            pools.append(model, material);
        }

        let mesh_name = &group[0].name;
        root.children.push(SourceNode::new(mesh_name).with_mesh(meshes.len()));
        meshes.push(pools.finish(mesh_name));
    }

    SourceScene {
        name: name.to_string(),
        root,
        meshes,
        materials: source_materials,
        textures,
        lights: Vec::new(),
        cameras: Vec::new(),
    }
}

/// Attribute pools of one OBJ object, grown model by model.
#[derive(Default)]
struct ObjPools {
    faces: Vec<Face>,
    parts: Vec<SourceMeshPart>,
    positions: Vec<[f32; 3]>,
    // Corner -> position; colors share it
    corners: Vec<u32>,
    colors: Vec<[f32; 4]>,
    normals: Vec<[f32; 3]>,
    normal_indices: Vec<u32>,
    uvs: Vec<[f32; 2]>,
    uv_indices: Vec<u32>,
    has_colors: bool,
    has_normals: bool,
    has_uvs: bool,
}

impl ObjPools {
    fn append(&mut self, model: &tobj::Model, material: Option<usize>) {
        let mesh = &model.mesh;
        let corner_count = mesh.indices.len();
        let corner_base = self.corners.len() as u32;
        let vertex_base = self.positions.len() as u32;
        let vertex_count = mesh.positions.len() / 3;

        // Empty arities means every face is a triangle
        let arities: Vec<u32> = if mesh.face_arities.is_empty() {
            vec![3; corner_count / 3]
        } else {
            mesh.face_arities.clone()
        };

        let first_face = self.faces.len() as u32;
        let mut begin = corner_base;
        for arity in arities {
            self.faces.push(Face {
                index_begin: begin,
                num_indices: arity,
            });
            begin += arity;
        }
        self.parts.push(SourceMeshPart {
            material,
            face_indices: (first_face..self.faces.len() as u32).collect(),
        });

        self.positions
            .extend(mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));
        self.corners.extend(mesh.indices.iter().map(|i| vertex_base + i));

        // Vertex colors ride along with positions
        if mesh.vertex_color.len() == mesh.positions.len() && !mesh.vertex_color.is_empty() {
            self.colors
                .extend(mesh.vertex_color.chunks_exact(3).map(|c| [c[0], c[1], c[2], 1.0]));
            self.has_colors = true;
        } else {
            self.colors.extend(std::iter::repeat_n([1.0; 4], vertex_count));
        }

        let normal_base = self.normals.len() as u32;
        match per_corner(&mesh.normal_indices, corner_count).filter(|_| !mesh.normals.is_empty()) {
            Some(indices) => {
                self.normals
                    .extend(mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
                self.normal_indices.extend(indices.iter().map(|i| normal_base + i));
                self.has_normals = true;
            }
            None => {
                if !mesh.normals.is_empty() {
                    log::warn!("-> '{}' has normals on only some faces, dropping them", model.name);
                }
                self.normals.push([0.0; 3]);
                self.normal_indices
                    .extend(std::iter::repeat_n(normal_base, corner_count));
            }
        }

        let uv_base = self.uvs.len() as u32;
        match per_corner(&mesh.texcoord_indices, corner_count).filter(|_| !mesh.texcoords.is_empty()) {
            Some(indices) => {
                self.uvs.extend(mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]));
                self.uv_indices.extend(indices.iter().map(|i| uv_base + i));
                self.has_uvs = true;
            }
            None => {
                if !mesh.texcoords.is_empty() {
                    log::warn!("-> '{}' has texcoords on only some faces, dropping them", model.name);
                }
                self.uvs.push([0.0; 2]);
                self.uv_indices.extend(std::iter::repeat_n(uv_base, corner_count));
            }
        }
    }

    fn finish(self, name: &str) -> SourceMesh {
        let mut out = SourceMesh::new(name);
        if self.has_colors {
            out.colors = Some(VertexStream::new(self.colors, self.corners.clone()));
        }
        if self.has_normals {
            out.normals = Some(VertexStream::new(self.normals, self.normal_indices));
        }
        if self.has_uvs {
            out.uvs = Some(VertexStream::new(self.uvs, self.uv_indices));
        }
        out.positions = Some(VertexStream::new(self.positions, self.corners));
        out.faces = self.faces;
        out.parts = self.parts;
        out
    }
}

fn per_corner(indices: &[u32], corner_count: usize) -> Option<Vec<u32>> {
    (indices.len() == corner_count).then(|| indices.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const QUAD_AND_TRIANGLE: &str = "\
o Panel
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 2 0 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
f 2/2/1 5/1/1 3/3/1
";

    fn load(obj: &str) -> Vec<tobj::Model> {
        let (models, _) = tobj::load_obj_buf(
            &mut Cursor::new(obj),
            &tobj::LoadOptions {
                triangulate: false,
                single_index: false,
                ..Default::default()
            },
            |_| Err(tobj::LoadError::OpenFileFailed),
        )
        .unwrap();
        models
    }

    #[test]
    fn test_polygons_are_kept() {
        let scene = build_scene("panel", &load(QUAD_AND_TRIANGLE), &[]);
        let mesh = &scene.meshes[0];

        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.faces[0], Face { index_begin: 0, num_indices: 4 });
        assert_eq!(mesh.faces[1], Face { index_begin: 4, num_indices: 3 });
        assert_eq!(mesh.part_triangle_count(&mesh.parts[0]), 3);
        assert!(mesh.uvs.is_some());
        assert_eq!(mesh.corner(4).uv, [1.0, 0.0]);
        assert_eq!(mesh.corner(5).position, [2.0, 0.0, 0.0]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_models_become_children_of_root() {
        let scene = build_scene("panel", &load(QUAD_AND_TRIANGLE), &[]);
        assert_eq!(scene.root.name, "panel");
        assert_eq!(scene.root.children.len(), 1);
        assert_eq!(scene.root.children[0].name, "Panel");
        assert_eq!(scene.root.children[0].mesh, Some(0));
        assert_eq!(scene.meshes[0].parts[0].material, None);
    }

    const MIXED_BOX: &str = "\
mtllib box.mtl
o Box
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 1
usemtl red
f 1/1 2/1 3/2
usemtl blue
f 1/1 3/2 4/2
o Lid
v 0 0 1
v 1 0 1
v 1 1 1
f 5 6 7
";

    const MIXED_BOX_MTL: &str = "\
newmtl red
Kd 1 0 0
newmtl blue
Kd 0 0 1
";

    #[test]
    fn test_material_switch_stays_in_one_mesh() {
        let (models, materials) = tobj::load_obj_buf(
            &mut Cursor::new(MIXED_BOX),
            &tobj::LoadOptions {
                triangulate: false,
                single_index: false,
                ..Default::default()
            },
            |_| tobj::load_mtl_buf(&mut Cursor::new(MIXED_BOX_MTL)),
        )
        .unwrap();
        let materials = materials.unwrap();
        let scene = build_scene("box", &models, &materials);

        let names: Vec<_> = scene.root.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Box", "Lid"]);
        assert_eq!(scene.meshes.len(), 2);

        let the_box = &scene.meshes[0];
        let part_materials: Vec<_> = the_box.parts.iter().map(|p| p.material).collect();
        assert_eq!(part_materials, vec![Some(0), Some(1)]);
        assert_eq!(the_box.parts[1].face_indices, vec![1]);
        assert_eq!(the_box.faces[1], Face { index_begin: 3, num_indices: 3 });
        assert!(the_box.validate().is_ok());

        // Second partition reads its own corners, not the first model's
        assert_eq!(the_box.corner(5).position, [0.0, 1.0, 0.0]);
        assert_eq!(the_box.corner(5).uv, [1.0, 1.0]);

        // The lid has no texcoords of its own
        let lid = &scene.meshes[1];
        assert!(lid.uvs.is_none());
        assert_eq!(lid.parts.len(), 1);
        assert_eq!(lid.parts[0].material, Some(1));
    }
}
