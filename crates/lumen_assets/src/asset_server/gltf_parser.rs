use std::path::Path;

use glam::Vec3;
use gltf::{Document, buffer, mesh::Mode};
use lumen_core::{Camera, DirectionalLight, PointLight, SpotLight, Transform};

use crate::{
    asset_server::{SceneParser, scene_name},
    error::AssetError,
    source::{
        Face, SourceLight, SourceMaterial, SourceMesh, SourceMeshPart, SourceNode, SourceScene,
        SourceTexture, VertexStream,
    },
};

/// glTF 2.0 (`.gltf` with external or embedded buffers, or binary `.glb`).
#[derive(Clone, Copy, Debug, Default)]
pub struct GltfParser;

impl SceneParser for GltfParser {
    fn parse(&self, path: &Path) -> Result<SourceScene, AssetError> {
        let base_path = path.parent().unwrap_or(Path::new("./"));

        // A. Load Document & Buffers (images stay undecoded; the upload pass reads them)
        let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
        let buffers = gltf::import_buffers(&document, Some(base_path), blob)?;

        parse_document(&document, &buffers, &scene_name(path))
    }
}

/// Converts an already loaded document. `name` is used for the synthesized root node.
pub fn parse_document(
    document: &Document,
    buffers: &[buffer::Data],
    name: &str,
) -> Result<SourceScene, AssetError> {
    // --- STEP 1: TEXTURES ---
    // Only images stored as files go into the library; the texture table resolves by filename.
    let mut textures = Vec::new();
    let mut image_filenames = Vec::new(); // glTF image index -> filename

    for image in document.images() {
        let filename = match image.source() {
            gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => Some(decode_uri(uri)),
            _ => {
                log::debug!(
                    "Skipping embedded image '{}'",
                    image.name().unwrap_or("GLTF Image")
                );
                None
            }
        };

        if let Some(filename) = &filename {
            if !textures.iter().any(|t: &SourceTexture| &t.filename == filename) {
                textures.push(SourceTexture {
                    filename: filename.clone(),
                });
            }
        }
        image_filenames.push(filename);
    }

    // --- STEP 2: MATERIALS ---
    let materials = document
        .materials()
        .map(|mat| {
            let pbr = mat.pbr_metallic_roughness();

            // The Link: material -> texture -> image -> filename
            let base_color_texture = pbr.base_color_texture().and_then(|info| {
                image_filenames
                    .get(info.texture().source().index())
                    .cloned()
                    .flatten()
            });

            SourceMaterial {
                name: mat.name().unwrap_or("Material").to_string(),
                base_color: pbr.base_color_factor(),
                base_color_texture,
            }
        })
        .collect();

    // --- STEP 3: MESHES ---
    let meshes = document
        .meshes()
        .map(|mesh| read_mesh(&mesh, buffers))
        .collect::<Result<Vec<_>, _>>()?;

    // --- STEP 4: LIGHTS & CAMERAS ---
    let lights = document
        .lights()
        .map(|lights| lights.map(|l| convert_light(&l)).collect())
        .unwrap_or_default();

    let default_camera = Camera::default();
    let cameras = document
        .cameras()
        .map(|c| match c.projection() {
            gltf::camera::Projection::Orthographic(_) => {
                log::warn!(
                    "Orthographic camera '{}' replaced by a default perspective",
                    c.name().unwrap_or("Camera")
                );
                default_camera
            }
            gltf::camera::Projection::Perspective(perspective) => Camera {
                fov: perspective.yfov(),
                aspect_ratio: perspective.aspect_ratio().unwrap_or(default_camera.aspect_ratio),
                near: perspective.znear(),
                far: perspective.zfar().unwrap_or(default_camera.far),
            },
        })
        .collect();

    // --- STEP 5: NODES (The Hierarchy) ---
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());

    let root_indices: Vec<usize> = match &scene {
        Some(scene) => scene.nodes().map(|n| n.index()).collect(),
        None => {
            // No scene list: every node nobody claims as a child is a root.
            let mut is_child = vec![false; document.nodes().len()];
            for node in document.nodes() {
                for child in node.children() {
                    is_child[child.index()] = true;
                }
            }
            (0..is_child.len()).filter(|&i| !is_child[i]).collect()
        }
    };

    let root_name = scene.as_ref().and_then(|s| s.name()).unwrap_or(name);
    let mut root = SourceNode::new(root_name);
    let mut visited = vec![false; document.nodes().len()];
    for index in root_indices {
        if let Some(child) = convert_node(document, index, &mut visited) {
            root.children.push(child);
        }
    }

    Ok(SourceScene {
        name: name.to_string(),
        root,
        meshes,
        materials,
        textures,
        lights,
        cameras,
    })
}

fn convert_node(document: &Document, index: usize, visited: &mut [bool]) -> Option<SourceNode> {
    if std::mem::replace(&mut visited[index], true) {
        log::warn!("Node {index} is referenced twice, ignoring the second reference");
        return None;
    }
    let node = document.nodes().nth(index)?;

    // Position/Rotation/Scale
    let (t, r, s) = node.transform().decomposed();

    let mut out =
        SourceNode::new(node.name().unwrap_or("Node")).with_transform(Transform::from_trs(t, r, s));
    out.mesh = node.mesh().map(|m| m.index());
    out.light = node.light().map(|l| l.index());
    out.camera = node.camera().map(|c| c.index());

    for child in node.children() {
        if let Some(child) = convert_node(document, child.index(), visited) {
            out.children.push(child);
        }
    }
    Some(out)
}

fn convert_light(light: &gltf::khr_lights_punctual::Light) -> SourceLight {
    let color = Vec3::from(light.color());
    let intensity = light.intensity();
    let range = light.range().unwrap_or(f32::INFINITY);

    match light.kind() {
        gltf::khr_lights_punctual::Kind::Directional => {
            SourceLight::Directional(DirectionalLight { color, intensity })
        }
        gltf::khr_lights_punctual::Kind::Point => SourceLight::Point(PointLight {
            color,
            intensity,
            range,
        }),
        gltf::khr_lights_punctual::Kind::Spot {
            outer_cone_angle, ..
        } => SourceLight::Spot(SpotLight {
            color,
            intensity,
            range,
            angle: outer_cone_angle,
        }),
    }
}

/// Attribute pools shared by all primitives of one mesh.
#[derive(Default)]
struct Pools {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 4]>,
    normals: Vec<[f32; 3]>,
    tangents: Vec<[f32; 3]>,
    bitangents: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    has_colors: bool,
    has_normals: bool,
    has_tangents: bool,
    has_uvs: bool,
}

/// Every primitive becomes one material partition; their vertices are concatenated into
/// one set of pools and corners index those pools directly.
fn read_mesh(mesh: &gltf::Mesh, buffers: &[buffer::Data]) -> Result<SourceMesh, AssetError> {
    let name = mesh.name().unwrap_or("Mesh");
    let mut pools = Pools::default();
    let mut corners: Vec<u32> = Vec::new();
    let mut faces = Vec::new();
    let mut parts = Vec::new();

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        // Extract Positions
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .map(|iter| iter.collect())
            .ok_or_else(|| AssetError::InvalidSource(format!("mesh '{name}' is missing positions")))?;
        let count = positions.len();
        let base = pools.positions.len() as u32;

        // Extract Indices (or draw the vertices in order)
        let indices: Vec<u32> = reader
            .read_indices()
            .map(|read| read.into_u32().collect())
            .unwrap_or_else(|| (0..count as u32).collect());

        let triangles = match triangle_list(primitive.mode(), &indices) {
            Some(triangles) => triangles,
            None => {
                log::warn!("-> skipping {:?} primitive in '{name}'", primitive.mode());
                continue;
            }
        };

        // Extract Colors (or opaque white)
        let colors: Option<Vec<[f32; 4]>> = reader.read_colors(0).map(|c| c.into_rgba_f32().collect());
        let colors = matching_count(colors, "COLOR_0", count, name)?;
        pools.has_colors |= colors.is_some();
        pools
            .colors
            .extend(colors.unwrap_or_else(|| vec![[1.0; 4]; count]));

        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|iter| iter.collect());
        let tangents: Option<Vec<[f32; 4]>> = reader.read_tangents().map(|iter| iter.collect());
        let normals = matching_count(normals, "NORMAL", count, name)?;
        let tangents = matching_count(tangents, "TANGENT", count, name)?;

        // Bitangent = cross(normal, tangent) * handedness
        if let (Some(normals), Some(tangents)) = (&normals, &tangents) {
            for (n, t) in normals.iter().zip(tangents) {
                let bitangent = Vec3::from(*n).cross(Vec3::new(t[0], t[1], t[2])) * t[3];
                pools.tangents.push([t[0], t[1], t[2]]);
                pools.bitangents.push(bitangent.to_array());
            }
            pools.has_tangents = true;
        } else {
            pools.tangents.extend(std::iter::repeat_n([0.0; 3], count));
            pools.bitangents.extend(std::iter::repeat_n([0.0; 3], count));
        }

        pools.has_normals |= normals.is_some();
        pools
            .normals
            .extend(normals.unwrap_or_else(|| vec![[0.0; 3]; count]));

        // Extract UVs (or 0.0)
        let uvs: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0).map(|read| read.into_f32().collect());
        let uvs = matching_count(uvs, "TEXCOORD_0", count, name)?;
        pools.has_uvs |= uvs.is_some();
        pools.uvs.extend(uvs.unwrap_or_else(|| vec![[0.0, 0.0]; count]));

        pools.positions.extend(positions);

        if let Some(&bad) = triangles.iter().find(|&&i| i as usize >= count) {
            return Err(AssetError::InvalidSource(format!(
                "mesh '{name}': index {bad} out of range ({count} vertices)"
            )));
        }

        let first_face = faces.len() as u32;
        for triangle in triangles.chunks_exact(3) {
            faces.push(Face {
                index_begin: corners.len() as u32,
                num_indices: 3,
            });
            corners.extend(triangle.iter().map(|i| base + i));
        }

        parts.push(SourceMeshPart {
            material: primitive.material().index(),
            face_indices: (first_face..faces.len() as u32).collect(),
        });
    }

    // Every stream shares the corner -> vertex mapping
    let mut out = SourceMesh::new(name);
    out.faces = faces;
    out.parts = parts;
    if pools.has_colors {
        out.colors = Some(VertexStream::new(pools.colors, corners.clone()));
    }
    if pools.has_normals {
        out.normals = Some(VertexStream::new(pools.normals, corners.clone()));
    }
    if pools.has_tangents {
        out.tangents = Some(VertexStream::new(pools.tangents, corners.clone()));
        out.bitangents = Some(VertexStream::new(pools.bitangents, corners.clone()));
    }
    if pools.has_uvs {
        out.uvs = Some(VertexStream::new(pools.uvs, corners.clone()));
    }
    out.positions = Some(VertexStream::new(pools.positions, corners));
    Ok(out)
}

/// Rejects an attribute whose accessor count differs from POSITION; the shared pools
/// would shift every later primitive otherwise.
fn matching_count<T>(
    stream: Option<Vec<T>>,
    attribute: &str,
    count: usize,
    name: &str,
) -> Result<Option<Vec<T>>, AssetError> {
    match stream {
        Some(values) if values.len() != count => Err(AssetError::InvalidSource(format!(
            "mesh '{name}': {attribute} has {} values, POSITION has {count}",
            values.len()
        ))),
        other => Ok(other),
    }
}

/// Percent-decodes an image URI into the filename on disk (`my%20wood.png` -> `my wood.png`).
fn decode_uri(uri: &str) -> String {
    let bytes = uri.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = |b: u8| (b as char).to_digit(16);
            if let (Some(h), Some(l)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push(((h << 4) | l) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Expands a primitive's index list into plain triangles. Returns `None` for point and line modes.
fn triangle_list(mode: Mode, indices: &[u32]) -> Option<Vec<u32>> {
    let mut out = Vec::new();
    match mode {
        Mode::Triangles => out.extend_from_slice(&indices[..indices.len() - indices.len() % 3]),
        Mode::TriangleStrip => {
            for i in 0..indices.len().saturating_sub(2) {
                // Every other triangle is flipped to keep a consistent winding
                if i % 2 == 0 {
                    out.extend_from_slice(&[indices[i], indices[i + 1], indices[i + 2]]);
                } else {
                    out.extend_from_slice(&[indices[i + 1], indices[i], indices[i + 2]]);
                }
            }
        }
        Mode::TriangleFan => {
            for i in 1..indices.len().saturating_sub(1) {
                out.extend_from_slice(&[indices[0], indices[i], indices[i + 1]]);
            }
        }
        Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip => return None,
    }
    Some(out)
}
