use lumen_assets::{GpuMeshPart, ImageLoader, TextureData};
use lumen_scene::{NodeId, SceneGraph};

use crate::{
    device::{BufferDescriptor, BufferUsage, RenderDevice, TextureDescriptor},
    error::UploadError,
    layout::GpuVertex,
    mesh::MeshUniform,
};

#[derive(Clone, Copy, Debug)]
pub struct UploadOptions {
    /// Pad 3-channel images to RGBA; without it they fail with `UnsupportedChannels`.
    pub expand_rgb_to_rgba: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            expand_rgb_to_rgba: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub parts: usize,
    pub skipped_parts: usize,
    pub textures: usize,
    pub bytes: usize,
}

/// Hands every texture and non-empty mesh part of `graph` to the device and stores the
/// returned handles. Topology, transforms and vertex data are left untouched.
pub fn upload_scene<V: GpuVertex>(
    graph: &mut SceneGraph<V>,
    device: &mut dyn RenderDevice,
    images: &dyn ImageLoader,
    options: UploadOptions,
) -> Result<UploadStats, UploadError> {
    let mut stats = UploadStats::default();

    // --- STEP 1: TEXTURES (once, at the root) ---
    let entries: Vec<_> = graph
        .textures()
        .iter()
        .map(|(id, entry)| (id, entry.path.clone()))
        .collect();

    for (id, path) in entries {
        let decoded = images.load(&path).map_err(|source| UploadError::Decode {
            path: path.clone(),
            source,
        })?;
        let decoded = if options.expand_rgb_to_rgba {
            decoded.expand_rgb_to_rgba()
        } else {
            decoded
        };

        let name = path.display().to_string();
        let texture =
            TextureData::from_decoded(name, decoded).map_err(UploadError::UnsupportedChannels)?;
        let handle = device.create_texture(&TextureDescriptor {
            label: &texture.name,
            width: texture.width,
            height: texture.height,
            format: texture.format,
            data: &texture.pixels,
        })?;

        log::debug!(
            "Texture {} uploaded: {}x{} {:?}",
            texture.name,
            texture.width,
            texture.height,
            texture.format
        );
        graph.textures_mut().set_handle(id, handle);
        stats.textures += 1;
        stats.bytes += texture.pixels.len();
    }

    // --- STEP 2: MESH PARTS (depth-first) ---
    let order: Vec<NodeId> = graph.depth_first().collect();
    for id in order {
        if graph[id].mesh_parts().is_empty() {
            continue;
        }

        let uniform = MeshUniform::from_model(graph.global_geometry_transform(id));
        let node = &mut graph[id];
        let name = node.name.clone();

        for (i, part) in node.mesh_parts_mut().iter_mut().enumerate() {
            if part.is_empty() {
                log::debug!("-> skipping empty part {i} of '{name}'");
                stats.skipped_parts += 1;
                continue;
            }

            let vertex_bytes = part.vertex_bytes();
            let index_bytes = part.index_bytes();

            let vertex_buffer = device.create_buffer(&BufferDescriptor {
                label: "Mesh Vertex Buffer",
                contents: vertex_bytes,
                usage: BufferUsage::Vertex,
            })?;
            let index_buffer = device.create_buffer(&BufferDescriptor {
                label: "Mesh Index Buffer",
                contents: index_bytes,
                usage: BufferUsage::Index,
            })?;
            let constant_buffer = device.create_buffer(&BufferDescriptor {
                label: "Mesh Uniform Buffer",
                contents: bytemuck::bytes_of(&uniform),
                usage: BufferUsage::Uniform,
            })?;

            stats.parts += 1;
            stats.bytes +=
                vertex_bytes.len() + index_bytes.len() + std::mem::size_of::<MeshUniform>();

            part.gpu = Some(GpuMeshPart {
                vertex_buffer,
                index_buffer,
                constant_buffer,
            });
        }
    }

    log::info!(
        "Uploaded {} parts and {} textures ({} bytes)",
        stats.parts,
        stats.textures,
        stats.bytes
    );
    Ok(stats)
}
