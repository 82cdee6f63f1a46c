use glam::Mat4;
use lumen_assets::{GpuBuffer, GpuTexture, Handle, MeshVertex};
use lumen_scene::{NodeId, SceneGraph};

/// Everything a render pass needs to issue one indexed draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    /// Position of the part within its node.
    pub part: usize,
    pub vertex_buffer: Handle<GpuBuffer>,
    pub index_buffer: Handle<GpuBuffer>,
    pub constant_buffer: Handle<GpuBuffer>,
    pub index_count: u32,
    /// `None` means draw untextured.
    pub texture: Option<Handle<GpuTexture>>,
    pub model: Mat4,
}

/// Walks the tree depth-first, parts in partition order. Empty or not-yet-uploaded parts
/// produce no draw.
pub fn collect_draws<V: MeshVertex>(graph: &SceneGraph<V>) -> Vec<DrawItem> {
    let mut draws = Vec::new();

    for id in graph.depth_first() {
        let node = &graph[id];
        if node.mesh_parts().is_empty() {
            continue;
        }
        let model = graph.global_geometry_transform(id);

        for (i, part) in node.mesh_parts().iter().enumerate() {
            let Some(gpu) = part.gpu.filter(|_| !part.is_empty()) else {
                continue;
            };

            let texture = part
                .color_texture
                .and_then(|t| graph.textures().get(t))
                .and_then(|entry| entry.handle);

            draws.push(DrawItem {
                node: id,
                part: i,
                vertex_buffer: gpu.vertex_buffer,
                index_buffer: gpu.index_buffer,
                constant_buffer: gpu.constant_buffer,
                index_count: part.indices.len() as u32,
                texture,
                model,
            });
        }
    }
    draws
}
