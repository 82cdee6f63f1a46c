use std::collections::HashMap;

use crate::{
    assets::{MeshPart, MeshVertex},
    source::{SourceMaterial, SourceMesh, SourceMeshPart},
    texture_table::TextureTable,
};

/// Turns one material partition of a source mesh into a welded, indexed triangle list.
///
/// Every face is triangulated, every triangle corner becomes one vertex record, and
/// bit-identical records are then collapsed. The part's base-color texture is bound by
/// exact filename lookup in `textures`; a miss leaves the part untextured.
pub fn build_mesh_part<V: MeshVertex>(
    mesh: &SourceMesh,
    part: &SourceMeshPart,
    material: Option<&SourceMaterial>,
    textures: &TextureTable,
) -> MeshPart<V> {
    let num_triangles = mesh.part_triangle_count(part);
    if num_triangles == 0 {
        log::debug!("-> part of '{}' has no triangles, leaving it empty", mesh.name);
        let mut empty = MeshPart::empty(part.material);
        empty.color_texture = resolve_color_texture(material, textures);
        return empty;
    }

    // 1. Unwelded corners: one vertex per triangle corner
    let mut unwelded: Vec<V> = Vec::with_capacity(num_triangles * 3);
    let mut tri_indices = Vec::with_capacity(mesh.max_face_triangles() as usize * 3);

    for &face_ix in &part.face_indices {
        let face = mesh.faces[face_ix as usize];

        tri_indices.clear();
        mesh.triangulate_face(face, &mut tri_indices);

        for &corner in &tri_indices {
            unwelded.push(V::from_corner(&mesh.corner(corner)));
        }
    }

    debug_assert_eq!(unwelded.len(), num_triangles * 3);

    // 2. Weld
    let (vertices, indices) = generate_indices(&unwelded);

    log::trace!(
        "-> part of '{}': {} triangles, {} corners welded to {} vertices",
        mesh.name,
        num_triangles,
        unwelded.len(),
        vertices.len()
    );

    MeshPart {
        material_index: part.material,
        vertices,
        indices,
        color_texture: resolve_color_texture(material, textures),
        gpu: None,
    }
}

/// Collapses bit-identical vertices. Returns the unique vertices in first-seen order and,
/// for every input vertex, its position in that list.
///
/// No tolerance is applied: `0.0` and `-0.0` stay distinct, as do values a rounding step apart.
pub fn generate_indices<V: MeshVertex>(unwelded: &[V]) -> (Vec<V>, Vec<u32>) {
    let mut lookup: HashMap<&[u8], u32> = HashMap::with_capacity(unwelded.len());
    let mut vertices = Vec::with_capacity(unwelded.len());
    let mut indices = Vec::with_capacity(unwelded.len());

    for vertex in unwelded {
        let key = bytemuck::bytes_of(vertex);
        let index = *lookup.entry(key).or_insert_with(|| {
            vertices.push(*vertex);
            (vertices.len() - 1) as u32
        });
        indices.push(index);
    }

    (vertices, indices)
}

fn resolve_color_texture(
    material: Option<&SourceMaterial>,
    textures: &TextureTable,
) -> Option<crate::texture_table::TextureId> {
    let filename = material?.base_color_texture.as_deref()?;
    let found = textures.find(filename);
    if found.is_none() {
        log::warn!("Texture '{filename}' is not in the scene texture table, part stays untextured");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::{PbrVertex, Vertex},
        source::{SourceMeshPart, SourceNode, SourceScene, SourceTexture, VertexStream},
        texture_table::TextureId,
    };
    use std::path::Path;

    fn no_textures() -> TextureTable {
        TextureTable::new()
    }

    fn assert_well_formed<V: MeshVertex>(part: &MeshPart<V>) {
        assert_eq!(part.indices.len() % 3, 0);
        assert!(part.indices.iter().all(|&i| (i as usize) < part.vertices.len()));
        for (i, a) in part.vertices.iter().enumerate() {
            for b in &part.vertices[i + 1..] {
                assert_ne!(bytemuck::bytes_of(a), bytemuck::bytes_of(b));
            }
        }
    }

    #[test]
    fn test_single_triangle_with_distinct_uvs() {
        let mesh = SourceMesh::from_polygons(
            "tri",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[vec![0, 1, 2]],
        )
        .with_uvs(VertexStream::per_corner(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]));

        let part: MeshPart<Vertex> = build_mesh_part(&mesh, &mesh.parts[0], None, &no_textures());

        assert_eq!(part.vertices.len(), 3);
        assert_eq!(part.indices, vec![0, 1, 2]);
        assert_eq!(part.vertices[1].uv, [1.0, 0.0]);
        assert_well_formed(&part);
    }

    #[test]
    fn test_quad_welds_shared_edge() {
        let mesh = SourceMesh::from_polygons(
            "quad",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            &[vec![0, 1, 2, 3]],
        )
        .with_normals(VertexStream::new(vec![[0.0, 0.0, 1.0]], vec![0; 4]));

        let part: MeshPart<Vertex> = build_mesh_part(&mesh, &mesh.parts[0], None, &no_textures());

        assert_eq!(part.indices.len(), 6);
        assert_eq!(part.vertices.len(), 4);
        assert_eq!(part.triangle_count(), 2);
        assert_well_formed(&part);
    }

    #[test]
    fn test_hard_edges_do_not_weld() {
        // Same positions, different per-corner normals on each triangle.
        let mesh = SourceMesh::from_polygons(
            "hard",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            &[vec![0, 1, 2], vec![0, 2, 3]],
        )
        .with_normals(VertexStream::new(
            vec![[0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
            vec![0, 0, 0, 1, 1, 1],
        ));

        let part: MeshPart<Vertex> = build_mesh_part(&mesh, &mesh.parts[0], None, &no_textures());
        assert_eq!(part.vertices.len(), 6);
        assert_eq!(part.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_missing_color_stream_is_opaque_white() {
        let mesh = SourceMesh::from_polygons(
            "grey",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            &[vec![0, 1, 2], vec![1, 3, 2]],
        );
        let part: MeshPart<PbrVertex> = build_mesh_part(&mesh, &mesh.parts[0], None, &no_textures());

        assert!(part.vertices.iter().all(|v| v.color == [1.0, 1.0, 1.0, 1.0]));
        assert!(part.vertices.iter().all(|v| v.tangent == [0.0; 3]));
    }

    #[test]
    fn test_vertex_colors_are_kept() {
        let mesh = SourceMesh::from_polygons(
            "red",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[vec![0, 1, 2]],
        )
        .with_colors(VertexStream::new(vec![[1.0, 0.0, 0.0, 1.0]], vec![0, 0, 0]));

        let part: MeshPart<Vertex> = build_mesh_part(&mesh, &mesh.parts[0], None, &no_textures());
        assert!(part.vertices.iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_partition_without_faces_is_empty() {
        let mesh = SourceMesh::from_polygons("m", vec![[0.0; 3]; 3], &[vec![0, 1, 2]])
            .with_parts(vec![SourceMeshPart { material: Some(0), face_indices: vec![] }]);

        let part: MeshPart<Vertex> = build_mesh_part(&mesh, &mesh.parts[0], None, &no_textures());
        assert!(part.is_empty());
        assert_eq!(part.material_index, Some(0));
    }

    #[test]
    fn test_unwelded_count_matches_triangles() {
        // Pentagon + triangle: 3 + 1 triangles -> 12 corners before welding.
        let positions = vec![
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 1.5, 0.0],
            [1.0, 3.0, 0.0],
            [-1.0, 1.5, 0.0],
            [5.0, 5.0, 0.0],
        ];
        let mesh = SourceMesh::from_polygons("p", positions, &[vec![0, 1, 2, 3, 4], vec![2, 5, 3]]);
        assert_eq!(mesh.part_triangle_count(&mesh.parts[0]), 4);

        let part: MeshPart<Vertex> = build_mesh_part(&mesh, &mesh.parts[0], None, &no_textures());
        assert_eq!(part.indices.len(), 12);
        assert_eq!(part.vertices.len(), 6);
        assert_well_formed(&part);
    }

    #[test]
    fn test_generate_indices_is_bit_exact() {
        let a = Vertex { position: [0.0, 0.0, 0.0], color: [1.0; 4], normal: [0.0; 3], uv: [0.0; 2] };
        let mut b = a;
        b.position[0] = -0.0;
        let mut c = a;
        c.position[0] = f32::EPSILON;

        let (vertices, indices) = generate_indices(&[a, b, a, c, b]);
        assert_eq!(vertices.len(), 3);
        assert_eq!(indices, vec![0, 1, 0, 2, 1]);
    }

    #[test]
    fn test_color_texture_resolution() {
        let mut scene = SourceScene::new("s", SourceNode::new("root"));
        scene.textures.push(SourceTexture { filename: "wood.png".into() });
        let table = TextureTable::from_source(&scene, Path::new(""));

        let mesh = SourceMesh::from_polygons("m", vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[vec![0, 1, 2]]);
        let wood = SourceMaterial {
            name: "wood".into(),
            base_color: [1.0; 4],
            base_color_texture: Some("wood.png".into()),
        };
        let missing = SourceMaterial {
            base_color_texture: Some("stone.png".into()),
            ..wood.clone()
        };

        let part: MeshPart<Vertex> = build_mesh_part(&mesh, &mesh.parts[0], Some(&wood), &table);
        assert_eq!(part.color_texture, Some(TextureId(0)));

        let part: MeshPart<Vertex> = build_mesh_part(&mesh, &mesh.parts[0], Some(&missing), &table);
        assert_eq!(part.color_texture, None);
        assert!(!part.is_empty());
    }
}
