use std::path::{Path, PathBuf};

use lumen_assets::{
    AssetServer, ImportSettings, MeshPart, SourceLight, TextureId, TextureTable, Vertex,
    build_mesh_part,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_gltf_hierarchy_and_payloads() {
    let scene = AssetServer::default()
        .load_scene(fixture("workshop.gltf"))
        .unwrap();

    assert_eq!(scene.name, "workshop");
    assert_eq!(scene.root.name, "Workshop");
    let names: Vec<_> = scene.root.children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Table", "Sun", "Lamp", "Eye"]);

    let top = &scene.root.children[0].children[0];
    assert_eq!(top.name, "Top");
    assert_eq!(top.mesh, Some(0));
    assert_eq!(top.transform.scale.x, 0.5);
    assert!(top.geometry_transform.is_none());

    assert_eq!(scene.root.children[1].light, Some(0));
    assert_eq!(scene.root.children[3].camera, Some(0));

    match scene.lights[0] {
        SourceLight::Directional(sun) => assert_eq!(sun.intensity, 3.0),
        other => panic!("expected a directional light, got {other:?}"),
    }
    match scene.lights[1] {
        SourceLight::Spot(lamp) => {
            assert_eq!(lamp.range, 12.0);
            assert_eq!(lamp.angle, 0.6);
        }
        other => panic!("expected a spot light, got {other:?}"),
    }

    let camera = scene.cameras[0];
    assert_eq!(camera.fov, 0.8);
    assert_eq!(camera.aspect_ratio, 1.5);
    assert_eq!(camera.far, lumen_core::Camera::default().far);
}

#[test]
fn test_gltf_primitives_become_parts() {
    let scene = AssetServer::default()
        .load_scene(fixture("workshop.gltf"))
        .unwrap();
    let mesh = &scene.meshes[0];

    assert_eq!(mesh.parts.len(), 2);
    assert_eq!(mesh.parts[0].material, Some(0));
    assert_eq!(mesh.parts[1].material, Some(1));
    assert_eq!(mesh.part_triangle_count(&mesh.parts[0]), 2);
    // Triangle fan over the same four vertices
    assert_eq!(mesh.part_triangle_count(&mesh.parts[1]), 2);
    assert!(mesh.normals.is_none());

    let textures = TextureTable::from_source(&scene, Path::new("assets"));
    let oak: MeshPart<Vertex> =
        build_mesh_part(mesh, &mesh.parts[0], scene.materials.first(), &textures);
    assert_eq!(oak.vertices.len(), 4);
    assert_eq!(oak.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(oak.color_texture, Some(TextureId(0)));
}

#[test]
fn test_gltf_embedded_images_stay_out_of_the_library() {
    let scene = AssetServer::default()
        .load_scene(fixture("workshop.gltf"))
        .unwrap();

    let filenames: Vec<_> = scene.textures.iter().map(|t| t.filename.as_str()).collect();
    assert_eq!(filenames, vec!["textures/oak.png"]);
    assert_eq!(scene.materials[2].base_color_texture, None);
}

#[test]
fn test_obj_models_materials_and_textures() {
    let scene = AssetServer::default().load_scene(fixture("room.obj")).unwrap();

    let names: Vec<_> = scene.root.children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Floor", "Wall", "Gable"]);
    assert!(scene.lights.is_empty() && scene.cameras.is_empty());

    let filenames: Vec<_> = scene.textures.iter().map(|t| t.filename.as_str()).collect();
    assert_eq!(filenames, vec!["textures/oak.png", "textures/oak_normal.png"]);

    assert_eq!(scene.materials[1].name, "oak_dark");
    assert_eq!(scene.materials[1].base_color[3], 0.9);

    // Two materials, one texture file: both parts resolve to the same entry.
    let table = TextureTable::from_source(&scene, &AssetServer::default().asset_root_for(fixture("room.obj")));
    let floor = &scene.meshes[0];
    let wall = &scene.meshes[1];
    let floor_part: MeshPart<Vertex> = build_mesh_part(
        floor,
        &floor.parts[0],
        floor.parts[0].material.map(|m| &scene.materials[m]),
        &table,
    );
    let wall_part: MeshPart<Vertex> = build_mesh_part(
        wall,
        &wall.parts[0],
        wall.parts[0].material.map(|m| &scene.materials[m]),
        &table,
    );
    assert_eq!(floor_part.color_texture, Some(TextureId(0)));
    assert_eq!(wall_part.color_texture, floor_part.color_texture);
    assert_eq!(table.get(TextureId(0)).unwrap().path, fixture("textures/oak.png"));
}

#[test]
fn test_obj_pentagon_is_triangulated() {
    let scene = AssetServer::default().load_scene(fixture("room.obj")).unwrap();
    let gable = &scene.meshes[2];

    assert_eq!(gable.faces.len(), 1);
    assert_eq!(gable.faces[0].num_indices, 5);

    let part: MeshPart<Vertex> =
        build_mesh_part(gable, &gable.parts[0], None, &TextureTable::new());
    assert_eq!(part.triangle_count(), 3);
    assert_eq!(part.vertices.len(), 5);
}

#[test]
fn test_settings_file_drives_asset_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("import.json");
    std::fs::write(&path, r#"{ "asset_root": "/srv/assets", "vertex_layout": "pbr" }"#).unwrap();

    let server = AssetServer::new(ImportSettings::load(&path).unwrap());
    assert_eq!(server.asset_root_for("scenes/a.gltf"), PathBuf::from("/srv/assets"));
}
