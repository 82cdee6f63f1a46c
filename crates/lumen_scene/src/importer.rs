use std::path::Path;

use lumen_assets::{
    AssetServer, ImportSettings, MeshPart, MeshVertex, SourceLight, SourceNode, SourceScene,
    TextureTable, build_mesh_part,
};

use crate::{
    error::ImportError,
    graph::{Node, NodeId, NodeKind, SceneGraph},
};

/// Loads scene files and turns them into a [`SceneGraph`].
#[derive(Clone, Debug, Default)]
pub struct SceneImporter {
    server: AssetServer,
}

impl SceneImporter {
    pub fn new(settings: ImportSettings) -> Self {
        Self {
            server: AssetServer::new(settings),
        }
    }

    pub fn settings(&self) -> &ImportSettings {
        self.server.settings()
    }

    /// Parses `path` and builds the node tree. Any parse failure aborts the whole import.
    pub fn import<V: MeshVertex>(&self, path: impl AsRef<Path>) -> Result<SceneGraph<V>, ImportError> {
        let path = path.as_ref();
        let source = self
            .server
            .load_scene(path)
            .map_err(|source| ImportError::SourceParse {
                path: path.to_path_buf(),
                source,
            })?;

        import_source(&source, &self.server.asset_root_for(path))
    }
}

/// Builds the node tree from an in-memory source scene.
///
/// The texture table is built first, from the scene's whole texture library. Nodes are then
/// created depth-first, each one fully built before any of its children.
pub fn import_source<V: MeshVertex>(
    scene: &SourceScene,
    asset_root: &Path,
) -> Result<SceneGraph<V>, ImportError> {
    scene.validate().map_err(|source| ImportError::InvalidScene {
        name: scene.name.clone(),
        source,
    })?;

    // 1. Scene-wide texture table (only the root builds it)
    let textures = TextureTable::from_source(scene, asset_root);

    // 2. Root
    let root = build_node(scene, &scene.root, &textures);
    let mut graph = SceneGraph::new(root, textures);

    // 3. Descendants, in source child order
    let mut stack: Vec<(&SourceNode, NodeId)> = scene
        .root
        .children
        .iter()
        .rev()
        .map(|child| (child, graph.root()))
        .collect();

    while let Some((source, parent)) = stack.pop() {
        let node = build_node(scene, source, graph.textures());
        let id = graph.add_child(parent, node);
        stack.extend(source.children.iter().rev().map(|child| (child, id)));
    }

    log::info!("Imported '{}': {} nodes", scene.name, graph.len());
    Ok(graph)
}

/// Classifies a source node (mesh, then light, then camera, else empty) and builds its payload.
fn build_node<V: MeshVertex>(scene: &SourceScene, source: &SourceNode, textures: &TextureTable) -> Node<V> {
    log::debug!("Object: {}", source.name);

    let kind = if let Some(mesh) = source.mesh.and_then(|i| scene.meshes.get(i)) {
        log::debug!("-> mesh with {} faces", mesh.faces.len());

        let parts: Vec<MeshPart<V>> = mesh
            .parts
            .iter()
            .map(|part| {
                let material = part.material.and_then(|m| scene.materials.get(m));
                build_mesh_part(mesh, part, material, textures)
            })
            .collect();
        NodeKind::Mesh { parts }
    } else if let Some(light) = source.light.and_then(|i| scene.lights.get(i)) {
        match *light {
            SourceLight::Point(point) => NodeKind::PointLight(point),
            SourceLight::Spot(spot) => NodeKind::SpotLight(spot),
            SourceLight::Directional(directional) => NodeKind::DirectionalLight(directional),
        }
    } else if let Some(&camera) = source.camera.and_then(|i| scene.cameras.get(i)) {
        NodeKind::Camera(camera)
    } else {
        NodeKind::Empty
    };

    // Geometry transforms only mean something for meshes
    let geometry = match kind {
        NodeKind::Mesh { .. } => source.geometry_transform,
        _ => None,
    };

    Node::new(&source.name, kind)
        .with_transform(source.transform)
        .with_geometry(geometry)
}
