use glam::Mat4;
use lumen_assets::{MeshPart, MeshVertex, TextureTable, Vertex};
use lumen_core::{Camera, DirectionalLight, GlobalTransform, PointLight, SpotLight, Transform};

/// Index of a node in its [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// What a node carries. Exactly one payload per node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind<V = Vertex> {
    Empty,
    /// One part per material partition, in source order.
    Mesh { parts: Vec<MeshPart<V>> },
    PointLight(PointLight),
    SpotLight(SpotLight),
    DirectionalLight(DirectionalLight),
    Camera(Camera),
}

impl<V> NodeKind<V> {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Empty => "empty",
            NodeKind::Mesh { .. } => "mesh",
            NodeKind::PointLight(_) => "point light",
            NodeKind::SpotLight(_) => "spot light",
            NodeKind::DirectionalLight(_) => "directional light",
            NodeKind::Camera(_) => "camera",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node<V = Vertex> {
    /// Display name; not unique.
    pub name: String,
    pub kind: NodeKind<V>,
    pub local: Transform,
    /// Pivot offset applied to mesh vertices only, after `local`.
    pub geometry: Option<Transform>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl<V> Node<V> {
    pub fn new(name: impl Into<String>, kind: NodeKind<V>) -> Self {
        Self {
            name: name.into(),
            kind,
            local: Transform::IDENTITY,
            geometry: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, local: Transform) -> Self {
        self.local = local;
        self
    }

    pub fn with_geometry(mut self, geometry: Option<Transform>) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// In source order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local_transform(&self) -> Mat4 {
        self.local.compute_matrix()
    }

    /// Identity when the node has no geometry transform.
    pub fn geometry_transform(&self) -> Mat4 {
        self.geometry
            .map_or(Mat4::IDENTITY, |g| g.compute_matrix())
    }

    pub fn mesh_parts(&self) -> &[MeshPart<V>] {
        match &self.kind {
            NodeKind::Mesh { parts } => parts,
            _ => &[],
        }
    }

    pub fn mesh_parts_mut(&mut self) -> &mut [MeshPart<V>] {
        match &mut self.kind {
            NodeKind::Mesh { parts } => parts,
            _ => &mut [],
        }
    }
}

/// The imported node tree.
///
/// Nodes live in an arena; `parent` links are plain indices, so the only owner of a node is
/// the graph. The root is always the first node. The texture table belongs to the graph and
/// mesh parts refer into it by [`TextureId`](lumen_assets::TextureId).
#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraph<V = Vertex> {
    nodes: Vec<Node<V>>,
    textures: TextureTable,
}

impl<V> SceneGraph<V> {
    pub fn new(root: Node<V>, textures: TextureTable) -> Self {
        let mut root = root;
        root.parent = None;
        root.children.clear();
        Self {
            nodes: vec![root],
            textures,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends `node` as the last child of `parent`.
    ///
    /// # Panics
    /// If `parent` is not a node of this graph.
    pub fn add_child(&mut self, parent: NodeId, node: Node<V>) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "parent {parent:?} is not in the graph");

        let id = NodeId(self.nodes.len());
        let mut node = node;
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<V>> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<V>> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn textures(&self) -> &TextureTable {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureTable {
        &mut self.textures
    }

    /// Node ids in depth-first pre-order, children in source order.
    pub fn depth_first(&self) -> DepthFirst<'_, V> {
        DepthFirst {
            graph: self,
            stack: vec![self.root()],
        }
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.depth_first().find(|&id| self[id].name == name)
    }

    /// Transform relative to the scene root: `Global(parent) * Local(node)`.
    /// Recomputed on every call by walking the parent chain.
    pub fn global_transform(&self, id: NodeId) -> GlobalTransform {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self[node_id];
            chain.push(node_id);
            current = node.parent;
        }

        chain
            .iter()
            .rev()
            .fold(GlobalTransform(Mat4::IDENTITY), |parent, &node_id| {
                parent.mul_transform(&self[node_id].local)
            })
    }

    /// Places mesh vertices in world space: `Global(node) * Geometry(node)`.
    pub fn global_geometry_transform(&self, id: NodeId) -> Mat4 {
        self.global_transform(id).0 * self[id].geometry_transform()
    }

    /// Global transforms of every node in one pass, indexed like the arena.
    pub fn compute_global_transforms(&self) -> Vec<GlobalTransform> {
        let mut globals = vec![GlobalTransform::default(); self.nodes.len()];
        for id in self.depth_first() {
            let node = &self[id];
            globals[id.0] = match node.parent {
                Some(parent) => globals[parent.0].mul_transform(&node.local),
                None => GlobalTransform::from(node.local),
            };
        }
        globals
    }
}

impl<V: MeshVertex> SceneGraph<V> {
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats {
            textures: self.textures.len(),
            ..Default::default()
        };

        for node in &self.nodes {
            match &node.kind {
                NodeKind::Empty => stats.empties += 1,
                NodeKind::Mesh { parts } => {
                    stats.meshes += 1;
                    for part in parts {
                        if part.is_empty() {
                            stats.empty_parts += 1;
                        }
                        stats.parts += 1;
                        stats.vertices += part.vertices.len();
                        stats.indices += part.indices.len();
                    }
                }
                NodeKind::PointLight(_) | NodeKind::SpotLight(_) | NodeKind::DirectionalLight(_) => {
                    stats.lights += 1
                }
                NodeKind::Camera(_) => stats.cameras += 1,
            }
        }
        stats.nodes = self.nodes.len();
        stats
    }
}

impl<V> std::ops::Index<NodeId> for SceneGraph<V> {
    type Output = Node<V>;

    fn index(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.0]
    }
}

impl<V> std::ops::IndexMut<NodeId> for SceneGraph<V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<V> {
        &mut self.nodes[id.0]
    }
}

/// Pre-order walk with an explicit stack, so deep hierarchies cannot overflow.
pub struct DepthFirst<'a, V> {
    graph: &'a SceneGraph<V>,
    stack: Vec<NodeId>,
}

impl<V> Iterator for DepthFirst<'_, V> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.graph[id].children.iter().rev().copied());
        Some(id)
    }
}

/// Counts for the import summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub nodes: usize,
    pub empties: usize,
    pub meshes: usize,
    pub lights: usize,
    pub cameras: usize,
    pub parts: usize,
    pub empty_parts: usize,
    pub vertices: usize,
    pub indices: usize,
    pub textures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn empty(name: &str) -> Node {
        Node::new(name, NodeKind::Empty)
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut graph = SceneGraph::new(empty("root"), TextureTable::new());
        let a = graph.add_child(graph.root(), empty("a"));
        let b = graph.add_child(graph.root(), empty("b"));
        let a1 = graph.add_child(a, empty("a1"));

        assert_eq!(graph[graph.root()].children(), &[a, b]);
        assert_eq!(graph[a1].parent(), Some(a));
        assert_eq!(graph[graph.root()].parent(), None);

        let order: Vec<_> = graph.depth_first().map(|id| graph[id].name.as_str()).collect();
        assert_eq!(order, vec!["root", "a", "a1", "b"]);
        assert_eq!(graph.find("a1"), Some(a1));
    }

    #[test]
    fn test_root_global_is_its_local() {
        let local = Transform::from_xyz(1.0, 2.0, 3.0);
        let graph: SceneGraph = SceneGraph::new(empty("root").with_transform(local), TextureTable::new());
        assert_eq!(graph.global_transform(graph.root()).0, local.compute_matrix());
    }

    #[test]
    fn test_global_is_parent_times_local() {
        let mut graph = SceneGraph::new(
            empty("root").with_transform(Transform::from_rotation(Quat::from_rotation_y(0.3))),
            TextureTable::new(),
        );
        let arm = graph.add_child(
            graph.root(),
            empty("arm").with_transform(Transform::from_xyz(0.0, 1.0, 0.0).with_scale(Vec3::splat(2.0))),
        );
        let hand = graph.add_child(arm, empty("hand").with_transform(Transform::from_xyz(3.0, 0.0, 0.0)));

        for id in graph.depth_first() {
            let expected = match graph[id].parent() {
                Some(parent) => graph.global_transform(parent).0 * graph[id].local_transform(),
                None => graph[id].local_transform(),
            };
            assert!(graph.global_transform(id).0.abs_diff_eq(expected, 1e-6));
        }

        let cached = graph.compute_global_transforms();
        assert!(cached[hand.0].0.abs_diff_eq(graph.global_transform(hand).0, 1e-6));
    }

    #[test]
    fn test_geometry_transform_applies_after_global() {
        let mut graph = SceneGraph::new(empty("root"), TextureTable::new());
        let parent = graph.add_child(graph.root(), empty("parent").with_transform(Transform::from_xyz(0.0, 0.0, 10.0)));
        let mesh = graph.add_child(
            parent,
            Node::new("mesh", NodeKind::Mesh { parts: Vec::new() })
                .with_geometry(Some(Transform::from_scale(Vec3::splat(0.5)))),
        );

        let world = graph
            .global_geometry_transform(mesh)
            .transform_point3(Vec3::new(2.0, 0.0, 0.0));
        assert!(world.abs_diff_eq(Vec3::new(1.0, 0.0, 10.0), 1e-6));

        // Geometry transform does not leak into the node's own global transform
        assert_eq!(graph.global_transform(mesh).translation(), Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(graph[parent].geometry_transform(), Mat4::IDENTITY);
    }

    #[test]
    fn test_mesh_parts_on_other_kinds_are_empty() {
        let node: Node = Node::new("cam", NodeKind::Camera(Camera::default()));
        assert!(node.mesh_parts().is_empty());
        assert_eq!(node.kind.label(), "camera");
    }
}
