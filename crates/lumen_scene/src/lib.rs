//! The node model and the importer that builds it from a parsed source scene.

pub mod error;
pub mod graph;
pub mod importer;

pub use error::ImportError;
pub use graph::{DepthFirst, Node, NodeId, NodeKind, SceneGraph, SceneStats};
pub use importer::{SceneImporter, import_source};
