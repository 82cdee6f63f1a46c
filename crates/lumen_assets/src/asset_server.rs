use std::path::{Path, PathBuf};

use crate::{error::AssetError, settings::ImportSettings, source::SourceScene};

pub mod gltf_parser;
pub mod obj_parser;

pub use gltf_parser::GltfParser;
pub use obj_parser::ObjParser;

/// Scene file formats the server knows how to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Gltf,
    Obj,
}

impl SourceFormat {
    /// Picks the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("gltf" | "glb") => Ok(SourceFormat::Gltf),
            Some("obj") => Ok(SourceFormat::Obj),
            _ => Err(AssetError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Reads a scene file into the in-memory source scene.
pub trait SceneParser {
    fn parse(&self, path: &Path) -> Result<SourceScene, AssetError>;
}

/// Front door for loading source scenes from disk.
#[derive(Clone, Debug, Default)]
pub struct AssetServer {
    settings: ImportSettings,
}

impl AssetServer {
    pub fn new(settings: ImportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Parses and validates a scene. The result is safe to hand to the importer.
    pub fn load_scene(&self, path: impl AsRef<Path>) -> Result<SourceScene, AssetError> {
        let path = path.as_ref();
        let format = SourceFormat::from_path(path)?;

        log::info!("Scene: {}", path.display());

        let scene = match format {
            SourceFormat::Gltf => GltfParser.parse(path)?,
            SourceFormat::Obj => ObjParser.parse(path)?,
        };
        scene.validate()?;

        log::debug!(
            "Parsed '{}': {} nodes, {} meshes, {} materials, {} textures",
            scene.name,
            scene.node_count(),
            scene.meshes.len(),
            scene.materials.len(),
            scene.textures.len()
        );
        Ok(scene)
    }

    /// Where texture filenames of the scene at `path` resolve.
    pub fn asset_root_for(&self, path: impl AsRef<Path>) -> PathBuf {
        self.settings.asset_root_for(path.as_ref())
    }
}

/// The scene's display name: the file stem, or the whole path if it has none.
pub(crate) fn scene_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
