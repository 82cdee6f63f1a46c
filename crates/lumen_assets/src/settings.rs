use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Which vertex record the mesh part builder emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexLayout {
    /// position, color, normal, uv
    #[default]
    Basic,
    /// position, color, normal, tangent, bitangent, uv
    Pbr,
}

/// Knobs for a single scene import.
///
/// ```json
/// { "asset_root": "assets", "vertex_layout": "pbr", "flip_textures_vertically": true }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Directory texture filenames resolve against. Defaults to the scene file's directory.
    pub asset_root: Option<PathBuf>,
    pub vertex_layout: VertexLayout,
    /// Flip decoded texture rows so row 0 is the bottom of the image.
    ///
    /// Off by default, so rows stay in file order (top first). A PBR pipeline sampling with
    /// a bottom-left UV origin has to turn it on.
    pub flip_textures_vertically: bool,
    /// Expand 3-channel images to RGBA before upload. Devices only take 1, 2 or 4 channels.
    pub expand_rgb_to_rgba: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            asset_root: None,
            vertex_layout: VertexLayout::Basic,
            flip_textures_vertically: false,
            expand_rgb_to_rgba: true,
        }
    }
}

impl ImportSettings {
    pub fn from_json(text: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// The directory relative texture filenames are joined onto for a given scene file.
    pub fn asset_root_for(&self, scene_path: &Path) -> PathBuf {
        match &self.asset_root {
            Some(root) => root.clone(),
            None => scene_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}
