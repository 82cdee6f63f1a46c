use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{
    assets::{GpuTexture, Handle},
    source::SourceScene,
};

/// Position of an entry in a [`TextureTable`]. Mesh parts hold these instead of owning textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct TextureEntry {
    /// Resolved path handed to the image decoder.
    pub path: PathBuf,
    /// Filled in by the upload pass.
    pub handle: Option<Handle<GpuTexture>>,
}

/// Scene-wide list of distinct texture files, one entry per resolved path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureTable {
    entries: Vec<TextureEntry>,
    // Source filename (as written in the material library) -> entry
    by_filename: HashMap<String, TextureId>,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerates the scene's whole texture library, not just textures a visible mesh uses.
    /// Filenames resolving to the same path share one entry; order is first appearance.
    pub fn from_source(scene: &SourceScene, asset_root: &Path) -> Self {
        let mut table = Self::new();
        for texture in &scene.textures {
            table.insert(&texture.filename, asset_root);
        }
        log::info!("Texture table: {} entries", table.len());
        table
    }

    /// Adds a source filename, returning the entry it resolves to.
    pub fn insert(&mut self, filename: &str, asset_root: &Path) -> TextureId {
        if let Some(&id) = self.by_filename.get(filename) {
            return id;
        }

        let path = resolve_asset_path(asset_root, filename);
        let id = match self.entries.iter().position(|e| e.path == path) {
            Some(existing) => TextureId(existing),
            None => {
                log::debug!("Texture Path: {}", path.display());
                self.entries.push(TextureEntry { path, handle: None });
                TextureId(self.entries.len() - 1)
            }
        };

        self.by_filename.insert(filename.to_owned(), id);
        id
    }

    /// Exact match on the filename the source material used.
    pub fn find(&self, filename: &str) -> Option<TextureId> {
        self.by_filename.get(filename).copied()
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureEntry> {
        self.entries.get(id.0)
    }

    /// Only the device handle may change after import; paths are fixed.
    pub fn set_handle(&mut self, id: TextureId, handle: Handle<GpuTexture>) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.handle = Some(handle);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &TextureEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (TextureId(i), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Joins a source filename onto the asset root, normalising `\` separators and `./` segments.
/// Absolute filenames are kept as they are.
pub fn resolve_asset_path(asset_root: &Path, filename: &str) -> PathBuf {
    let normalized = filename.replace('\\', "/");
    let relative = Path::new(&normalized);
    if relative.is_absolute() {
        return relative.to_path_buf();
    }

    let mut path = asset_root.to_path_buf();
    for component in relative.components() {
        match component {
            std::path::Component::CurDir => {}
            other => path.push(other),
        }
    }
    path
}
