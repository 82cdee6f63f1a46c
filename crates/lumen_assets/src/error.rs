use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("unsupported scene format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid source scene: {0}")]
    InvalidSource(String),

    #[error("invalid import settings: {0}")]
    Config(#[from] serde_json::Error),
}
