use std::path::PathBuf;

use lumen_assets::AssetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: AssetError,
    },

    /// The device only takes 1, 2 and 4 channel textures.
    #[error("no texture format for {0}-channel images")]
    UnsupportedChannels(u8),

    #[error("device error: {0}")]
    Device(String),
}
