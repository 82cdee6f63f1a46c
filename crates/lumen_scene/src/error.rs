use std::path::PathBuf;

use lumen_assets::AssetError;
use thiserror::Error;

/// Import aborts as a whole; no partial scene is ever returned.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to load scene {path}: {source}")]
    SourceParse {
        path: PathBuf,
        #[source]
        source: AssetError,
    },

    #[error("scene '{name}' is malformed: {source}")]
    InvalidScene {
        name: String,
        #[source]
        source: AssetError,
    },
}
