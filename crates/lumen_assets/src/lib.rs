pub mod asset_server;
pub mod assets;
pub mod error;
pub mod material;
pub mod mesh_builder;
pub mod settings;
pub mod source;
pub mod texture_table;
pub mod triangulate;

pub use asset_server::{AssetServer, SceneParser, SourceFormat};
pub use assets::{
    CornerAttributes, GpuBuffer, GpuMeshPart, GpuTexture, Handle, MeshPart, MeshVertex, PbrVertex,
    Vertex,
};
pub use error::AssetError;
pub use material::{DecodedImage, FileImageLoader, ImageLoader, TextureData, TextureFormat};
pub use mesh_builder::{build_mesh_part, generate_indices};
pub use settings::{ImportSettings, VertexLayout};
pub use source::{
    Face, SourceLight, SourceMaterial, SourceMesh, SourceMeshPart, SourceNode, SourceScene,
    SourceTexture, VertexStream,
};
pub use texture_table::{TextureEntry, TextureId, TextureTable, resolve_asset_path};
