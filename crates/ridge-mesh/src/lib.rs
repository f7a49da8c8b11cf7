//! Terrain chunk triangulation: LOD-aware mesh building with seam-free
//! edges, border normals, and the chunk size table.

mod builder;
mod error;
mod mesh_data;
mod settings;

pub use builder::{HeightMapping, MeshBuilder};
pub use error::MeshError;
pub use mesh_data::MeshData;
pub use settings::{MeshSettings, NUM_SUPPORTED_CHUNK_SIZES, NUM_SUPPORTED_LODS, SUPPORTED_CHUNK_SIZES};
