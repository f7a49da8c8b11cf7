use ridge_lod::LodError;
use ridge_mesh::MeshError;
use ridge_terrain::SettingsError;
use thiserror::Error;

/// Invalid streaming configuration, reported before any job is dispatched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    #[error("terrain settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("mesh settings: {0}")]
    Mesh(#[from] MeshError),

    #[error("detail levels: {0}")]
    Lod(#[from] LodError),

    #[error("eviction distance {distance} is below the max view distance {max_view_distance}")]
    EvictionDistance {
        distance: f32,
        max_view_distance: f32,
    },
}
