//! Errors surfaced by the `ridge` binary.

use ridge_config::ConfigError;
use ridge_mesh::MeshError;
use ridge_terrain::SettingsError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terrain generation failed: {0}")]
    Settings(#[from] SettingsError),

    #[error("mesh generation failed: {0}")]
    Mesh(#[from] MeshError),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to start generation workers: {0}")]
    Workers(#[source] std::io::Error),
}
