use thiserror::Error;

/// Errors raised while validating mesh settings or building a mesh.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("chunk size index {index} is outside the supported table (0..{count})")]
    ChunkSizeIndex { index: usize, count: usize },

    #[error("mesh scale must be positive and finite, got {0}")]
    MeshScale(f32),

    #[error("level of detail {lod} is not supported (max {max})")]
    LodOutOfRange { lod: u32, max: u32 },

    #[error("height grid is {actual} cells per edge, expected {expected}")]
    GridSize { expected: usize, actual: usize },
}
