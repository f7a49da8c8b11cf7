//! Chunk size table and mesh scale.

use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// Number of levels of detail a chunk can be built at (`0..NUM_SUPPORTED_LODS`).
pub const NUM_SUPPORTED_LODS: u32 = 5;

/// Supported chunk edge lengths in mesh cells. Each is divisible by every
/// LOD step (1, 2, 4, 6, 8), so the simplified lattice lines up with the
/// full-resolution edge ring.
pub const SUPPORTED_CHUNK_SIZES: [usize; 9] = [48, 72, 96, 120, 144, 168, 192, 216, 240];

pub const NUM_SUPPORTED_CHUNK_SIZES: usize = SUPPORTED_CHUNK_SIZES.len();

/// Chunk dimensions shared by every chunk in a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// World units per grid cell.
    pub mesh_scale: f32,
    /// Index into [`SUPPORTED_CHUNK_SIZES`].
    pub chunk_size_index: usize,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            mesh_scale: 2.5,
            chunk_size_index: 0,
        }
    }
}

impl MeshSettings {
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.chunk_size_index >= NUM_SUPPORTED_CHUNK_SIZES {
            return Err(MeshError::ChunkSizeIndex {
                index: self.chunk_size_index,
                count: NUM_SUPPORTED_CHUNK_SIZES,
            });
        }
        if !self.mesh_scale.is_finite() || self.mesh_scale <= 0.0 {
            return Err(MeshError::MeshScale(self.mesh_scale));
        }
        Ok(())
    }

    /// Chunk edge length in mesh cells at LOD 0.
    pub fn chunk_size(&self) -> usize {
        SUPPORTED_CHUNK_SIZES[self.chunk_size_index.min(NUM_SUPPORTED_CHUNK_SIZES - 1)]
    }

    /// Height samples per grid edge. The chunk size is the span of the
    /// simplified lattice; the mesh-edge ring and the out-of-mesh normal ring
    /// add two samples per side, plus one for the fencepost.
    pub fn num_verts_per_line(&self) -> usize {
        self.chunk_size() + 5
    }

    /// Edge length of a chunk in world units.
    pub fn mesh_world_size(&self) -> f32 {
        (self.num_verts_per_line() - 3) as f32 * self.mesh_scale
    }
}
