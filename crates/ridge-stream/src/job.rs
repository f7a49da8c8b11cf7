//! Self-contained generation jobs that can run on any thread.
//!
//! A job owns (or shares read-only through `Arc`) everything it needs, so
//! workers never touch the chunk store. Results are routed back to their
//! chunk by coordinate and matched against the chunk's pending [`JobId`].

use std::sync::Arc;

use glam::Vec2;
use ridge_mesh::{MeshBuilder, MeshData, MeshError};
use ridge_terrain::{
    ErosionSettings, HeightField, HeightMapSettings, SettingsError, generate_height_field,
};

use crate::coord::ChunkCoord;

/// Handle of a dispatched job, unique per dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

/// A unit of background generation work.
#[derive(Clone, Debug)]
pub enum GenerationJob {
    /// Noise, falloff and erosion for one chunk.
    Height {
        coord: ChunkCoord,
        num_verts_per_line: usize,
        settings: Arc<HeightMapSettings>,
        erosion: Arc<ErosionSettings>,
        sample_center: Vec2,
    },
    /// Triangulation of a chunk's height field at one detail level.
    Mesh {
        coord: ChunkCoord,
        /// Index into the detail level table.
        lod_index: usize,
        lod: u32,
        field: Arc<HeightField>,
        builder: Arc<MeshBuilder>,
    },
}

/// Output of a finished job.
#[derive(Debug)]
pub enum JobOutput {
    Height(Result<HeightField, SettingsError>),
    Mesh {
        lod_index: usize,
        result: Result<MeshData, MeshError>,
    },
}

/// A finished job, ready to be routed back to its chunk.
#[derive(Debug)]
pub struct JobResult {
    pub id: JobId,
    pub coord: ChunkCoord,
    pub output: JobOutput,
}

impl GenerationJob {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            Self::Height { coord, .. } | Self::Mesh { coord, .. } => *coord,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Height { .. } => "height",
            Self::Mesh { .. } => "mesh",
        }
    }

    /// Run the job to completion on the calling thread. Pure: the output
    /// depends only on the job's inputs.
    pub fn run(&self, id: JobId) -> JobResult {
        let output = match self {
            Self::Height {
                num_verts_per_line,
                settings,
                erosion,
                sample_center,
                ..
            } => JobOutput::Height(generate_height_field(
                *num_verts_per_line,
                settings,
                erosion,
                *sample_center,
            )),
            Self::Mesh {
                lod_index,
                lod,
                field,
                builder,
                ..
            } => JobOutput::Mesh {
                lod_index: *lod_index,
                result: builder.build(field, *lod),
            },
        };
        JobResult {
            id,
            coord: self.coord(),
            output,
        }
    }
}
