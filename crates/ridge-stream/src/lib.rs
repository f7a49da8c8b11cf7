//! Chunk streaming: the per-chunk generation state machine, the chunk store,
//! background generation jobs, and the controller that keeps a window of
//! chunks around a moving viewer.

pub mod chunk;
pub mod controller;
pub mod coord;
pub mod dispatch;
mod error;
pub mod job;
pub mod retention;
mod settings;
pub mod store;

pub use chunk::{
    COLLIDER_GENERATION_DISTANCE_THRESHOLD, ChunkContext, ChunkState, Delivery, LodMesh,
    TerrainChunk, VisibilityChange,
};
pub use controller::{StreamingController, TickReport, VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE};
pub use coord::ChunkCoord;
pub use dispatch::{InlineDispatcher, JobDispatcher, WorkerPool};
pub use error::StreamError;
pub use job::{GenerationJob, JobId, JobOutput, JobResult};
pub use retention::RetentionPolicy;
pub use settings::StreamSettings;
pub use store::ChunkStore;
