//! Per-chunk generation state machine.
//!
//! A chunk moves `Created → HeightPending → Ready` once, then keeps a lazily
//! filled mesh slot per detail level and a collider that is committed at most
//! once. All transitions run on the control thread; jobs are handed to the
//! dispatcher in [`ChunkContext`] and their results come back through
//! [`TerrainChunk::on_height_ready`] / [`TerrainChunk::on_mesh_ready`].

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ridge_math::Rect2;
use ridge_mesh::MeshData;
use ridge_terrain::{HeightField, VegetationInstance, VegetationScatter, derive_chunk_seed};
use tracing::debug;

use crate::coord::ChunkCoord;
use crate::dispatch::JobDispatcher;
use crate::job::{GenerationJob, JobId};
use crate::settings::StreamSettings;

/// The collider is committed once the viewer is this close to a chunk's bounds.
pub const COLLIDER_GENERATION_DISTANCE_THRESHOLD: f32 = 5.0;

/// Shared state a chunk needs while it updates: settings, where to send
/// jobs, and where the viewer is this tick.
pub struct ChunkContext<'a> {
    pub settings: &'a StreamSettings,
    pub dispatcher: &'a mut dyn JobDispatcher,
    pub viewer: Vec2,
}

/// Height generation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Created,
    HeightPending(JobId),
    /// Height field received; meshes can be requested.
    Ready,
    /// The height job failed; the chunk stays empty.
    Failed,
}

/// A chunk became visible or hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityChange {
    pub coord: ChunkCoord,
    pub visible: bool,
}

/// Outcome of handing a job result to a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The result was stored.
    Accepted(Option<VisibilityChange>),
    /// The result did not match a pending request and was dropped.
    Stale,
}

/// Mesh cache slot for one detail level.
#[derive(Clone, Debug, Default)]
pub struct LodMesh {
    mesh: Option<Arc<MeshData>>,
    pending: Option<JobId>,
    failed: bool,
}

impl LodMesh {
    pub fn mesh(&self) -> Option<&Arc<MeshData>> {
        self.mesh.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// A mesh was requested at some point (it may have arrived since).
    pub fn has_requested(&self) -> bool {
        self.mesh.is_some() || self.pending.is_some() || self.failed
    }
}

/// One square terrain chunk and its generation state.
pub struct TerrainChunk {
    coord: ChunkCoord,
    bounds: Rect2,
    sample_center: Vec2,
    state: ChunkState,
    height_field: Option<Arc<HeightField>>,
    lod_meshes: Vec<LodMesh>,
    visible: bool,
    displayed_lod_index: Option<usize>,
    collider: Option<Arc<MeshData>>,
    vegetation: Option<Vec<VegetationInstance>>,
}

impl TerrainChunk {
    pub fn new(coord: ChunkCoord, settings: &StreamSettings) -> Self {
        let world_size = settings.mesh_world_size();
        let center = coord.world_center(world_size);
        Self {
            coord,
            bounds: Rect2::from_center_size(center, Vec2::splat(world_size)),
            sample_center: center / settings.mesh().mesh_scale,
            state: ChunkState::Created,
            height_field: None,
            lod_meshes: vec![LodMesh::default(); settings.detail_levels().len()],
            visible: false,
            displayed_lod_index: None,
            collider: None,
            vegetation: None,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn bounds(&self) -> Rect2 {
        self.bounds
    }

    /// Centre of the chunk in height-grid cells, used to offset noise sampling.
    pub fn sample_center(&self) -> Vec2 {
        self.sample_center
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn height_field(&self) -> Option<&Arc<HeightField>> {
        self.height_field.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn displayed_lod_index(&self) -> Option<usize> {
        self.displayed_lod_index
    }

    /// The mesh currently shown, if any.
    pub fn displayed_mesh(&self) -> Option<&Arc<MeshData>> {
        self.displayed_lod_index
            .and_then(|index| self.lod_meshes.get(index))
            .and_then(LodMesh::mesh)
    }

    pub fn lod_mesh(&self, index: usize) -> Option<&LodMesh> {
        self.lod_meshes.get(index)
    }

    pub fn collider(&self) -> Option<&Arc<MeshData>> {
        self.collider.as_ref()
    }

    pub fn has_collider(&self) -> bool {
        self.collider.is_some()
    }

    pub fn vegetation(&self) -> Option<&[VegetationInstance]> {
        self.vegetation.as_deref()
    }

    /// Distance from `viewer` to the nearest point of the chunk bounds.
    pub fn distance_to(&self, viewer: Vec2) -> f32 {
        self.bounds.sqr_distance(viewer).sqrt()
    }

    /// Request the chunk's height field. Only the first call does anything.
    pub fn load(&mut self, ctx: &mut ChunkContext<'_>) -> Option<JobId> {
        if self.state != ChunkState::Created {
            return None;
        }
        let settings = ctx.settings;
        let id = ctx.dispatcher.dispatch(GenerationJob::Height {
            coord: self.coord,
            num_verts_per_line: settings.mesh().num_verts_per_line(),
            settings: Arc::clone(settings.height()),
            erosion: Arc::clone(settings.erosion()),
            sample_center: self.sample_center,
        });
        self.state = ChunkState::HeightPending(id);
        debug!(coord = %self.coord, ?id, "chunk height requested");
        Some(id)
    }

    /// Store the height field produced by job `id` and evaluate the chunk.
    pub fn on_height_ready(
        &mut self,
        id: JobId,
        field: HeightField,
        ctx: &mut ChunkContext<'_>,
    ) -> Delivery {
        if self.state != ChunkState::HeightPending(id) {
            return Delivery::Stale;
        }
        self.height_field = Some(Arc::new(field));
        self.state = ChunkState::Ready;
        debug!(coord = %self.coord, "chunk height ready");
        Delivery::Accepted(self.update(ctx))
    }

    /// Mark the height request `id` as failed. The chunk will not retry.
    pub fn on_height_failed(&mut self, id: JobId) -> Delivery {
        if self.state != ChunkState::HeightPending(id) {
            return Delivery::Stale;
        }
        self.state = ChunkState::Failed;
        Delivery::Accepted(None)
    }

    /// Re-evaluate visibility and displayed detail level for the viewer.
    ///
    /// No-op until the height field has arrived. Returns the visibility
    /// change, if any.
    pub fn update(&mut self, ctx: &mut ChunkContext<'_>) -> Option<VisibilityChange> {
        if self.state != ChunkState::Ready {
            return None;
        }
        let settings = ctx.settings;
        let levels = settings.detail_levels();
        let distance = self.distance_to(ctx.viewer);
        let was_visible = self.visible;
        let visible = distance <= levels.max_view_distance();

        if visible {
            let index = levels.select_index(distance);
            if self.displayed_lod_index != Some(index) {
                match self.lod_meshes.get(index) {
                    Some(slot) if slot.mesh.is_some() => {
                        self.displayed_lod_index = Some(index);
                        debug!(coord = %self.coord, lod_index = index, "chunk mesh swapped");
                    }
                    Some(slot) if !slot.has_requested() => self.request_mesh(index, ctx),
                    _ => {}
                }
            }
        }

        if visible != was_visible {
            self.visible = visible;
            debug!(coord = %self.coord, visible, "chunk visibility changed");
            Some(VisibilityChange {
                coord: self.coord,
                visible,
            })
        } else {
            None
        }
    }

    /// Store the mesh produced by job `id` for detail level `lod_index`.
    ///
    /// The mesh is cached even if the chunk is hidden or has moved on to a
    /// different level; it is only displayed if re-evaluation selects it.
    pub fn on_mesh_ready(
        &mut self,
        id: JobId,
        lod_index: usize,
        mesh: MeshData,
        ctx: &mut ChunkContext<'_>,
    ) -> Delivery {
        let Some(slot) = self.lod_meshes.get_mut(lod_index) else {
            return Delivery::Stale;
        };
        if slot.pending != Some(id) {
            return Delivery::Stale;
        }
        slot.pending = None;
        slot.mesh = Some(Arc::new(mesh));

        let change = self.update(ctx);
        if lod_index == ctx.settings.detail_levels().collider_lod_index() {
            self.update_collision(ctx);
        }
        Delivery::Accepted(change)
    }

    /// Mark the mesh request `id` as failed. The level is not requested again.
    pub fn on_mesh_failed(&mut self, id: JobId, lod_index: usize) -> Delivery {
        match self.lod_meshes.get_mut(lod_index) {
            Some(slot) if slot.pending == Some(id) => {
                slot.pending = None;
                slot.failed = true;
                Delivery::Accepted(None)
            }
            _ => Delivery::Stale,
        }
    }

    /// Request the collider mesh when the viewer gets near, and commit it
    /// once the viewer is within [`COLLIDER_GENERATION_DISTANCE_THRESHOLD`].
    /// The collider is set at most once.
    pub fn update_collision(&mut self, ctx: &mut ChunkContext<'_>) {
        if self.collider.is_some() || self.state != ChunkState::Ready {
            return;
        }
        let settings = ctx.settings;
        let levels = settings.detail_levels();
        let index = levels.collider_lod_index();
        let Some(info) = levels.get(index) else {
            return;
        };
        let sqr_distance = self.bounds.sqr_distance(ctx.viewer);

        if sqr_distance < info.sqr_visible_distance_threshold()
            && self.lod_meshes.get(index).is_some_and(|slot| !slot.has_requested())
        {
            self.request_mesh(index, ctx);
        }

        let commit_distance = COLLIDER_GENERATION_DISTANCE_THRESHOLD;
        if sqr_distance < commit_distance * commit_distance {
            if let Some(mesh) = self.lod_meshes.get(index).and_then(LodMesh::mesh) {
                self.collider = Some(Arc::clone(mesh));
                debug!(coord = %self.coord, "chunk collider set");
                self.scatter_vegetation(settings);
            }
        }
    }

    fn request_mesh(&mut self, index: usize, ctx: &mut ChunkContext<'_>) {
        let settings = ctx.settings;
        let (Some(field), Some(info)) = (&self.height_field, settings.detail_levels().get(index))
        else {
            return;
        };
        let id = ctx.dispatcher.dispatch(GenerationJob::Mesh {
            coord: self.coord,
            lod_index: index,
            lod: info.lod,
            field: Arc::clone(field),
            builder: Arc::clone(settings.builder()),
        });
        if let Some(slot) = self.lod_meshes.get_mut(index) {
            slot.pending = Some(id);
        }
        debug!(coord = %self.coord, lod_index = index, lod = info.lod, ?id, "chunk mesh requested");
    }

    fn scatter_vegetation(&mut self, settings: &StreamSettings) {
        let vegetation = settings.vegetation();
        if !vegetation.enabled || self.vegetation.is_some() {
            return;
        }
        let Some(field) = &self.height_field else {
            return;
        };
        let seed = derive_chunk_seed(vegetation.noise.seed as i64 as u64, self.sample_center);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        match VegetationScatter::new().scatter(field, vegetation, self.sample_center, &mut rng) {
            Ok(instances) => {
                debug!(coord = %self.coord, count = instances.len(), "vegetation scattered");
                self.vegetation = Some(instances);
            }
            Err(err) => {
                tracing::warn!(coord = %self.coord, %err, "vegetation scatter failed");
                self.vegetation = Some(Vec::new());
            }
        }
    }
}
