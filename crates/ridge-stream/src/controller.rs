//! Top-level streaming loop: keeps a window of chunks around the viewer.

use glam::Vec2;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::chunk::{ChunkContext, Delivery, TerrainChunk, VisibilityChange};
use crate::coord::ChunkCoord;
use crate::dispatch::JobDispatcher;
use crate::job::{JobOutput, JobResult};
use crate::retention::RetentionPolicy;
use crate::settings::StreamSettings;
use crate::store::ChunkStore;

/// The visible window is only re-evaluated after the viewer has moved this
/// far from where it was last evaluated.
pub const VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE: f32 = 25.0;
const SQR_VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE: f32 =
    VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE * VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE;

/// What happened during one [`StreamingController::tick`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Job results stored in their chunk.
    pub results_applied: usize,
    /// Job results dropped because their chunk is gone or moved on.
    pub results_discarded: usize,
    pub chunks_created: usize,
    pub chunks_evicted: usize,
    /// Whether the visible window was re-evaluated this tick.
    pub refreshed: bool,
    /// Chunks that became visible or hidden, in the order it happened.
    pub visibility_changes: Vec<VisibilityChange>,
}

/// Drives chunk creation, generation and visibility from the viewer position.
///
/// Owns the chunk store, the list of visible chunks and the job dispatcher.
/// Call [`tick`](Self::tick) once per frame from the control thread.
pub struct StreamingController<D: JobDispatcher> {
    settings: StreamSettings,
    dispatcher: D,
    store: ChunkStore,
    visible_chunks: Vec<ChunkCoord>,
    /// Viewer position at the previous tick.
    last_viewer: Option<Vec2>,
    /// Viewer position when the visible window was last evaluated.
    refresh_origin: Option<Vec2>,
    /// Centre of the load window at the last refresh.
    window_center: Option<ChunkCoord>,
    chunks_visible_in_view_distance: i32,
}

impl<D: JobDispatcher> StreamingController<D> {
    pub fn new(settings: StreamSettings, dispatcher: D) -> Self {
        let chunks_visible_in_view_distance = settings.chunks_visible_in_view_distance();
        info!(
            max_view_distance = settings.detail_levels().max_view_distance(),
            mesh_world_size = settings.mesh_world_size(),
            chunks_visible_in_view_distance,
            retention = ?settings.retention(),
            "terrain streaming initialized"
        );
        Self {
            settings,
            dispatcher,
            store: ChunkStore::new(),
            visible_chunks: Vec::new(),
            last_viewer: None,
            refresh_origin: None,
            window_center: None,
            chunks_visible_in_view_distance,
        }
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.store.get(coord)
    }

    /// Chunks currently visible, in the order they became visible.
    pub fn visible_chunks(&self) -> &[ChunkCoord] {
        &self.visible_chunks
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    /// Swap in new settings and drop every chunk built with the old ones.
    ///
    /// The window is rebuilt on the next tick. Results of jobs still in
    /// flight no longer match any chunk and are discarded on arrival.
    pub fn replace_settings(&mut self, settings: StreamSettings) {
        self.chunks_visible_in_view_distance = settings.chunks_visible_in_view_distance();
        info!(
            max_view_distance = settings.detail_levels().max_view_distance(),
            mesh_world_size = settings.mesh_world_size(),
            chunks_visible_in_view_distance = self.chunks_visible_in_view_distance,
            dropped = self.store.len(),
            "terrain settings replaced"
        );
        self.settings = settings;
        self.store = ChunkStore::new();
        self.visible_chunks.clear();
        self.refresh_origin = None;
        self.window_center = None;
    }

    /// Advance streaming for the viewer at `viewer`.
    ///
    /// 1. Route finished jobs to their chunks.
    /// 2. If the viewer moved, re-check colliders of visible chunks.
    /// 3. On the first tick, or once the viewer has moved past
    ///    [`VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE`], re-evaluate the window.
    /// 4. Apply the retention policy.
    pub fn tick(&mut self, viewer: Vec2) -> TickReport {
        let mut report = TickReport::default();

        self.apply_results(viewer, &mut report);

        if self.last_viewer != Some(viewer) {
            self.update_collisions(viewer);
        }

        let refresh = self
            .refresh_origin
            .is_none_or(|origin| origin.distance_squared(viewer) > SQR_VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE);
        if refresh {
            self.refresh_origin = Some(viewer);
            self.update_visible_chunks(viewer, &mut report);
            report.refreshed = true;
        }

        self.apply_retention(viewer, &mut report);
        self.last_viewer = Some(viewer);

        if report.chunks_created > 0 || report.chunks_evicted > 0 {
            debug!(
                created = report.chunks_created,
                evicted = report.chunks_evicted,
                loaded = self.store.len(),
                visible = self.visible_chunks.len(),
                in_flight = self.dispatcher.in_flight(),
                "chunk window updated"
            );
        }
        report
    }

    fn apply_results(&mut self, viewer: Vec2, report: &mut TickReport) {
        for JobResult { id, coord, output } in self.dispatcher.drain() {
            let delivery = match self.store.get_mut(coord) {
                None => Delivery::Stale,
                Some(chunk) => {
                    let mut ctx = ChunkContext {
                        settings: &self.settings,
                        dispatcher: &mut self.dispatcher,
                        viewer,
                    };
                    match output {
                        JobOutput::Height(Ok(field)) => chunk.on_height_ready(id, field, &mut ctx),
                        JobOutput::Height(Err(err)) => {
                            warn!(%coord, %err, "chunk height generation failed");
                            chunk.on_height_failed(id)
                        }
                        JobOutput::Mesh {
                            lod_index,
                            result: Ok(mesh),
                        } => chunk.on_mesh_ready(id, lod_index, mesh, &mut ctx),
                        JobOutput::Mesh {
                            lod_index,
                            result: Err(err),
                        } => {
                            warn!(%coord, lod_index, %err, "chunk mesh generation failed");
                            chunk.on_mesh_failed(id, lod_index)
                        }
                    }
                }
            };

            match delivery {
                Delivery::Accepted(change) => {
                    report.results_applied += 1;
                    if let Some(change) = change {
                        record_visibility(&mut self.visible_chunks, change, report);
                    }
                }
                Delivery::Stale => {
                    report.results_discarded += 1;
                    debug!(%coord, ?id, "discarded stale job result");
                }
            }
        }
    }

    fn update_collisions(&mut self, viewer: Vec2) {
        let mut ctx = ChunkContext {
            settings: &self.settings,
            dispatcher: &mut self.dispatcher,
            viewer,
        };
        for coord in &self.visible_chunks {
            if let Some(chunk) = self.store.get_mut(*coord) {
                chunk.update_collision(&mut ctx);
            }
        }
    }

    fn update_visible_chunks(&mut self, viewer: Vec2, report: &mut TickReport) {
        let mut already_updated = FxHashSet::default();
        let previously_visible = self.visible_chunks.clone();
        let mut ctx = ChunkContext {
            settings: &self.settings,
            dispatcher: &mut self.dispatcher,
            viewer,
        };

        for &coord in previously_visible.iter().rev() {
            already_updated.insert(coord);
            if let Some(change) = self.store.get_mut(coord).and_then(|chunk| chunk.update(&mut ctx)) {
                record_visibility(&mut self.visible_chunks, change, report);
            }
        }

        let current = ChunkCoord::from_world(viewer, self.settings.mesh_world_size());
        self.window_center = Some(current);
        let reach = self.chunks_visible_in_view_distance;
        for y_offset in -reach..=reach {
            for x_offset in -reach..=reach {
                let coord = current.offset(x_offset, y_offset);
                if already_updated.contains(&coord) {
                    continue;
                }
                match self.store.get_mut(coord) {
                    Some(chunk) => {
                        if let Some(change) = chunk.update(&mut ctx) {
                            record_visibility(&mut self.visible_chunks, change, report);
                        }
                    }
                    None => {
                        let mut chunk = TerrainChunk::new(coord, &self.settings);
                        chunk.load(&mut ctx);
                        self.store.insert(chunk);
                        report.chunks_created += 1;
                    }
                }
            }
        }
    }

    fn apply_retention(&mut self, viewer: Vec2, report: &mut TickReport) {
        let policy = self.settings.retention();
        if policy == RetentionPolicy::KeepAll {
            return;
        }
        // The window's corners reach past the view distance; chunks inside it
        // stay until the window moves away from them.
        let window = self.window_center;
        let reach = self.chunks_visible_in_view_distance;
        let in_window = |coord: ChunkCoord| {
            window.is_some_and(|center| {
                (coord.x - center.x).abs() <= reach && (coord.y - center.y).abs() <= reach
            })
        };
        let evicted = self.store.retain(|chunk| {
            in_window(chunk.coord())
                || !policy.should_evict(chunk.distance_to(viewer), chunk.is_visible())
        });
        if !evicted.is_empty() {
            self.visible_chunks.retain(|coord| !evicted.contains(coord));
            report.chunks_evicted += evicted.len();
        }
    }
}

/// Keep the visible list in sync with a chunk's visibility event.
fn record_visibility(visible: &mut Vec<ChunkCoord>, change: VisibilityChange, report: &mut TickReport) {
    if change.visible {
        if !visible.contains(&change.coord) {
            visible.push(change.coord);
        }
    } else {
        visible.retain(|coord| *coord != change.coord);
    }
    report.visibility_changes.push(change);
}
