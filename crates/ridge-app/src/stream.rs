//! Headless streaming run: a viewer flying in a straight line over the terrain.

use std::path::PathBuf;
use std::time::Duration;

use glam::Vec2;
use ridge_config::{CliArgs, Config};
use ridge_stream::{JobDispatcher, StreamSettings, StreamingController};
use tracing::{info, warn};

/// Parameters of the simulated flight.
#[derive(Clone, Copy, Debug)]
pub struct Flight {
    pub ticks: u32,
    /// World units travelled per tick.
    pub speed: f32,
    /// Unit direction of travel.
    pub heading: Vec2,
    /// Pause between ticks, giving workers time to catch up.
    pub interval: Duration,
}

impl Flight {
    pub fn viewer_at(&self, tick: u32) -> Vec2 {
        self.heading * (tick as f32 * self.speed)
    }
}

/// Polls `config.ron` during a run and hands back settings when it changes.
pub struct ConfigWatch {
    dir: PathBuf,
    /// The file's contents as last read, before CLI overrides.
    on_disk: Config,
    overrides: CliArgs,
    /// Ticks between polls.
    every: u32,
}

impl ConfigWatch {
    pub fn new(dir: PathBuf, on_disk: Config, overrides: CliArgs, every: u32) -> Self {
        Self {
            dir,
            on_disk,
            overrides,
            every: every.max(1),
        }
    }

    /// Settings from the file if it changed since the last poll and still
    /// validates. Read errors and invalid edits are logged and skipped.
    pub fn poll(&mut self, tick: u32) -> Option<StreamSettings> {
        if tick == 0 || tick % self.every != 0 {
            return None;
        }
        let changed = match self.on_disk.reload(&self.dir) {
            Ok(changed) => changed?,
            Err(e) => {
                warn!(%e, "config reload failed");
                return None;
            }
        };
        self.on_disk = changed.clone();

        let mut config = changed;
        config.apply_cli_overrides(&self.overrides);
        match config.stream_settings() {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(%e, "reloaded config rejected");
                None
            }
        }
    }
}

/// Totals over a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub ticks: u32,
    pub refreshes: usize,
    /// Times the settings were replaced from a reloaded config.
    pub reloads: usize,
    pub chunks_created: usize,
    pub chunks_evicted: usize,
    pub results_applied: usize,
    pub results_discarded: usize,
    /// Chunks loaded at the end of the run.
    pub loaded: usize,
    pub visible: usize,
    pub meshed: usize,
    pub colliders: usize,
}

pub fn run_flight<D: JobDispatcher>(
    controller: &mut StreamingController<D>,
    flight: &Flight,
    mut watch: Option<&mut ConfigWatch>,
) -> StreamSummary {
    let mut summary = StreamSummary::default();

    for tick in 0..flight.ticks {
        if let Some(settings) = watch.as_mut().and_then(|watch| watch.poll(tick)) {
            info!(tick, "config changed, regenerating terrain");
            controller.replace_settings(settings);
            summary.reloads += 1;
        }

        let viewer = flight.viewer_at(tick);
        let report = controller.tick(viewer);

        summary.ticks += 1;
        summary.refreshes += usize::from(report.refreshed);
        summary.chunks_created += report.chunks_created;
        summary.chunks_evicted += report.chunks_evicted;
        summary.results_applied += report.results_applied;
        summary.results_discarded += report.results_discarded;

        if report.refreshed {
            info!(
                tick,
                x = viewer.x,
                y = viewer.y,
                created = report.chunks_created,
                evicted = report.chunks_evicted,
                visible = controller.visible_chunks().len(),
                in_flight = controller.dispatcher().in_flight(),
                "window refreshed"
            );
        }

        if !flight.interval.is_zero() {
            std::thread::sleep(flight.interval);
        }
    }

    let store = controller.store();
    summary.loaded = store.len();
    summary.visible = controller.visible_chunks().len();
    summary.meshed = store
        .iter()
        .filter(|(_, chunk)| chunk.displayed_mesh().is_some())
        .count();
    summary.colliders = store.iter().filter(|(_, chunk)| chunk.has_collider()).count();
    summary
}
