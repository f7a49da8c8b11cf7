//! The `ridge` binary: terrain previews and headless streaming runs.

mod error;
mod preview;
mod stream;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use glam::Vec2;
use ridge_config::{CliArgs, Config, default_config_dir};
use ridge_stream::{StreamingController, WorkerPool};
use tracing::info;

use crate::error::AppError;
use crate::preview::{PreviewMode, run_preview};
use crate::stream::{ConfigWatch, Flight, run_flight};

#[derive(Parser, Debug)]
#[command(name = "ridge", about = "Procedural terrain generation and streaming")]
struct Cli {
    #[command(flatten)]
    overrides: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a single chunk and write a PNG preview.
    Preview {
        #[arg(long, value_enum, default_value_t = PreviewMode::Noise)]
        mode: PreviewMode,
        /// Output image path.
        #[arg(long, default_value = "preview.png")]
        out: PathBuf,
        /// Sample center of the chunk, in grid cells.
        #[arg(long, default_value_t = 0.0)]
        center_x: f32,
        #[arg(long, default_value_t = 0.0)]
        center_y: f32,
    },
    /// Stream chunks around a viewer flying across the terrain.
    Stream {
        #[arg(long, default_value_t = 600)]
        ticks: u32,
        /// World units travelled per tick.
        #[arg(long, default_value_t = 5.0)]
        speed: f32,
        /// Milliseconds between ticks.
        #[arg(long, default_value_t = 16)]
        interval_ms: u64,
        /// Ticks between checks of `config.ron` for edits (0 = never).
        #[arg(long, default_value_t = 60)]
        reload_every: u32,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("ridge: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config_dir = match &cli.overrides.config {
        Some(dir) => dir.clone(),
        None => default_config_dir()?,
    };
    let on_disk = Config::load_or_create(&config_dir)?;
    let mut config = on_disk.clone();
    config.apply_cli_overrides(&cli.overrides);

    ridge_log::init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );
    info!(config_dir = %config_dir.display(), "configuration loaded");

    match cli.command {
        Command::Preview {
            mode,
            out,
            center_x,
            center_y,
        } => {
            run_preview(&config, mode, Vec2::new(center_x, center_y), &out)?;
        }
        Command::Stream {
            ticks,
            speed,
            interval_ms,
            reload_every,
        } => {
            let settings = config.stream_settings()?;
            let pool = match config.streaming.worker_threads {
                0 => WorkerPool::with_defaults(),
                n => WorkerPool::new(n),
            }
            .map_err(AppError::Workers)?;
            info!(workers = pool.worker_count(), "generation workers started");

            let mut controller = StreamingController::new(settings, pool);
            let flight = Flight {
                ticks,
                speed,
                heading: Vec2::new(1.0, 0.5).normalize(),
                interval: Duration::from_millis(interval_ms),
            };
            let mut watch = (reload_every > 0)
                .then(|| ConfigWatch::new(config_dir, on_disk, cli.overrides, reload_every));
            let summary = run_flight(&mut controller, &flight, watch.as_mut());
            info!(?summary, "stream finished");
        }
    }
    Ok(())
}
