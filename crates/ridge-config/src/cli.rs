//! Command-line overrides for the Ridge terrain pipeline.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Ridge command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "ridge", about = "Procedural terrain generation and streaming")]
pub struct CliArgs {
    /// Terrain noise seed.
    #[arg(long)]
    pub seed: Option<i32>,

    /// Index into the supported chunk size table.
    #[arg(long)]
    pub chunk_size_index: Option<usize>,

    /// World units per grid cell.
    #[arg(long)]
    pub mesh_scale: Option<f32>,

    /// Run droplet erosion on each chunk.
    #[arg(long)]
    pub erosion: Option<bool>,

    /// Number of erosion droplets per chunk.
    #[arg(long)]
    pub erosion_iterations: Option<u32>,

    /// Subtract the island falloff map.
    #[arg(long)]
    pub falloff: Option<bool>,

    /// Generation worker threads (0 = automatic).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.terrain.noise.seed = seed;
        }
        if let Some(index) = args.chunk_size_index {
            self.mesh.chunk_size_index = index;
        }
        if let Some(scale) = args.mesh_scale {
            self.mesh.mesh_scale = scale;
        }
        if let Some(erosion) = args.erosion {
            self.terrain.use_erosion = erosion;
        }
        if let Some(iterations) = args.erosion_iterations {
            self.erosion.num_iterations = iterations;
        }
        if let Some(falloff) = args.falloff {
            self.terrain.use_falloff = falloff;
        }
        if let Some(workers) = args.workers {
            self.streaming.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(99),
            erosion: Some(false),
            workers: Some(3),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.noise.seed, 99);
        assert!(!config.terrain.use_erosion);
        assert_eq!(config.streaming.worker_threads, 3);
        // Non-overridden fields retain defaults
        assert_eq!(config.mesh.chunk_size_index, 0);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "ridge",
            "--chunk-size-index",
            "4",
            "--falloff",
            "true",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.chunk_size_index, Some(4));
        assert_eq!(args.falloff, Some(true));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.seed, None);
    }
}
