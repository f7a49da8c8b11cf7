//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use ridge_lod::DetailLevels;
use ridge_mesh::MeshSettings;
use ridge_stream::{RetentionPolicy, StreamSettings};
use ridge_terrain::{ErosionSettings, HeightMapSettings, VegetationSettings};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "ridge";
const CONFIG_FILE: &str = "config.ron";

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Noise, height curve and post-processing switches.
    pub terrain: HeightMapSettings,
    /// Droplet erosion parameters.
    pub erosion: ErosionSettings,
    /// Chunk size and world scale.
    pub mesh: MeshSettings,
    /// Detail level thresholds and the collider level.
    pub detail_levels: DetailLevels,
    /// Chunk streaming settings.
    pub streaming: StreamingConfig,
    /// Vegetation scatter settings.
    pub vegetation: VegetationSettings,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Chunk streaming configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// What to do with chunks the viewer has left behind.
    pub retention: RetentionPolicy,
    /// Generation worker threads (0 = one less than the CPU count).
    pub worker_threads: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to the log directory.
    pub log_to_file: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// Platform config directory for the `ridge` binary.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// Validate and assemble the settings a streaming session runs with.
    pub fn stream_settings(&self) -> Result<StreamSettings, ConfigError> {
        Ok(StreamSettings::new(
            self.terrain.clone(),
            self.erosion.clone(),
            self.mesh.clone(),
            self.detail_levels.clone(),
            self.vegetation.clone(),
            self.streaming.retention,
        )?)
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridge_stream::StreamError;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("num_iterations: 50000"));
        assert!(ron_str.contains("mesh_scale: 2.5"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(mesh: (chunk_size_index: 2), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.mesh.chunk_size_index, 2);
        assert_eq!(config.mesh.mesh_scale, 2.5);
        assert_eq!(config.erosion, ErosionSettings::default());
        assert_eq!(config.detail_levels, DetailLevels::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_retention_parses() {
        let ron_str = "(streaming: (retention: EvictBeyond(distance: 900.0)))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(
            config.streaming.retention,
            RetentionPolicy::EvictBeyond { distance: 900.0 }
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.terrain.noise.seed = 1234;
        config.mesh.chunk_size_index = 3;
        config.streaming.worker_threads = 2;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.erosion.num_iterations = 70_000;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().erosion.num_iterations, 70_000);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_default_config_builds_stream_settings() {
        let settings = Config::default().stream_settings().unwrap();
        assert_eq!(settings.mesh_world_size(), 125.0);
        assert_eq!(settings.chunks_visible_in_view_distance(), 5);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut config = Config::default();
        config.mesh.chunk_size_index = 99;
        assert!(matches!(
            config.stream_settings(),
            Err(ConfigError::Invalid(StreamError::Mesh(_)))
        ));

        let mut config = Config::default();
        config.streaming.retention = RetentionPolicy::EvictBeyond { distance: 100.0 };
        assert!(matches!(
            config.stream_settings(),
            Err(ConfigError::Invalid(StreamError::EvictionDistance { .. }))
        ));
    }
}
