//! Structured logging and tracing for the Ridge terrain pipeline.
//!
//! Console output with uptime timestamps and module paths, plus JSON file
//! logging for post-mortem analysis of generation runs. `RUST_LOG` takes
//! precedence over the config's `debug.log_level`.

use std::path::Path;

use ridge_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config name a level.
///
/// Per-job tracing in the generation crates is chatty, so it stays at `info`
/// unless asked for explicitly.
pub const DEFAULT_FILTER: &str = "info";

/// File name of the JSON log inside the log directory.
pub const LOG_FILE_NAME: &str = "ridge.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - Directory for the JSON log file.
/// * `debug_build` - Whether this is a debug build (enables file logging).
/// * `config` - Supplies `debug.log_level`, and `debug.log_to_file` to force
///   file logging in release builds.
///
/// ```no_run
/// use ridge_config::Config;
/// use ridge_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), cfg!(debug_assertions), Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_directive(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    // Worker threads are named, so thread names say which job logged.
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let log_to_file = debug_build || config.is_some_and(|config| config.debug.log_to_file);
    if log_to_file
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter string derived from the config, falling back to [`DEFAULT_FILTER`].
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// An `EnvFilter` with [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_filter_from_config() {
        let mut config = Config::default();
        assert_eq!(filter_directive(Some(&config)), "info");

        config.debug.log_level = "debug,ridge_stream=trace".to_string();
        assert_eq!(filter_directive(Some(&config)), "debug,ridge_stream=trace");
    }

    #[test]
    fn test_blank_level_falls_back_to_default() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,ridge_stream=trace",
            "warn,ridge_terrain=debug,ridge_mesh=trace",
            "error",
        ];

        for filter_str in &valid_filters {
            let result = EnvFilter::try_from(*filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {filter_str}");
        }
    }

    #[test]
    fn test_subsystem_filter() {
        let filter = EnvFilter::new("info,ridge_stream=debug");
        let filter_str = format!("{filter}");
        assert!(filter_str.contains("ridge_stream=debug"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_file_logger_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");
        std::fs::create_dir_all(&log_dir).unwrap();

        let log_file_path = log_dir.join(LOG_FILE_NAME);
        std::fs::File::create(&log_file_path).unwrap();
        assert!(log_file_path.exists());
        assert_eq!(log_file_path.file_name().unwrap(), "ridge.log");
    }
}
