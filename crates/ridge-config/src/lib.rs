//! Configuration for the Ridge terrain pipeline.
//!
//! All generation, meshing and streaming settings persist to disk as a single
//! RON file. Supports CLI overrides via clap, hot-reload detection, and
//! forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, StreamingConfig, default_config_dir};
pub use error::ConfigError;
