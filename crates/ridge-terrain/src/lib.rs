//! Height field generation: seeded fractal noise, hydraulic droplet erosion,
//! height curves, falloff maps, height textures and vegetation scatter.

mod error;
mod falloff;
mod generation;
mod grid;
mod height_curve;
mod height_field;
mod settings;

pub mod erosion;
pub mod noise;
pub mod texture;
pub mod vegetation;

pub use erosion::{ErosionBrush, ErosionReport, ErosionSimulator};
pub use error::SettingsError;
pub use falloff::{apply_falloff, generate_falloff_map};
pub use generation::{derive_chunk_seed, generate_height_field};
pub use grid::HeightGrid;
pub use height_curve::{CurveKey, HeightCurve};
pub use height_field::HeightField;
pub use noise::NoiseField;
pub use settings::{ErosionSettings, HeightMapSettings, NoiseSettings, NormalizeMode};
pub use vegetation::{VegetationInstance, VegetationScatter, VegetationSettings};
