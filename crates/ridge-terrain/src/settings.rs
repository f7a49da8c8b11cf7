//! Generation settings for noise, height mapping, and erosion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::height_curve::HeightCurve;

/// How raw fBm sums are mapped into height values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Remap each grid's own `[min, max]` to `[0, 1]`. Chunks do not tile.
    #[default]
    Local,
    /// Divide by the maximum possible amplitude sum. Chunks tile seamlessly.
    Global,
}

/// Configuration for multi-octave noise sampling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// World seed; drives the per-octave sample offsets.
    pub seed: i32,
    /// Size of the broadest features in grid cells.
    pub scale: f32,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f32,
    /// Constant offset added to every sample position.
    pub offset: Vec2,
    pub normalize_mode: NormalizeMode,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octaves: 6,
            persistence: 0.6,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
            normalize_mode: NormalizeMode::Global,
        }
    }
}

impl NoiseSettings {
    /// Reject settings that cannot be clamped into something meaningful.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(SettingsError::NonPositiveScale(self.scale));
        }
        Ok(())
    }

    /// Copy with every field clamped into its legal range.
    pub fn sanitized(&self) -> Self {
        Self {
            scale: self.scale.max(0.1),
            octaves: self.octaves.max(1),
            persistence: self.persistence.clamp(0.0, 1.0),
            lacunarity: self.lacunarity.max(1.0),
            ..self.clone()
        }
    }
}

/// Everything needed to turn noise into a chunk height field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightMapSettings {
    pub noise: NoiseSettings,
    /// World-space height of a curve output of 1.
    pub height_multiplier: f32,
    /// Remap applied to height values before the multiplier.
    pub height_curve: HeightCurve,
    /// Run the droplet erosion pass on each chunk.
    pub use_erosion: bool,
    /// Subtract a square falloff map (island shaping, single-chunk previews).
    pub use_falloff: bool,
}

impl Default for HeightMapSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings::default(),
            height_multiplier: 30.0,
            height_curve: HeightCurve::linear(),
            use_erosion: true,
            use_falloff: false,
        }
    }
}

impl HeightMapSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.noise.validate()?;
        self.height_curve.validate()
    }

    /// World height of the lowest possible normalized value.
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    /// World height of the highest possible normalized value.
    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(1.0)
    }
}

/// Parameters for the droplet erosion simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionSettings {
    /// Seed for droplet spawn positions and stuck-droplet directions.
    pub seed: u64,
    /// Number of droplets simulated per grid.
    pub num_iterations: u32,
    /// Radius of the erosion brush in cells. Also the grid border margin.
    pub brush_radius: u32,
    /// Maximum steps a droplet takes before it is discarded.
    pub max_lifetime: u32,
    /// Multiplier on the amount of sediment a droplet can carry.
    pub sediment_capacity_factor: f32,
    /// Floor on carrying capacity so droplets still erode on flat ground.
    pub min_sediment_capacity: f32,
    /// Fraction of surplus sediment dropped per step.
    pub deposit_speed: f32,
    /// Fraction of free capacity filled by erosion per step.
    pub erode_speed: f32,
    /// Fraction of water lost per step.
    pub evaporate_speed: f32,
    pub gravity: f32,
    pub start_speed: f32,
    pub start_water: f32,
    /// How much of its previous direction a droplet keeps (0..=1).
    pub inertia: f32,
}

impl Default for ErosionSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            num_iterations: 50_000,
            brush_radius: 3,
            max_lifetime: 30,
            sediment_capacity_factor: 3.0,
            min_sediment_capacity: 0.01,
            deposit_speed: 0.3,
            erode_speed: 0.3,
            evaporate_speed: 0.01,
            gravity: 4.0,
            start_speed: 1.0,
            start_water: 1.0,
            inertia: 0.3,
        }
    }
}

impl ErosionSettings {
    /// Check rates and the brush against a grid of `grid_size` cells per edge.
    pub fn validate(&self, grid_size: usize) -> Result<(), SettingsError> {
        if grid_size == 0 {
            return Err(SettingsError::EmptyGrid);
        }
        if self.brush_radius < 1 || 2 * self.brush_radius as usize >= grid_size {
            return Err(SettingsError::BrushRadius {
                radius: self.brush_radius,
                size: grid_size,
            });
        }
        for (name, value) in [
            ("deposit_speed", self.deposit_speed),
            ("erode_speed", self.erode_speed),
            ("evaporate_speed", self.evaporate_speed),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(SettingsError::RateOutOfRange { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.inertia) {
            return Err(SettingsError::Inertia(self.inertia));
        }
        Ok(())
    }
}
