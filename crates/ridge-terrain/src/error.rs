//! Settings validation errors.

use thiserror::Error;

/// Invalid generation settings, rejected before any work is scheduled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// Noise scale was zero, negative, or not a finite number.
    #[error("noise scale must be positive and finite, got {0}")]
    NonPositiveScale(f32),

    /// A grid with no cells was requested.
    #[error("grid size must be positive")]
    EmptyGrid,

    /// The erosion brush would not fit inside the grid.
    #[error("erosion brush radius {radius} must be in [1, {size}/2) for a {size}x{size} grid")]
    BrushRadius { radius: u32, size: usize },

    /// The erosion inner region plus its border margin exceeds the grid.
    #[error("erosion inner size {inner} plus a {radius}-cell border exceeds grid size {size}")]
    InnerSize {
        inner: usize,
        radius: u32,
        size: usize,
    },

    /// A rate that must lie in `(0, 1]` is outside that range.
    #[error("{name} must be in (0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f32 },

    /// Droplet inertia outside `[0, 1]`.
    #[error("inertia must be in [0, 1], got {0}")]
    Inertia(f32),

    /// A height curve with no keys.
    #[error("height curve needs at least one key")]
    EmptyCurve,

    /// Vegetation placement probability outside `[0, 1]` or not a number.
    #[error("placement_chance must be in [0, 1], got {0}")]
    PlacementChance(f64),

    /// Vegetation with no tree variants to pick from.
    #[error("vegetation needs at least one variant")]
    NoVariants,

    /// Height curve keys out of order or not finite.
    #[error("height curve key {index} is not finite or not sorted by time")]
    InvalidCurveKey { index: usize },

    /// A grid was built from a value buffer of the wrong length.
    #[error("expected {expected} grid values, got {actual}")]
    GridLength { expected: usize, actual: usize },
}
