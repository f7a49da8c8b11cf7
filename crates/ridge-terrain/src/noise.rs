//! Seeded multi-octave Perlin noise sampler.
//!
//! The world seed only drives the per-octave sample offsets; the underlying
//! gradient noise uses a fixed permutation table. Two chunks sampling
//! overlapping world coordinates (via `sample_center`) therefore evaluate
//! the same function and tile without visible discontinuities.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ridge_math::inverse_lerp;

use crate::error::SettingsError;
use crate::grid::HeightGrid;
use crate::settings::{NoiseSettings, NormalizeMode};

/// Permutation seed of the gradient noise lattice. Fixed so offsets alone
/// decide what a given seed looks like.
const PERMUTATION_SEED: u32 = 0;

/// Range of the per-octave random offsets.
const OFFSET_RANGE: std::ops::Range<i32> = -100_000..100_000;

/// Deterministic fractal noise field.
pub struct NoiseField {
    perlin: Perlin,
}

impl NoiseField {
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(PERMUTATION_SEED),
        }
    }

    /// Classic gradient noise at `(x, y)`, in `[0, 1]`.
    #[inline]
    pub fn gradient_noise(&self, x: f32, y: f32) -> f32 {
        let v = self.perlin.get([x as f64, y as f64]) as f32;
        (v * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    /// Sample a `grid_size × grid_size` fBm grid centred on `sample_center`.
    ///
    /// Identical inputs produce bit-identical output.
    pub fn sample(
        &self,
        grid_size: usize,
        settings: &NoiseSettings,
        sample_center: Vec2,
    ) -> Result<HeightGrid, SettingsError> {
        if grid_size == 0 {
            return Err(SettingsError::EmptyGrid);
        }
        settings.validate()?;
        let settings = settings.sanitized();

        let offsets = octave_offsets(&settings, sample_center);
        let half = grid_size as f32 / 2.0;

        let mut min_noise = f32::MAX;
        let mut max_noise = f32::MIN;

        let mut grid = HeightGrid::from_fn(grid_size, |x, y| {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut noise_height = 0.0;

            for offset in &offsets {
                let sample_x = (x as f32 - half + offset.x) / settings.scale * frequency;
                let sample_y = (y as f32 - half + offset.y) / settings.scale * frequency;
                let value = self.gradient_noise(sample_x, sample_y) * 2.0 - 1.0;
                noise_height += value * amplitude;

                amplitude *= settings.persistence;
                frequency *= settings.lacunarity;
            }

            min_noise = min_noise.min(noise_height);
            max_noise = max_noise.max(noise_height);
            noise_height
        });

        match settings.normalize_mode {
            NormalizeMode::Local => {
                for v in grid.values_mut() {
                    *v = inverse_lerp(min_noise, max_noise, *v);
                }
            }
            NormalizeMode::Global => {
                // Only the lower bound is clamped; values above 1 pass through.
                let max_possible = max_possible_height(&settings);
                for v in grid.values_mut() {
                    *v = ((*v + 1.0) / max_possible).max(0.0);
                }
                tracing::trace!(max_possible, max_noise, "global noise normalization");
            }
        }

        Ok(grid)
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-octave sample offsets for `settings` around `sample_center`.
///
/// Draws two values per octave from a seeded stream, strictly in octave
/// order (x then y), so the sequence is reproducible for a seed.
pub fn octave_offsets(settings: &NoiseSettings, sample_center: Vec2) -> Vec<Vec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed as i64 as u64);
    (0..settings.octaves.max(1))
        .map(|_| {
            let rx = rng.random_range(OFFSET_RANGE) as f32;
            let ry = rng.random_range(OFFSET_RANGE) as f32;
            Vec2::new(
                rx + settings.offset.x + sample_center.x,
                -ry - settings.offset.y - sample_center.y,
            )
        })
        .collect()
}

/// Sum of all octave amplitudes (the largest possible fBm magnitude).
pub fn max_possible_height(settings: &NoiseSettings) -> f32 {
    let mut sum = 0.0;
    let mut amplitude = 1.0;
    for _ in 0..settings.octaves.max(1) {
        sum += amplitude;
        amplitude *= settings.persistence;
    }
    sum
}
