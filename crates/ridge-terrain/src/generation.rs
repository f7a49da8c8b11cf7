//! Chunk height field pipeline: noise, falloff, erosion, crop.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::erosion::ErosionSimulator;
use crate::error::SettingsError;
use crate::falloff::{apply_falloff, generate_falloff_map};
use crate::height_field::HeightField;
use crate::noise::NoiseField;
use crate::settings::{ErosionSettings, HeightMapSettings};

/// Derive a per-chunk RNG seed from a base seed and the chunk's sample center.
///
/// Uses SipHash (via std's `DefaultHasher`) so neighbouring chunks get
/// uncorrelated sequences (erosion droplets, vegetation) while each chunk
/// stays reproducible.
pub fn derive_chunk_seed(seed: u64, sample_center: Vec2) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    sample_center.x.to_bits().hash(&mut hasher);
    sample_center.y.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// Generate the height field for one chunk.
///
/// Noise is sampled over `num_verts_per_line + 2 * brush_radius` cells so
/// droplets have a margin to run off into; the margin is cropped after
/// erosion, leaving a `num_verts_per_line²` field aligned with its
/// neighbours. Values stay normalized; the height curve and multiplier are
/// applied when meshing.
pub fn generate_height_field(
    num_verts_per_line: usize,
    settings: &HeightMapSettings,
    erosion: &ErosionSettings,
    sample_center: Vec2,
) -> Result<HeightField, SettingsError> {
    if num_verts_per_line == 0 {
        return Err(SettingsError::EmptyGrid);
    }
    settings.validate()?;

    let margin = if settings.use_erosion {
        erosion.brush_radius as usize
    } else {
        0
    };
    let size = num_verts_per_line + 2 * margin;
    if settings.use_erosion {
        erosion.validate(size)?;
    }

    let mut grid = NoiseField::new().sample(size, &settings.noise, sample_center)?;

    if settings.use_falloff {
        apply_falloff(&mut grid, &generate_falloff_map(size));
    }

    if settings.use_erosion {
        let mut rng = ChaCha8Rng::seed_from_u64(derive_chunk_seed(erosion.seed, sample_center));
        let report = ErosionSimulator::new(erosion).erode(&mut grid, num_verts_per_line, &mut rng)?;
        tracing::trace!(
            ?sample_center,
            droplets = report.droplets,
            sediment_lost = report.sediment_lost,
            "eroded chunk height field"
        );
        grid = grid.crop(margin);
    }

    Ok(HeightField::from_grid(grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{NoiseSettings, NormalizeMode};

    fn reference_settings(use_erosion: bool) -> HeightMapSettings {
        HeightMapSettings {
            noise: NoiseSettings {
                seed: 42,
                scale: 50.0,
                octaves: 6,
                persistence: 0.5,
                lacunarity: 2.0,
                offset: Vec2::ZERO,
                normalize_mode: NormalizeMode::Local,
            },
            use_erosion,
            ..Default::default()
        }
    }

    /// Without erosion the field is the normalized noise grid itself.
    #[test]
    fn test_uneroded_field_spans_unit_range() {
        let field = generate_height_field(
            53,
            &reference_settings(false),
            &ErosionSettings::default(),
            Vec2::ZERO,
        )
        .unwrap();
        assert_eq!(field.size(), 53);
        assert_eq!(field.min_value(), 0.0);
        assert_eq!(field.max_value(), 1.0);
    }

    #[test]
    fn test_eroded_field_is_cropped_and_deterministic() {
        let erosion = ErosionSettings {
            num_iterations: 2_000,
            seed: 3,
            ..Default::default()
        };
        let settings = reference_settings(true);
        let a = generate_height_field(53, &settings, &erosion, Vec2::new(50.0, 0.0)).unwrap();
        let b = generate_height_field(53, &settings, &erosion, Vec2::new(50.0, 0.0)).unwrap();
        assert_eq!(a.size(), 53);
        assert_eq!(a, b);

        let plain =
            generate_height_field(53, &reference_settings(false), &erosion, Vec2::new(50.0, 0.0))
                .unwrap();
        assert_ne!(a.values(), plain.values());
    }

    #[test]
    fn test_chunk_seed_depends_on_center() {
        let a = derive_chunk_seed(1, Vec2::new(0.0, 0.0));
        let b = derive_chunk_seed(1, Vec2::new(50.0, 0.0));
        let c = derive_chunk_seed(2, Vec2::new(0.0, 0.0));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, derive_chunk_seed(1, Vec2::ZERO));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = reference_settings(true);
        settings.noise.scale = -1.0;
        assert!(
            generate_height_field(53, &settings, &ErosionSettings::default(), Vec2::ZERO).is_err()
        );
        assert_eq!(
            generate_height_field(
                0,
                &reference_settings(false),
                &ErosionSettings::default(),
                Vec2::ZERO
            ),
            Err(SettingsError::EmptyGrid)
        );
    }
}
