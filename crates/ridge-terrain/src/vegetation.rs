//! Tree placement over a finished height field.
//!
//! A cell gets a tree when a separate "forest" noise field is dense enough,
//! the terrain height lies inside a band, and a seeded coin flip passes.
//! The placement is data only; spawning and grounding meshes is the
//! consumer's job.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::height_field::HeightField;
use crate::noise::NoiseField;
use crate::settings::NoiseSettings;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationSettings {
    /// Scatter vegetation when a chunk's collider is committed.
    pub enabled: bool,
    /// Forest density noise.
    pub noise: NoiseSettings,
    /// Forest noise must exceed this for a tree to be considered.
    pub density_threshold: f32,
    /// Normalized terrain height band `(min, max)`, exclusive.
    pub min_height: f32,
    pub max_height: f32,
    /// Probability that an eligible cell gets a tree.
    pub placement_chance: f64,
    /// Number of distinct tree variants.
    pub variants: u32,
}

impl Default for VegetationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            noise: NoiseSettings {
                scale: 25.0,
                octaves: 4,
                persistence: 0.5,
                ..Default::default()
            },
            density_threshold: 0.5,
            min_height: 0.3,
            max_height: 0.7,
            placement_chance: 0.56,
            variants: 4,
        }
    }
}

impl VegetationSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.noise.validate()?;
        if !(0.0..=1.0).contains(&self.placement_chance) {
            return Err(SettingsError::PlacementChance(self.placement_chance));
        }
        if self.variants == 0 {
            return Err(SettingsError::NoVariants);
        }
        Ok(())
    }
}

/// One placed tree, in height-field cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VegetationInstance {
    pub x: usize,
    pub y: usize,
    /// Normalized terrain height at the cell.
    pub height: f32,
    pub variant: u32,
}

/// Scatters vegetation over height fields.
#[derive(Default)]
pub struct VegetationScatter {
    noise: NoiseField,
}

impl VegetationScatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place trees on the interior cells of `field`.
    ///
    /// The forest noise is sampled at `sample_center` so density is
    /// continuous across chunks.
    pub fn scatter<R: Rng>(
        &self,
        field: &HeightField,
        settings: &VegetationSettings,
        sample_center: Vec2,
        rng: &mut R,
    ) -> Result<Vec<VegetationInstance>, SettingsError> {
        let size = field.size();
        if size < 3 {
            return Ok(Vec::new());
        }
        settings.validate()?;
        let density = self.noise.sample(size, &settings.noise, sample_center)?;
        let chance = settings.placement_chance;

        let mut instances = Vec::new();
        for y in 1..size - 1 {
            for x in 1..size - 1 {
                let height = field.normalized(x, y);
                if density.get(x, y) > settings.density_threshold
                    && height > settings.min_height
                    && height < settings.max_height
                    && rng.random_bool(chance)
                {
                    instances.push(VegetationInstance {
                        x,
                        y,
                        height,
                        variant: tree_variant(x, settings.variants),
                    });
                }
            }
        }
        Ok(instances)
    }
}

/// Variant index from the cell column; larger divisors pick rarer variants.
fn tree_variant(x: usize, variants: u32) -> u32 {
    let variant = if x % 7 == 0 || x % 6 == 0 {
        3
    } else if x % 5 == 0 || x % 4 == 0 {
        2
    } else if x % 3 == 0 || x % 2 == 0 {
        1
    } else {
        0
    };
    variant.min(variants.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::HeightGrid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ramp_field(size: usize) -> HeightField {
        HeightField::from_grid(HeightGrid::from_fn(size, |x, _| x as f32))
    }

    #[test]
    fn test_tree_variant_table() {
        assert_eq!(tree_variant(14, 4), 3);
        assert_eq!(tree_variant(6, 4), 3);
        assert_eq!(tree_variant(10, 4), 2);
        assert_eq!(tree_variant(9, 4), 1);
        assert_eq!(tree_variant(11, 4), 0);
        assert_eq!(tree_variant(7, 2), 1);
    }

    #[test]
    fn test_instances_respect_height_band() {
        let field = ramp_field(40);
        let settings = VegetationSettings {
            density_threshold: -1.0,
            placement_chance: 1.0,
            ..Default::default()
        };
        let trees = VegetationScatter::new()
            .scatter(&field, &settings, Vec2::ZERO, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert!(!trees.is_empty());
        for tree in &trees {
            assert!(tree.height > 0.3 && tree.height < 0.7, "{tree:?}");
            assert!(tree.x >= 1 && tree.x < 39 && tree.y >= 1 && tree.y < 39);
        }
    }

    #[test]
    fn test_zero_chance_places_nothing() {
        let settings = VegetationSettings {
            density_threshold: -1.0,
            placement_chance: 0.0,
            ..Default::default()
        };
        let trees = VegetationScatter::new()
            .scatter(&ramp_field(20), &settings, Vec2::ZERO, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert!(trees.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_placement() {
        assert_eq!(VegetationSettings::default().validate(), Ok(()));

        let nan = VegetationSettings {
            placement_chance: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(nan.validate(), Err(SettingsError::PlacementChance(v)) if v.is_nan()));

        let too_likely = VegetationSettings {
            placement_chance: 1.5,
            ..Default::default()
        };
        assert_eq!(too_likely.validate(), Err(SettingsError::PlacementChance(1.5)));

        let no_variants = VegetationSettings {
            variants: 0,
            ..Default::default()
        };
        assert_eq!(no_variants.validate(), Err(SettingsError::NoVariants));
    }

    #[test]
    fn test_nan_chance_is_an_error_not_a_panic() {
        let settings = VegetationSettings {
            density_threshold: -1.0,
            placement_chance: f64::NAN,
            ..Default::default()
        };
        let result = VegetationScatter::new().scatter(
            &ramp_field(20),
            &settings,
            Vec2::ZERO,
            &mut ChaCha8Rng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(SettingsError::PlacementChance(_))));
    }

    #[test]
    fn test_scatter_is_deterministic() {
        let settings = VegetationSettings::default();
        let field = ramp_field(48);
        let scatter = VegetationScatter::new();
        let a = scatter
            .scatter(&field, &settings, Vec2::new(5.0, 5.0), &mut ChaCha8Rng::seed_from_u64(8))
            .unwrap();
        let b = scatter
            .scatter(&field, &settings, Vec2::new(5.0, 5.0), &mut ChaCha8Rng::seed_from_u64(8))
            .unwrap();
        assert_eq!(a, b);
    }
}
