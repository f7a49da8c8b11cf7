//! Distance-based LOD selection with an ordered list of detail levels.

use ridge_mesh::NUM_SUPPORTED_LODS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors in a detail level table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LodError {
    #[error("at least one detail level is required")]
    Empty,

    #[error("detail level {index} threshold {value} must be positive and finite")]
    InvalidThreshold { index: usize, value: f32 },

    #[error("detail level {index} threshold is not above the previous level's")]
    NotAscending { index: usize },

    #[error("detail level {index} uses lod {lod}, max supported is {max}")]
    LodOutOfRange { index: usize, lod: u32, max: u32 },

    #[error("collider lod index {index} is outside the {len} detail levels")]
    ColliderIndex { index: usize, len: usize },
}

/// One level of detail and the distance up to which it is used.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodInfo {
    /// Mesh LOD (0 = full resolution).
    pub lod: u32,
    /// Maximum viewer distance for this level.
    pub visible_distance_threshold: f32,
}

impl LodInfo {
    pub const fn new(lod: u32, visible_distance_threshold: f32) -> Self {
        Self {
            lod,
            visible_distance_threshold,
        }
    }

    pub fn sqr_visible_distance_threshold(&self) -> f32 {
        self.visible_distance_threshold * self.visible_distance_threshold
    }
}

/// Ordered detail levels, finest first.
///
/// The last level's threshold is the maximum view distance: chunks further
/// away are hidden.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailLevels {
    levels: Vec<LodInfo>,
    /// Index of the level whose mesh doubles as the collision mesh.
    collider_lod_index: usize,
}

impl Default for DetailLevels {
    /// Full detail up to 200 units, then LOD 1 and LOD 4 out to 600.
    fn default() -> Self {
        Self {
            levels: vec![
                LodInfo::new(0, 200.0),
                LodInfo::new(1, 400.0),
                LodInfo::new(4, 600.0),
            ],
            collider_lod_index: 0,
        }
    }
}

impl DetailLevels {
    pub fn new(levels: Vec<LodInfo>, collider_lod_index: usize) -> Result<Self, LodError> {
        let levels = Self {
            levels,
            collider_lod_index,
        };
        levels.validate()?;
        Ok(levels)
    }

    /// Check that thresholds are positive and strictly ascending, every LOD is
    /// supported, and the collider index points at a level.
    pub fn validate(&self) -> Result<(), LodError> {
        if self.levels.is_empty() {
            return Err(LodError::Empty);
        }
        let max = NUM_SUPPORTED_LODS - 1;
        for (index, info) in self.levels.iter().enumerate() {
            let value = info.visible_distance_threshold;
            if !value.is_finite() || value <= 0.0 {
                return Err(LodError::InvalidThreshold { index, value });
            }
            if index > 0 && value <= self.levels[index - 1].visible_distance_threshold {
                return Err(LodError::NotAscending { index });
            }
            if info.lod > max {
                return Err(LodError::LodOutOfRange {
                    index,
                    lod: info.lod,
                    max,
                });
            }
        }
        if self.collider_lod_index >= self.levels.len() {
            return Err(LodError::ColliderIndex {
                index: self.collider_lod_index,
                len: self.levels.len(),
            });
        }
        Ok(())
    }

    pub fn levels(&self) -> &[LodInfo] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LodInfo> {
        self.levels.get(index)
    }

    pub fn collider_lod_index(&self) -> usize {
        self.collider_lod_index
    }

    pub fn collider_level(&self) -> Option<&LodInfo> {
        self.levels.get(self.collider_lod_index)
    }

    /// Maximum view distance (last level's threshold).
    pub fn max_view_distance(&self) -> f32 {
        self.levels
            .last()
            .map_or(0.0, |info| info.visible_distance_threshold)
    }

    /// Index of the level to display at `distance`.
    ///
    /// Returns the first level whose threshold is `>= distance`, falling back
    /// to the last level. A distance exactly on a threshold picks the finer
    /// level.
    pub fn select_index(&self, distance: f32) -> usize {
        let mut index = 0;
        for (i, info) in self
            .levels
            .iter()
            .enumerate()
            .take(self.levels.len().saturating_sub(1))
        {
            if distance > info.visible_distance_threshold {
                index = i + 1;
            } else {
                break;
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels() -> DetailLevels {
        DetailLevels::new(
            vec![
                LodInfo::new(0, 100.0),
                LodInfo::new(2, 250.0),
                LodInfo::new(4, 500.0),
            ],
            1,
        )
        .unwrap()
    }

    /// A chunk at distance 0 uses the finest level.
    #[test]
    fn test_zero_distance_selects_first_level() {
        assert_eq!(levels().select_index(0.0), 0);
    }

    /// Distances exactly on a threshold stay on the finer level.
    #[test]
    fn test_threshold_ties_prefer_finer_level() {
        let levels = levels();
        assert_eq!(levels.select_index(100.0), 0);
        assert_eq!(levels.select_index(100.001), 1);
        assert_eq!(levels.select_index(250.0), 1);
        assert_eq!(levels.select_index(250.5), 2);
    }

    /// Beyond every threshold the coarsest level is used.
    #[test]
    fn test_far_distance_falls_back_to_last_level() {
        let levels = levels();
        assert_eq!(levels.select_index(10_000.0), 2);
        assert_eq!(levels.select_index(f32::MAX), 2);
    }

    #[test]
    fn test_selection_is_monotonic() {
        let levels = levels();
        let mut prev = 0;
        for d in [0.0, 50.0, 100.0, 180.0, 260.0, 499.0, 800.0] {
            let index = levels.select_index(d);
            assert!(index >= prev, "index decreased at {d}");
            prev = index;
        }
    }

    #[test]
    fn test_max_view_distance_and_collider() {
        let levels = levels();
        assert_eq!(levels.max_view_distance(), 500.0);
        assert_eq!(levels.collider_level(), Some(&LodInfo::new(2, 250.0)));
        assert_eq!(LodInfo::new(0, 5.0).sqr_visible_distance_threshold(), 25.0);
    }

    #[test]
    fn test_single_level() {
        let levels = DetailLevels::new(vec![LodInfo::new(0, 300.0)], 0).unwrap();
        assert_eq!(levels.select_index(1000.0), 0);
        assert_eq!(levels.max_view_distance(), 300.0);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(DetailLevels::new(vec![], 0), Err(LodError::Empty));
        assert_eq!(
            DetailLevels::new(vec![LodInfo::new(0, 200.0), LodInfo::new(1, 200.0)], 0),
            Err(LodError::NotAscending { index: 1 })
        );
        assert_eq!(
            DetailLevels::new(vec![LodInfo::new(5, 200.0)], 0),
            Err(LodError::LodOutOfRange {
                index: 0,
                lod: 5,
                max: 4
            })
        );
        assert_eq!(
            DetailLevels::new(vec![LodInfo::new(0, -1.0)], 0),
            Err(LodError::InvalidThreshold {
                index: 0,
                value: -1.0
            })
        );
        assert_eq!(
            DetailLevels::new(vec![LodInfo::new(0, 200.0)], 1),
            Err(LodError::ColliderIndex { index: 1, len: 1 })
        );
        assert!(DetailLevels::default().validate().is_ok());
    }
}
