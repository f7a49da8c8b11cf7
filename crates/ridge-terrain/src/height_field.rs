//! Frozen height grid with cached value range.

use ridge_math::inverse_lerp;

use crate::grid::HeightGrid;

/// A finished height grid plus its `[min, max]` value range.
///
/// The range is computed once at construction; the field is immutable
/// afterwards and is shared read-only with mesh jobs.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    grid: HeightGrid,
    min_value: f32,
    max_value: f32,
}

impl HeightField {
    /// Freeze `grid`, scanning it for the value range.
    pub fn from_grid(grid: HeightGrid) -> Self {
        let (min_value, max_value) = grid.min_max().unwrap_or((0.0, 0.0));
        Self {
            grid,
            min_value,
            max_value,
        }
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    pub fn into_grid(self) -> HeightGrid {
        self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.grid.get(x, y)
    }

    pub fn values(&self) -> &[f32] {
        self.grid.values()
    }

    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Value at `(x, y)` remapped from `[min, max]` to `[0, 1]`.
    pub fn normalized(&self, x: usize, y: usize) -> f32 {
        inverse_lerp(self.min_value, self.max_value, self.get(x, y))
    }

    /// All values remapped to `[0, 1]`, row-major.
    pub fn normalized_values(&self) -> Vec<f32> {
        self.values()
            .iter()
            .map(|&v| inverse_lerp(self.min_value, self.max_value, v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_computed_on_construction() {
        let grid = HeightGrid::from_values(2, vec![0.2, 0.8, -0.4, 0.5]).unwrap();
        let field = HeightField::from_grid(grid);
        assert_eq!(field.min_value(), -0.4);
        assert_eq!(field.max_value(), 0.8);
    }

    #[test]
    fn test_normalized_values() {
        let grid = HeightGrid::from_values(2, vec![2.0, 4.0, 3.0, 4.0]).unwrap();
        let field = HeightField::from_grid(grid);
        assert_eq!(field.normalized(0, 0), 0.0);
        assert_eq!(field.normalized(1, 0), 1.0);
        assert_eq!(field.normalized_values(), vec![0.0, 1.0, 0.5, 1.0]);
    }

    #[test]
    fn test_flat_field_normalizes_to_zero() {
        let field = HeightField::from_grid(HeightGrid::filled(3, 7.0));
        assert_eq!(field.min_value(), 7.0);
        assert_eq!(field.max_value(), 7.0);
        assert!(field.normalized_values().iter().all(|&v| v == 0.0));
    }
}
