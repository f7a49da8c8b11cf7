//! Square row-major grid of height samples.

use crate::error::SettingsError;

/// A `size × size` grid of `f32` height samples stored row-major
/// (`index = y * size + x`).
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    size: usize,
    values: Vec<f32>,
}

impl HeightGrid {
    /// Create a zero-filled grid.
    pub fn new(size: usize) -> Self {
        Self::filled(size, 0.0)
    }

    /// Create a grid with every cell set to `value`.
    pub fn filled(size: usize, value: f32) -> Self {
        Self {
            size,
            values: vec![value; size * size],
        }
    }

    /// Wrap an existing row-major buffer.
    pub fn from_values(size: usize, values: Vec<f32>) -> Result<Self, SettingsError> {
        if values.len() != size * size {
            return Err(SettingsError::GridLength {
                expected: size * size,
                actual: values.len(),
            });
        }
        Ok(Self { size, values })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut values = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                values.push(f(x, y));
            }
        }
        Self { size, values }
    }

    /// Cells per edge.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    /// # Panics
    ///
    /// Panics if `x` or `y` is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let idx = self.index(x, y);
        self.values[idx] = value;
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Copy of the grid with `margin` cells removed from every edge.
    ///
    /// Cell `(x, y)` of the result is cell `(x + margin, y + margin)` of `self`.
    pub fn crop(&self, margin: usize) -> Self {
        if margin == 0 {
            return self.clone();
        }
        let size = self.size.saturating_sub(2 * margin);
        Self::from_fn(size, |x, y| self.get(x + margin, y + margin))
    }

    /// `(min, max)` over all cells, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let first = *self.values.first()?;
        Some(
            self.values
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Sum of all cells accumulated in `f64`.
    pub fn total(&self) -> f64 {
        self.values.iter().map(|&v| v as f64).sum()
    }
}
