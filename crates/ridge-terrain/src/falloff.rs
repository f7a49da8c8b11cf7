//! Square falloff map for island shaping.

use crate::grid::HeightGrid;

const FALLOFF_STEEPNESS: f32 = 3.0;
const FALLOFF_SHIFT: f32 = 2.2;

/// Falloff values in `[0, 1]`: near 0 in the middle, rising towards 1 at the
/// edges of a `size × size` grid.
pub fn generate_falloff_map(size: usize) -> HeightGrid {
    HeightGrid::from_fn(size, |x, y| {
        let u = x as f32 / size as f32 * 2.0 - 1.0;
        let v = y as f32 / size as f32 * 2.0 - 1.0;
        evaluate(u.abs().max(v.abs()))
    })
}

fn evaluate(value: f32) -> f32 {
    let a = value.powf(FALLOFF_STEEPNESS);
    let b = (FALLOFF_SHIFT - FALLOFF_SHIFT * value).powf(FALLOFF_STEEPNESS);
    a / (a + b)
}

/// Subtract `falloff` from `grid`, clamping each result to `[0, 1]`.
///
/// Both grids must share the same size; extra cells of either are ignored.
pub fn apply_falloff(grid: &mut HeightGrid, falloff: &HeightGrid) {
    for (v, f) in grid.values_mut().iter_mut().zip(falloff.values()) {
        *v = (*v - f).clamp(0.0, 1.0);
    }
}
