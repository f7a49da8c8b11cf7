//! Grayscale image encodings of height data.

use image::{GrayImage, Luma};
use ridge_math::inverse_lerp;

use crate::grid::HeightGrid;
use crate::height_field::HeightField;

/// Encode a height field as an 8-bit grayscale image: black at the field's
/// minimum, white at its maximum. Pixel `(x, y)` is cell `(x, y)`.
pub fn height_texture(field: &HeightField) -> GrayImage {
    let (lo, hi) = (field.min_value(), field.max_value());
    grid_to_image(field.grid(), |v| inverse_lerp(lo, hi, v))
}

/// Encode a falloff (or any unit-range) grid, clamping values to `[0, 1]`.
pub fn falloff_texture(grid: &HeightGrid) -> GrayImage {
    grid_to_image(grid, |v| v.clamp(0.0, 1.0))
}

fn grid_to_image(grid: &HeightGrid, to_unit: impl Fn(f32) -> f32) -> GrayImage {
    let size = grid.size() as u32;
    GrayImage::from_fn(size, size, |x, y| {
        let t = to_unit(grid.get(x as usize, y as usize));
        Luma([(t * 255.0).round() as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_texture_spans_black_to_white() {
        let grid = HeightGrid::from_values(2, vec![-1.0, 0.0, 1.0, 3.0]).unwrap();
        let image = height_texture(&HeightField::from_grid(grid));
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0).0, [0]);
        assert_eq!(image.get_pixel(1, 0).0, [64]);
        assert_eq!(image.get_pixel(0, 1).0, [128]);
        assert_eq!(image.get_pixel(1, 1).0, [255]);
    }

    #[test]
    fn test_falloff_texture_clamps() {
        let grid = HeightGrid::from_values(2, vec![-0.5, 0.5, 1.0, 2.0]).unwrap();
        let image = falloff_texture(&grid);
        assert_eq!(image.get_pixel(0, 0).0, [0]);
        assert_eq!(image.get_pixel(1, 0).0, [128]);
        assert_eq!(image.get_pixel(1, 1).0, [255]);
    }
}
