//! Particle-based hydraulic erosion.
//!
//! Simulates independent water droplets rolling downhill over a height grid.
//! Each droplet picks up sediment where it speeds up and drops it where it
//! slows down or climbs, carving channels and filling basins. Droplets are
//! processed strictly one after another: later droplets see the terrain left
//! by earlier ones, so a seeded RNG reproduces the exact same result.

use glam::Vec2;
use rand::Rng;

use crate::error::SettingsError;
use crate::grid::HeightGrid;
use crate::settings::ErosionSettings;

/// Circular weighted footprint used to spread erosion around a droplet.
#[derive(Clone, Debug, PartialEq)]
pub struct ErosionBrush {
    radius: u32,
    offsets: Vec<(i32, i32)>,
    weights: Vec<f32>,
}

impl ErosionBrush {
    /// Build the brush for `radius`: every offset with `dx² + dy² < radius²`,
    /// weighted `1 - distance / radius` and normalized to sum to 1.
    pub fn new(radius: u32) -> Self {
        let r = radius as i32;
        let mut offsets = Vec::new();
        let mut weights = Vec::new();
        let mut weight_sum = 0.0;

        for dy in -r..=r {
            for dx in -r..=r {
                let sqr_dst = dx * dx + dy * dy;
                if sqr_dst < r * r {
                    let weight = 1.0 - (sqr_dst as f32).sqrt() / radius as f32;
                    offsets.push((dx, dy));
                    weights.push(weight);
                    weight_sum += weight;
                }
            }
        }
        for w in &mut weights {
            *w /= weight_sum;
        }

        Self {
            radius,
            offsets,
            weights,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// `(offset, weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), f32)> + '_ {
        self.offsets.iter().copied().zip(self.weights.iter().copied())
    }

    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// Totals gathered during one [`ErosionSimulator::erode`] call.
///
/// Mass balance: the grid total changes by `deposited - eroded`, which equals
/// `-sediment_lost` up to rounding.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ErosionReport {
    /// Droplets simulated.
    pub droplets: u32,
    /// Droplet steps taken across all droplets.
    pub steps: u64,
    /// Height removed from the grid.
    pub eroded: f64,
    /// Height added to the grid.
    pub deposited: f64,
    /// Sediment still carried by droplets when they terminated.
    pub sediment_lost: f64,
}

/// Droplet erosion over a height grid with a border margin.
pub struct ErosionSimulator {
    settings: ErosionSettings,
    brush: ErosionBrush,
}

impl ErosionSimulator {
    pub fn new(settings: &ErosionSettings) -> Self {
        Self {
            brush: ErosionBrush::new(settings.brush_radius),
            settings: settings.clone(),
        }
    }

    pub fn brush(&self) -> &ErosionBrush {
        &self.brush
    }

    pub fn settings(&self) -> &ErosionSettings {
        &self.settings
    }

    /// Erode `grid` in place.
    ///
    /// `inner_size` is the edge length of the region droplets spawn in; the
    /// grid must carry a `brush_radius` margin around it. Droplets that would
    /// step closer than the margin to the grid edge stop early, so neither
    /// the bilinear corners nor the brush ever leave the grid.
    pub fn erode<R: Rng>(
        &self,
        grid: &mut HeightGrid,
        inner_size: usize,
        rng: &mut R,
    ) -> Result<ErosionReport, SettingsError> {
        let size = grid.size();
        let radius = self.settings.brush_radius;
        self.settings.validate(size)?;
        if inner_size == 0 || inner_size + 2 * radius as usize > size {
            return Err(SettingsError::InnerSize {
                inner: inner_size,
                radius,
                size,
            });
        }

        let s = &self.settings;
        let border = radius as usize;
        // Valid droplet positions: [lo, hi) on both axes.
        let lo = radius as f32;
        let hi = (size - border - 1) as f32;

        let mut report = ErosionReport::default();

        for _ in 0..s.num_iterations {
            let spawn_x = rng.random_range(border..inner_size + border);
            let spawn_y = rng.random_range(border..inner_size + border);
            let mut pos = Vec2::new(spawn_x as f32, spawn_y as f32);
            let mut dir = Vec2::ZERO;
            let mut speed = s.start_speed;
            let mut water = s.start_water;
            let mut sediment = 0.0_f32;

            report.droplets += 1;

            for _ in 0..s.max_lifetime {
                let node_x = pos.x as usize;
                let node_y = pos.y as usize;
                let cell_offset = pos - Vec2::new(node_x as f32, node_y as f32);

                let (height, gradient) = height_and_gradient(grid, pos);

                dir = dir * s.inertia - gradient * (1.0 - s.inertia);
                let len = dir.length();
                if len > f32::EPSILON && len.is_finite() {
                    dir /= len;
                } else {
                    let angle = rng.random::<f32>() * std::f32::consts::TAU;
                    dir = Vec2::new(angle.cos(), angle.sin());
                }

                let new_pos = pos + dir;
                if new_pos.x < lo || new_pos.x >= hi || new_pos.y < lo || new_pos.y >= hi {
                    break;
                }
                report.steps += 1;

                let (new_height, _) = height_and_gradient(grid, new_pos);
                let delta_height = new_height - height;

                let capacity = (-delta_height * speed * water * s.sediment_capacity_factor)
                    .max(s.min_sediment_capacity);

                if sediment > capacity || delta_height > 0.0 {
                    let amount = if delta_height > 0.0 {
                        delta_height.min(sediment)
                    } else {
                        (sediment - capacity) * s.deposit_speed
                    };
                    sediment -= amount;
                    deposit(grid, node_x, node_y, cell_offset, amount);
                    report.deposited += amount as f64;
                } else {
                    let amount = ((capacity - sediment) * s.erode_speed).min(-delta_height);
                    for ((dx, dy), weight) in self.brush.iter() {
                        let x = (node_x as i32 + dx) as usize;
                        let y = (node_y as i32 + dy) as usize;
                        let idx = grid.index(x, y);
                        let cell = &mut grid.values_mut()[idx];
                        let delta = (amount * weight).min(cell.max(0.0));
                        *cell -= delta;
                        sediment += delta;
                        report.eroded += delta as f64;
                    }
                }

                speed = (speed * speed + delta_height * s.gravity).max(0.0).sqrt();
                water *= 1.0 - s.evaporate_speed;
                pos = new_pos;

                if water <= f32::EPSILON {
                    break;
                }
            }

            report.sediment_lost += sediment as f64;
        }

        tracing::trace!(
            droplets = report.droplets,
            steps = report.steps,
            eroded = report.eroded,
            deposited = report.deposited,
            "erosion pass finished"
        );
        Ok(report)
    }
}

/// Bilinear height and gradient at a continuous position.
///
/// `pos` must satisfy `0 <= pos < size - 1` on both axes.
fn height_and_gradient(grid: &HeightGrid, pos: Vec2) -> (f32, Vec2) {
    let x = pos.x as usize;
    let y = pos.y as usize;
    let u = pos.x - x as f32;
    let v = pos.y - y as f32;

    let nw = grid.get(x, y);
    let ne = grid.get(x + 1, y);
    let sw = grid.get(x, y + 1);
    let se = grid.get(x + 1, y + 1);

    let gradient = Vec2::new(
        (ne - nw) * (1.0 - v) + (se - sw) * v,
        (sw - nw) * (1.0 - u) + (se - ne) * u,
    );
    let height = nw * (1.0 - u) * (1.0 - v) + ne * u * (1.0 - v) + sw * (1.0 - u) * v + se * u * v;
    (height, gradient)
}

/// Spread `amount` over the four cells around `(x, y)` by bilinear weight.
fn deposit(grid: &mut HeightGrid, x: usize, y: usize, offset: Vec2, amount: f32) {
    let (u, v) = (offset.x, offset.y);
    let corners = [
        (x, y, (1.0 - u) * (1.0 - v)),
        (x + 1, y, u * (1.0 - v)),
        (x, y + 1, (1.0 - u) * v),
        (x + 1, y + 1, u * v),
    ];
    for (cx, cy, weight) in corners {
        let idx = grid.index(cx, cy);
        grid.values_mut()[idx] += amount * weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn slope_grid(size: usize) -> HeightGrid {
        // A tilted, bumpy surface so droplets actually move and carve.
        HeightGrid::from_fn(size, |x, y| {
            let (fx, fy) = (x as f32, y as f32);
            1.0 + 0.02 * fx + 0.01 * fy + 0.05 * (fx * 0.7).sin() * (fy * 0.45).cos()
        })
    }

    #[test]
    fn test_brush_weights_sum_to_one() {
        for radius in 1..=8 {
            let brush = ErosionBrush::new(radius);
            assert!(!brush.is_empty());
            assert!(
                (brush.weight_sum() - 1.0).abs() < 1e-5,
                "radius {radius}: sum {}",
                brush.weight_sum()
            );
        }
    }

    #[test]
    fn test_brush_is_a_disc() {
        let brush = ErosionBrush::new(3);
        assert!(
            brush
                .iter()
                .all(|((dx, dy), w)| dx * dx + dy * dy < 9 && w > 0.0)
        );
        // Radius 1 is just the centre cell.
        let single = ErosionBrush::new(1);
        assert_eq!(single.len(), 1);
        assert_eq!(single.iter().next(), Some(((0, 0), 1.0)));
    }

    #[test]
    fn test_flat_grid_is_unchanged() {
        let settings = ErosionSettings {
            num_iterations: 200,
            ..Default::default()
        };
        let sim = ErosionSimulator::new(&settings);
        let mut grid = HeightGrid::filled(32, 0.5);
        let before = grid.total();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let report = sim.erode(&mut grid, 26, &mut rng).unwrap();
        assert_eq!(report.droplets, 200);
        assert!((grid.total() - before).abs() < 1e-6);
    }

    #[test]
    fn test_mass_is_conserved_up_to_carried_sediment() {
        let settings = ErosionSettings {
            num_iterations: 500,
            ..Default::default()
        };
        let sim = ErosionSimulator::new(&settings);
        let mut grid = slope_grid(64);
        let before = grid.total();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        let report = sim.erode(&mut grid, 58, &mut rng).unwrap();

        assert!(report.eroded > 0.0, "droplets should erode a slope");
        let change = grid.total() - before;
        let balance = change + report.sediment_lost;
        assert!(
            balance.abs() < 1e-2,
            "height change {change} not explained by lost sediment {}",
            report.sediment_lost
        );
        assert!((change - (report.deposited - report.eroded)).abs() < 1e-2);
    }

    #[test]
    fn test_seeded_erosion_is_deterministic() {
        let settings = ErosionSettings {
            num_iterations: 500,
            ..Default::default()
        };
        let sim = ErosionSimulator::new(&settings);
        let mut a = slope_grid(40);
        let mut b = slope_grid(40);
        sim.erode(&mut a, 34, &mut ChaCha8Rng::seed_from_u64(77))
            .unwrap();
        sim.erode(&mut b, 34, &mut ChaCha8Rng::seed_from_u64(77))
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, slope_grid(40));
    }

    #[test]
    fn test_margin_cells_are_never_touched() {
        let settings = ErosionSettings {
            num_iterations: 3_000,
            brush_radius: 3,
            ..Default::default()
        };
        let sim = ErosionSimulator::new(&settings);
        let original = slope_grid(48);
        let mut grid = original.clone();
        sim.erode(&mut grid, 42, &mut ChaCha8Rng::seed_from_u64(5))
            .unwrap();
        // The outermost ring is beyond both the brush and bilinear reach.
        for i in 0..48 {
            for (x, y) in [(0, i), (47, i), (i, 0), (i, 47)] {
                assert_eq!(grid.get(x, y), original.get(x, y), "edge cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_rejects_oversized_inner_region() {
        let sim = ErosionSimulator::new(&ErosionSettings::default());
        let mut grid = HeightGrid::new(20);
        let err = sim
            .erode(&mut grid, 16, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert_eq!(
            err,
            SettingsError::InnerSize {
                inner: 16,
                radius: 3,
                size: 20
            }
        );
    }
}
