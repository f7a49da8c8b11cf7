//! Height field to triangle mesh, with level-of-detail simplification.
//!
//! The grid is split into three rings plus a core:
//!
//! - row/column `0` and `S-1`: out-of-mesh vertices, only used so normals
//!   along the chunk edge match the neighbouring chunk;
//! - row/column `1` and `S-2`: the mesh edge, always full resolution so two
//!   neighbours at any LODs share identical edge vertices;
//! - row/column `2` and `S-3`: the simplified lattice's outer ring; vertices
//!   between lattice points ("edge connection" vertices) are pulled onto the
//!   line between their lattice neighbours so the full-resolution strip
//!   meets the coarse core without cracks;
//! - the core, sampled every `step` cells.

use glam::{Vec2, Vec3};
use ridge_terrain::{HeightCurve, HeightField, HeightMapSettings};

use crate::error::MeshError;
use crate::mesh_data::MeshData;
use crate::settings::{MeshSettings, NUM_SUPPORTED_LODS};

/// Frozen mapping from normalized height values to world heights.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMapping {
    pub curve: HeightCurve,
    pub multiplier: f32,
}

impl HeightMapping {
    pub fn new(curve: HeightCurve, multiplier: f32) -> Self {
        Self { curve, multiplier }
    }

    pub fn from_settings(settings: &HeightMapSettings) -> Self {
        Self::new(settings.height_curve.clone(), settings.height_multiplier)
    }

    #[inline]
    pub fn height(&self, value: f32) -> f32 {
        self.curve.evaluate(value) * self.multiplier
    }
}

impl Default for HeightMapping {
    fn default() -> Self {
        Self::new(HeightCurve::linear(), 1.0)
    }
}

/// Builds chunk meshes for one set of mesh settings and height mapping.
#[derive(Clone, Debug)]
pub struct MeshBuilder {
    settings: MeshSettings,
    mapping: HeightMapping,
}

/// Vertex stride at a level of detail.
pub(crate) fn lod_step(lod: u32) -> usize {
    if lod == 0 { 1 } else { lod as usize * 2 }
}

/// Chunk-local position and UV of grid cell `(x, y)`.
fn grid_position(n: usize, world_size: f32, x: usize, y: usize) -> (Vec2, Vec2) {
    let top_left = Vec2::new(-1.0, 1.0) * world_size / 2.0;
    // The out-of-mesh ring lands one cell outside [0, 1].
    let percent = Vec2::new(x as f32 - 1.0, y as f32 - 1.0) / (n - 3) as f32;
    (top_left + Vec2::new(percent.x, -percent.y) * world_size, percent)
}

impl MeshBuilder {
    pub fn new(settings: MeshSettings, mapping: HeightMapping) -> Self {
        Self { settings, mapping }
    }

    pub fn settings(&self) -> &MeshSettings {
        &self.settings
    }

    pub fn mapping(&self) -> &HeightMapping {
        &self.mapping
    }

    /// Triangulate `field` at `lod`.
    ///
    /// The field must be `num_verts_per_line` cells per edge. Produces
    /// `(S-2)²` vertices and `2 (S-3)²` triangles at LOD 0.
    pub fn build(&self, field: &HeightField, lod: u32) -> Result<MeshData, MeshError> {
        self.settings.validate()?;
        if lod >= NUM_SUPPORTED_LODS {
            return Err(MeshError::LodOutOfRange {
                lod,
                max: NUM_SUPPORTED_LODS - 1,
            });
        }
        let n = self.settings.num_verts_per_line();
        if field.size() != n {
            return Err(MeshError::GridSize {
                expected: n,
                actual: field.size(),
            });
        }

        let step = lod_step(lod);
        let world_size = self.settings.mesh_world_size();

        let is_out_of_mesh = |x: usize, y: usize| x == 0 || y == 0 || x == n - 1 || y == n - 1;
        let is_skipped = |x: usize, y: usize| {
            x > 2 && x < n - 3 && y > 2 && y < n - 3 && ((x - 2) % step != 0 || (y - 2) % step != 0)
        };

        // Signed index of every grid cell; skipped cells keep 0 and are never read.
        let mut index_map = vec![0_i32; n * n];
        let mut mesh_index = 0_i32;
        let mut border_index = -1_i32;
        for y in 0..n {
            for x in 0..n {
                if is_out_of_mesh(x, y) {
                    index_map[y * n + x] = border_index;
                    border_index -= 1;
                } else if !is_skipped(x, y) {
                    index_map[y * n + x] = mesh_index;
                    mesh_index += 1;
                }
            }
        }

        let mut mesh = MeshData::with_capacity(mesh_index as usize, (-border_index - 1) as usize);

        for y in 0..n {
            for x in 0..n {
                if is_skipped(x, y) {
                    continue;
                }
                let out_of_mesh = is_out_of_mesh(x, y);
                let mesh_edge = !out_of_mesh && (x == 1 || y == 1 || x == n - 2 || y == n - 2);
                let main = !out_of_mesh
                    && !mesh_edge
                    && (x - 2) % step == 0
                    && (y - 2) % step == 0;
                let edge_connection = !out_of_mesh
                    && !mesh_edge
                    && !main
                    && (x == 2 || y == 2 || x == n - 3 || y == n - 3);

                let index = index_map[y * n + x];
                let (position, percent) = grid_position(n, world_size, x, y);

                let height = if edge_connection {
                    self.edge_connection_height(field, x, y, step)
                } else {
                    self.mapping.height(field.get(x, y))
                };

                mesh.add_vertex(Vec3::new(position.x, height, position.y), percent, index);

                let create_triangle =
                    x < n - 1 && y < n - 1 && (!edge_connection || (x != 2 && y != 2));
                if create_triangle {
                    let inc = if main && x != n - 3 && y != n - 3 {
                        step
                    } else {
                        1
                    };
                    let a = index_map[y * n + x];
                    let b = index_map[y * n + x + inc];
                    let c = index_map[(y + inc) * n + x];
                    let d = index_map[(y + inc) * n + x + inc];
                    mesh.add_triangle(a, d, c);
                    mesh.add_triangle(d, a, b);
                }
            }
        }

        mesh.bake_normals();

        // Edge-connection heights only shape positions; the shared edge keeps
        // the normals a full-resolution mesh would bake.
        if step > 1 {
            for y in 1..n - 1 {
                for x in 1..n - 1 {
                    if x == 1 || y == 1 || x == n - 2 || y == n - 2 {
                        let index = index_map[y * n + x] as usize;
                        mesh.normals[index] = self.full_resolution_normal(field, x, y);
                    }
                }
            }
        }

        tracing::trace!(
            lod,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "built chunk mesh"
        );
        Ok(mesh)
    }

    /// Height of an edge-connection vertex, interpolated between the two
    /// lattice vertices it sits between on its ring.
    fn edge_connection_height(&self, field: &HeightField, x: usize, y: usize, step: usize) -> f32 {
        let n = field.size();
        let vertical = x == 2 || x == n - 3;
        let to_a = (if vertical { y - 2 } else { x - 2 }) % step;
        let to_b = step - to_a;
        let t = to_a as f32 / step as f32;

        let (a, b) = if vertical {
            (field.get(x, y - to_a), field.get(x, y + to_b))
        } else {
            (field.get(x - to_a, y), field.get(x + to_b, y))
        };
        self.mapping.height(a) * (1.0 - t) + self.mapping.height(b) * t
    }

    /// Normal at `(x, y)` from the six step-1 triangles around it, over raw
    /// heights. Both chunks sharing a mesh edge see the same cells here.
    fn full_resolution_normal(&self, field: &HeightField, x: usize, y: usize) -> Vec3 {
        let n = field.size();
        let world_size = self.settings.mesh_world_size();
        let point = |x: usize, y: usize| {
            let (position, _) = grid_position(n, world_size, x, y);
            Vec3::new(position.x, self.mapping.height(field.get(x, y)), position.y)
        };
        let face = |a: Vec3, b: Vec3, c: Vec3| (b - a).cross(c - a).normalize_or_zero();

        let mut normal = Vec3::ZERO;
        for (qx, qy) in [(x - 1, y - 1), (x, y - 1), (x - 1, y), (x, y)] {
            let a = point(qx, qy);
            let b = point(qx + 1, qy);
            let c = point(qx, qy + 1);
            let d = point(qx + 1, qy + 1);
            // Same split as `build`: (a, d, c) and (d, a, b).
            match (x - qx, y - qy) {
                (0, 0) | (1, 1) => normal += face(a, d, c) + face(d, a, b),
                (0, 1) => normal += face(a, d, c),
                _ => normal += face(d, a, b),
            }
        }
        normal.normalize_or(Vec3::Y)
    }
}
