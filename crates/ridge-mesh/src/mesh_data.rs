//! Triangle mesh buffers produced for one chunk at one level of detail.

use glam::{Vec2, Vec3};

/// Vertex, UV, index and normal buffers for a chunk mesh.
///
/// Vertices are addressed by signed indices while building: `0, 1, …` are
/// renderable vertices, `-1, -2, …` are out-of-mesh border vertices that only
/// contribute to normals and are dropped from the output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Renderable vertex positions in chunk-local world units.
    pub vertices: Vec<Vec3>,
    /// Per-vertex texture coordinates in `[0, 1]`.
    pub uvs: Vec<Vec2>,
    /// Index buffer, 3 indices per triangle.
    pub triangles: Vec<u32>,
    /// Unit vertex normals, including contributions from border triangles.
    pub normals: Vec<Vec3>,
    border_vertices: Vec<Vec3>,
    border_triangles: Vec<[i32; 3]>,
}

impl MeshData {
    pub(crate) fn with_capacity(vertices: usize, border_vertices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(vertices * 6),
            normals: Vec::new(),
            border_vertices: Vec::with_capacity(border_vertices),
            border_triangles: Vec::new(),
        }
    }

    /// Store a vertex at its signed index. Indices of each kind must arrive
    /// in order (`0, 1, 2…` and `-1, -2, -3…`).
    pub(crate) fn add_vertex(&mut self, position: Vec3, uv: Vec2, index: i32) {
        if index < 0 {
            debug_assert_eq!(self.border_vertices.len(), (-index - 1) as usize);
            self.border_vertices.push(position);
        } else {
            debug_assert_eq!(self.vertices.len(), index as usize);
            self.vertices.push(position);
            self.uvs.push(uv);
        }
    }

    pub(crate) fn add_triangle(&mut self, a: i32, b: i32, c: i32) {
        if a < 0 || b < 0 || c < 0 {
            self.border_triangles.push([a, b, c]);
        } else {
            self.triangles.extend_from_slice(&[a as u32, b as u32, c as u32]);
        }
    }

    fn position(&self, index: i32) -> Vec3 {
        if index < 0 {
            self.border_vertices[(-index - 1) as usize]
        } else {
            self.vertices[index as usize]
        }
    }

    fn face_normal(&self, a: i32, b: i32, c: i32) -> Vec3 {
        let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
        (pb - pa).cross(pc - pa).normalize_or_zero()
    }

    /// Accumulate face normals of every triangle, border triangles included,
    /// into the renderable vertices they touch, then normalize.
    pub(crate) fn bake_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.triangles.chunks_exact(3) {
            let [a, b, c] = [tri[0] as i32, tri[1] as i32, tri[2] as i32];
            let normal = self.face_normal(a, b, c);
            for index in [a, b, c] {
                normals[index as usize] += normal;
            }
        }
        for &[a, b, c] in &self.border_triangles {
            let normal = self.face_normal(a, b, c);
            for index in [a, b, c] {
                if index >= 0 {
                    normals[index as usize] += normal;
                }
            }
        }

        for n in &mut normals {
            *n = n.normalize_or(Vec3::Y);
        }
        self.normals = normals;
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Out-of-mesh vertices kept for normal computation.
    pub fn border_vertex_count(&self) -> usize {
        self.border_vertices.len()
    }

    pub fn border_triangle_count(&self) -> usize {
        self.border_triangles.len()
    }
}
