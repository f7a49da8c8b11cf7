//! Integer chunk coordinates on the terrain plane.

use glam::Vec2;

/// Position of a chunk in chunk-grid units. Chunk `(x, y)` is centred at
/// `(x, y) * mesh_world_size` in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate offset by `(dx, dy)` chunks.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The chunk whose centre is nearest to `position`.
    pub fn from_world(position: Vec2, mesh_world_size: f32) -> Self {
        let cell = (position / mesh_world_size).round();
        Self::new(cell.x as i32, cell.y as i32)
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// World-space centre of the chunk.
    pub fn world_center(self, mesh_world_size: f32) -> Vec2 {
        self.as_vec2() * mesh_world_size
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
