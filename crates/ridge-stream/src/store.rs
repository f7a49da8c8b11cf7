//! Owner of every chunk created so far, keyed by [`ChunkCoord`].
//!
//! Uses an [`FxHashMap`](rustc_hash::FxHashMap) for fast hashing of small
//! fixed-size keys. Only the control thread touches the store.

use rustc_hash::FxHashMap;

use crate::chunk::TerrainChunk;
use crate::coord::ChunkCoord;

#[derive(Default)]
pub struct ChunkStore {
    chunks: FxHashMap<ChunkCoord, TerrainChunk>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chunk at its own coordinate, returning any chunk it replaced.
    pub fn insert(&mut self, chunk: TerrainChunk) -> Option<TerrainChunk> {
        self.chunks.insert(chunk.coord(), chunk)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<TerrainChunk> {
        self.chunks.remove(&coord)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut TerrainChunk> {
        self.chunks.get_mut(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &TerrainChunk)> {
        self.chunks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ChunkCoord, &mut TerrainChunk)> {
        self.chunks.iter_mut()
    }

    /// Remove every chunk for which `keep` returns `false`, returning their coordinates.
    pub fn retain(&mut self, mut keep: impl FnMut(&TerrainChunk) -> bool) -> Vec<ChunkCoord> {
        let mut removed = Vec::new();
        self.chunks.retain(|coord, chunk| {
            let kept = keep(chunk);
            if !kept {
                removed.push(*coord);
            }
            kept
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retention::RetentionPolicy;
    use crate::settings::StreamSettings;
    use ridge_lod::DetailLevels;
    use ridge_mesh::MeshSettings;
    use ridge_terrain::{ErosionSettings, HeightMapSettings, VegetationSettings};

    fn settings() -> StreamSettings {
        StreamSettings::new(
            HeightMapSettings::default(),
            ErosionSettings::default(),
            MeshSettings::default(),
            DetailLevels::default(),
            VegetationSettings::default(),
            RetentionPolicy::KeepAll,
        )
        .unwrap()
    }

    #[test]
    fn test_insert_get_remove() {
        let settings = settings();
        let mut store = ChunkStore::new();
        assert!(store.is_empty());

        let coord = ChunkCoord::new(3, -4);
        assert!(store.insert(TerrainChunk::new(coord, &settings)).is_none());
        assert!(store.contains(coord));
        assert_eq!(store.get(coord).map(TerrainChunk::coord), Some(coord));
        assert!(store.get_mut(coord).is_some());
        assert_eq!(store.len(), 1);

        // Reinserting replaces the existing chunk.
        assert!(store.insert(TerrainChunk::new(coord, &settings)).is_some());
        assert_eq!(store.len(), 1);

        assert!(store.remove(coord).is_some());
        assert!(store.remove(coord).is_none());
        assert!(store.get(coord).is_none());
    }

    #[test]
    fn test_retain_reports_removed_coords() {
        let settings = settings();
        let mut store = ChunkStore::new();
        for x in -2..=2 {
            store.insert(TerrainChunk::new(ChunkCoord::new(x, 0), &settings));
        }
        let mut removed = store.retain(|chunk| chunk.coord().x >= 0);
        removed.sort();
        assert_eq!(removed, vec![ChunkCoord::new(-2, 0), ChunkCoord::new(-1, 0)]);
        let mut coords: Vec<_> = store.coords().collect();
        coords.sort();
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[0], ChunkCoord::new(0, 0));
    }
}
