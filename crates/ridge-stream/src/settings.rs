//! Validated, shareable settings for a streaming session.

use std::sync::Arc;

use ridge_lod::DetailLevels;
use ridge_mesh::{HeightMapping, MeshBuilder, MeshSettings};
use ridge_terrain::{ErosionSettings, HeightMapSettings, VegetationSettings};

use crate::error::StreamError;
use crate::retention::RetentionPolicy;

/// Everything chunks and jobs need, checked once up front.
///
/// Settings that jobs carry to worker threads are behind `Arc`s so each job
/// clones a pointer, not the settings.
#[derive(Clone, Debug)]
pub struct StreamSettings {
    height: Arc<HeightMapSettings>,
    erosion: Arc<ErosionSettings>,
    builder: Arc<MeshBuilder>,
    detail_levels: DetailLevels,
    vegetation: VegetationSettings,
    retention: RetentionPolicy,
}

impl StreamSettings {
    pub fn new(
        height: HeightMapSettings,
        erosion: ErosionSettings,
        mesh: MeshSettings,
        detail_levels: DetailLevels,
        vegetation: VegetationSettings,
        retention: RetentionPolicy,
    ) -> Result<Self, StreamError> {
        let mapping = HeightMapping::from_settings(&height);
        let settings = Self {
            height: Arc::new(height),
            erosion: Arc::new(erosion),
            builder: Arc::new(MeshBuilder::new(mesh, mapping)),
            detail_levels,
            vegetation,
            retention,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check every component against the others.
    pub fn validate(&self) -> Result<(), StreamError> {
        let mesh = self.builder.settings();
        mesh.validate()?;
        self.height.validate()?;
        if self.height.use_erosion {
            let radius = self.erosion.brush_radius as usize;
            self.erosion
                .validate(mesh.num_verts_per_line() + 2 * radius)?;
        }
        self.detail_levels.validate()?;
        self.vegetation.validate()?;
        if let RetentionPolicy::EvictBeyond { distance } = self.retention {
            let max_view_distance = self.detail_levels.max_view_distance();
            if !(distance >= max_view_distance) {
                return Err(StreamError::EvictionDistance {
                    distance,
                    max_view_distance,
                });
            }
        }
        Ok(())
    }

    pub fn height(&self) -> &Arc<HeightMapSettings> {
        &self.height
    }

    pub fn erosion(&self) -> &Arc<ErosionSettings> {
        &self.erosion
    }

    pub fn builder(&self) -> &Arc<MeshBuilder> {
        &self.builder
    }

    pub fn mesh(&self) -> &MeshSettings {
        self.builder.settings()
    }

    pub fn detail_levels(&self) -> &DetailLevels {
        &self.detail_levels
    }

    pub fn vegetation(&self) -> &VegetationSettings {
        &self.vegetation
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    pub fn mesh_world_size(&self) -> f32 {
        self.mesh().mesh_world_size()
    }

    /// Chunks loaded in each direction around the viewer's chunk.
    pub fn chunks_visible_in_view_distance(&self) -> i32 {
        (self.detail_levels.max_view_distance() / self.mesh_world_size()).round() as i32
    }
}
