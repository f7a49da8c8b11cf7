//! Single-chunk previews: height map, falloff map, and mesh statistics.

use std::path::Path;

use clap::ValueEnum;
use glam::Vec2;
use ridge_config::Config;
use ridge_mesh::{HeightMapping, MeshBuilder, MeshData, NUM_SUPPORTED_LODS};
use ridge_terrain::texture::{falloff_texture, height_texture};
use ridge_terrain::{HeightField, generate_falloff_map, generate_height_field};
use tracing::info;

use crate::error::AppError;

/// What `ridge preview` renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PreviewMode {
    /// Grayscale height map of one chunk.
    Noise,
    /// Height map plus mesh statistics for every detail level.
    Mesh,
    /// The island falloff map at chunk resolution.
    Falloff,
}

/// Vertex and triangle counts of one built mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshStats {
    pub lod: u32,
    pub vertices: usize,
    pub triangles: usize,
}

impl MeshStats {
    fn of(lod: u32, mesh: &MeshData) -> Self {
        Self {
            lod,
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
        }
    }
}

/// Generate the chunk at `sample_center` and write the preview to `out`.
///
/// Returns mesh statistics in [`PreviewMode::Mesh`], empty otherwise.
pub fn run_preview(
    config: &Config,
    mode: PreviewMode,
    sample_center: Vec2,
    out: &Path,
) -> Result<Vec<MeshStats>, AppError> {
    config.mesh.validate()?;
    let num_verts_per_line = config.mesh.num_verts_per_line();

    match mode {
        PreviewMode::Falloff => {
            let falloff = generate_falloff_map(num_verts_per_line);
            falloff_texture(&falloff).save(out)?;
            info!(path = %out.display(), size = num_verts_per_line, "falloff preview written");
            Ok(Vec::new())
        }
        PreviewMode::Noise => {
            let field = height_field(config, sample_center)?;
            height_texture(&field).save(out)?;
            info!(path = %out.display(), size = field.size(), "height preview written");
            Ok(Vec::new())
        }
        PreviewMode::Mesh => {
            let field = height_field(config, sample_center)?;
            height_texture(&field).save(out)?;

            let builder = MeshBuilder::new(
                config.mesh.clone(),
                HeightMapping::from_settings(&config.terrain),
            );
            let mut stats = Vec::with_capacity(NUM_SUPPORTED_LODS as usize);
            for lod in 0..NUM_SUPPORTED_LODS {
                let mesh = builder.build(&field, lod)?;
                let entry = MeshStats::of(lod, &mesh);
                info!(
                    lod,
                    vertices = entry.vertices,
                    triangles = entry.triangles,
                    "mesh built"
                );
                stats.push(entry);
            }
            Ok(stats)
        }
    }
}

fn height_field(config: &Config, sample_center: Vec2) -> Result<HeightField, AppError> {
    let field = generate_height_field(
        config.mesh.num_verts_per_line(),
        &config.terrain,
        &config.erosion,
        sample_center,
    )?;
    info!(
        min = field.min_value(),
        max = field.max_value(),
        erosion = config.terrain.use_erosion,
        "height field generated"
    );
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> Config {
        let mut config = Config::default();
        config.terrain.use_erosion = false;
        config
    }

    #[test]
    fn test_noise_preview_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("noise.png");
        let stats = run_preview(&quick_config(), PreviewMode::Noise, Vec2::ZERO, &out).unwrap();
        assert!(stats.is_empty());

        let image = image::open(&out).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (53, 53));
        // Black at the field minimum, white at its maximum.
        assert!(image.pixels().any(|p| p.0[0] == 0));
        assert!(image.pixels().any(|p| p.0[0] == 255));
    }

    #[test]
    fn test_falloff_preview_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("falloff.png");
        run_preview(&quick_config(), PreviewMode::Falloff, Vec2::ZERO, &out).unwrap();
        let image = image::open(&out).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (53, 53));
    }

    #[test]
    fn test_mesh_preview_reports_every_lod() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("mesh.png");
        let stats = run_preview(&quick_config(), PreviewMode::Mesh, Vec2::ZERO, &out).unwrap();
        assert_eq!(stats.len(), NUM_SUPPORTED_LODS as usize);
        assert_eq!(stats[0].vertices, 51 * 51);
        assert_eq!(stats[0].triangles, 2 * 50 * 50);
        for pair in stats.windows(2) {
            assert!(pair[1].vertices < pair[0].vertices, "{pair:?}");
        }
    }

    #[test]
    fn test_invalid_mesh_settings_rejected() {
        let mut config = quick_config();
        config.mesh.chunk_size_index = 42;
        let dir = tempfile::tempdir().unwrap();
        let result = run_preview(&config, PreviewMode::Noise, Vec2::ZERO, &dir.path().join("x.png"));
        assert!(matches!(result, Err(AppError::Mesh(_))));
    }
}
