use clap::ValueEnum;
use image::{Rgba as Pixel, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::biome::{self, BiomeTable};
use crate::climate::{self, Rgba};
use crate::config::HeightCurve;
use crate::heightfield::HeightField;
use crate::mesh::{self, MeshData};

/// Which view of the generated world to hand to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawMode {
    /// Raw elevation as a grayscale texture
    NoiseMap,
    /// Biome colors as a flat texture
    ColorMap,
    /// Terrain mesh with the biome-colored texture
    #[default]
    Mesh,
    /// Terrain mesh with the precipitation diagnostic texture
    MoistureMap,
    /// Terrain mesh with the temperature diagnostic texture
    HeatMap,
}

/// What the selected mode produced
#[derive(Debug, Clone)]
pub enum RenderPayload {
    Texture(RgbaImage),
    Mesh { mesh: MeshData, texture: RgbaImage },
}

/// Payload plus generation diagnostics
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub payload: RenderPayload,
    /// Cells no biome entry covered; `None` when the mode never built a
    /// biome map
    pub unclassified_cells: Option<usize>,
}

/// Display collaborator boundary
///
/// Whoever implements this owns presentation details: normal recomputation,
/// GPU upload, file formats. The core only hands over buffers.
pub trait MapDisplay {
    fn show_texture(&mut self, texture: &RgbaImage) -> anyhow::Result<()>;
    fn show_mesh(&mut self, mesh: &MeshData, texture: &RgbaImage) -> anyhow::Result<()>;
}

/// Produce the payload for one draw mode
///
/// Pull-based: only the buffers the mode actually shows are computed. The
/// climate grid, biome map, diagnostics and mesh are all pure functions of
/// the height field, so skipping the unused ones changes nothing observable.
pub fn select(
    mode: DrawMode,
    height: &HeightField,
    table: &BiomeTable,
    height_multiplier: f32,
    height_curve: &HeightCurve,
) -> RenderOutput {
    let biome_colors = |unclassified: &mut Option<usize>| {
        let climate = climate::classify(height);
        let map = biome::classify(height, &climate, table);
        *unclassified = Some(map.unclassified_cells());
        map.color_map(table)
    };
    let terrain = || mesh::build_terrain_mesh(height, height_multiplier, |h| height_curve.evaluate(h));

    let mut unclassified = None;
    let payload = match mode {
        DrawMode::NoiseMap => RenderPayload::Texture(height_texture(height)),
        DrawMode::ColorMap => {
            let colors = biome_colors(&mut unclassified);
            RenderPayload::Texture(color_texture(&colors, height.width(), height.height()))
        }
        DrawMode::Mesh => {
            let colors = biome_colors(&mut unclassified);
            RenderPayload::Mesh {
                mesh: terrain(),
                texture: color_texture(&colors, height.width(), height.height()),
            }
        }
        DrawMode::MoistureMap => {
            let colors = climate::classify(height).moisture_color_map();
            RenderPayload::Mesh {
                mesh: terrain(),
                texture: color_texture(&colors, height.width(), height.height()),
            }
        }
        DrawMode::HeatMap => {
            let colors = climate::classify(height).heat_color_map();
            RenderPayload::Mesh {
                mesh: terrain(),
                texture: color_texture(&colors, height.width(), height.height()),
            }
        }
    };

    RenderOutput { payload, unclassified_cells: unclassified }
}

/// Hand a payload to the display collaborator
pub fn present(payload: &RenderPayload, display: &mut impl MapDisplay) -> anyhow::Result<()> {
    match payload {
        RenderPayload::Texture(texture) => display.show_texture(texture),
        RenderPayload::Mesh { mesh, texture } => display.show_mesh(mesh, texture),
    }
}

/// Grayscale texture of raw elevation, black at 0 and white at 1
pub fn height_texture(height: &HeightField) -> RgbaImage {
    let mut img = RgbaImage::new(height.width() as u32, height.height() as u32);
    for row in 0..height.height() {
        for col in 0..height.width() {
            let level = (height.get(col, row).clamp(0.0, 1.0) * 255.0).round() as u8;
            img.put_pixel(col as u32, row as u32, Pixel([level, level, level, 255]));
        }
    }
    img
}

/// Texture from a row-major color buffer
pub fn color_texture(colors: &[Rgba], width: usize, height: usize) -> RgbaImage {
    let mut img = RgbaImage::new(width as u32, height as u32);
    for row in 0..height {
        for col in 0..width {
            img.put_pixel(col as u32, row as u32, Pixel(colors[row * width + col]));
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CurvePoint, default_biome_table};

    fn test_field() -> HeightField {
        let samples: Vec<f32> = (0..36).map(|i| (i as f32 * 0.143).fract()).collect();
        HeightField::from_samples(6, 6, samples)
    }

    fn table() -> BiomeTable {
        BiomeTable::new(default_biome_table()).unwrap()
    }

    #[test]
    fn test_noise_mode_returns_grayscale_texture() {
        let out = select(DrawMode::NoiseMap, &test_field(), &table(), 1.0, &HeightCurve::identity());
        assert_eq!(out.unclassified_cells, None);
        match out.payload {
            RenderPayload::Texture(texture) => {
                assert_eq!(texture.width(), 6);
                assert_eq!(texture.height(), 6);
                let px = texture.get_pixel(0, 0);
                assert_eq!(px[0], px[1]);
                assert_eq!(px[1], px[2]);
            }
            RenderPayload::Mesh { .. } => panic!("noise mode should not build a mesh"),
        }
    }

    #[test]
    fn test_color_mode_reports_unclassified_count() {
        let out = select(DrawMode::ColorMap, &test_field(), &table(), 1.0, &HeightCurve::identity());
        // The default table covers every band pair
        assert_eq!(out.unclassified_cells, Some(0));
        assert!(matches!(out.payload, RenderPayload::Texture(_)));
    }

    #[test]
    fn test_mesh_mode_builds_mesh_and_texture() {
        let out = select(DrawMode::Mesh, &test_field(), &table(), 5.0, &HeightCurve::identity());
        match out.payload {
            RenderPayload::Mesh { mesh, texture } => {
                assert_eq!(mesh.vertices.len(), 36);
                assert_eq!(mesh.triangles.len(), 5 * 5 * 6);
                assert_eq!(texture.width(), 6);
            }
            RenderPayload::Texture(_) => panic!("mesh mode should build a mesh"),
        }
    }

    #[test]
    fn test_mesh_mode_applies_curve() {
        let curve = HeightCurve::from_points(vec![
            CurvePoint { t: 0.0, value: 2.0 },
            CurvePoint { t: 1.0, value: 2.0 },
        ])
        .unwrap();
        let out = select(DrawMode::Mesh, &test_field(), &table(), 3.0, &curve);
        match out.payload {
            RenderPayload::Mesh { mesh, .. } => {
                assert!(mesh.vertices.iter().all(|v| v.y == 6.0));
            }
            RenderPayload::Texture(_) => panic!("mesh mode should build a mesh"),
        }
    }

    #[test]
    fn test_diagnostic_modes_pair_mesh_with_band_colors() {
        // All-zero field: wettest everywhere -> cyan moisture texture
        let field = HeightField::from_samples(2, 2, vec![0.0; 4]);
        let out = select(DrawMode::MoistureMap, &field, &table(), 1.0, &HeightCurve::identity());
        match out.payload {
            RenderPayload::Mesh { texture, .. } => {
                assert_eq!(*texture.get_pixel(0, 0), Pixel([0, 255, 255, 255]));
            }
            RenderPayload::Texture(_) => panic!("moisture mode should build a mesh"),
        }
        assert_eq!(out.unclassified_cells, None);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let field = test_field();
        let a = select(DrawMode::ColorMap, &field, &table(), 1.0, &HeightCurve::identity());
        let b = select(DrawMode::ColorMap, &field, &table(), 1.0, &HeightCurve::identity());
        match (a.payload, b.payload) {
            (RenderPayload::Texture(ta), RenderPayload::Texture(tb)) => {
                assert_eq!(ta.as_raw(), tb.as_raw());
            }
            _ => panic!("color mode should produce textures"),
        }
    }
}
