use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::biome::{BiomeDescriptor, BiomeTable, BiomeTableError};
use crate::climate::{Precipitation, Temperature};
use crate::heightfield::NoiseParams;
use crate::render::DrawMode;

/// One keyframe of the height remap curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Normalized input height
    pub t: f32,
    /// Vertical displacement factor at that height
    pub value: f32,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("height curve keyframe ({t}, {value}) is not finite")]
    InvalidCurvePoint { t: f32, value: f32 },
}

/// Piecewise-linear remap of a normalized height to a displacement factor
///
/// Keyframes are sorted by `t` on construction; evaluation clamps to the end
/// keyframes. An empty keyframe list is the identity curve.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightCurve {
    points: Vec<CurvePoint>,
}

impl HeightCurve {
    pub fn from_points(mut points: Vec<CurvePoint>) -> Result<Self, ConfigError> {
        for p in &points {
            if !p.t.is_finite() || !p.value.is_finite() {
                return Err(ConfigError::InvalidCurvePoint { t: p.t, value: p.value });
            }
        }
        points.sort_by(|a, b| a.t.total_cmp(&b.t));
        Ok(HeightCurve { points })
    }

    pub fn identity() -> Self {
        HeightCurve { points: Vec::new() }
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let points = &self.points;
        if points.is_empty() {
            return t;
        }
        if t <= points[0].t {
            return points[0].value;
        }
        if let Some(last) = points.last() {
            if t >= last.t {
                return last.value;
            }
        }
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                let span = b.t - a.t;
                if span <= f32::EPSILON {
                    return b.value;
                }
                let frac = (t - a.t) / span;
                return a.value + frac * (b.value - a.value);
            }
        }
        points.last().map(|p| p.value).unwrap_or(t)
    }
}

/// Full parameter set for one generation pass
///
/// Loadable from JSON; every field has a default so partial files work. CLI
/// flags override individual fields after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub offset: [f32; 2],
    pub height_multiplier: f32,
    /// Keyframes of the height remap curve; empty means identity
    pub height_curve: Vec<CurvePoint>,
    pub draw_mode: DrawMode,
    /// Boundary flag for endless-terrain hosts; chunk streaming is not
    /// implemented here, the flag is accepted and reported only
    pub infinite: bool,
    pub biomes: Vec<BiomeDescriptor>,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            width: 100,
            height: 100,
            seed: 0,
            scale: 27.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
            height_multiplier: 10.0,
            height_curve: vec![
                CurvePoint { t: 0.0, value: 0.0 },
                CurvePoint { t: 0.4, value: 0.0 },
                CurvePoint { t: 1.0, value: 1.0 },
            ],
            draw_mode: DrawMode::default(),
            infinite: false,
            biomes: default_biome_table(),
        }
    }
}

impl MapConfig {
    /// Load a config from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<MapConfig> {
        let file = File::open(path)
            .with_context(|| format!("opening config file {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply boundary clamps before generation
    pub fn normalized(mut self) -> Self {
        self.width = self.width.max(1);
        self.height = self.height.max(1);
        self.lacunarity = self.lacunarity.max(1.0);
        self
    }

    pub fn noise_params(&self) -> NoiseParams {
        NoiseParams {
            seed: self.seed,
            scale: self.scale,
            octaves: self.octaves,
            persistence: self.persistence,
            lacunarity: self.lacunarity,
            offset: Vec2::new(self.offset[0], self.offset[1]),
        }
    }

    pub fn biome_table(&self) -> Result<BiomeTable, BiomeTableError> {
        BiomeTable::new(self.biomes.clone())
    }

    pub fn height_curve(&self) -> Result<HeightCurve, ConfigError> {
        HeightCurve::from_points(self.height_curve.clone())
    }
}

/// Built-in biome table covering every temperature/precipitation pair
///
/// Water sits at index 1, where configs written against the old positional
/// convention expect it.
pub fn default_biome_table() -> Vec<BiomeDescriptor> {
    use Precipitation::*;
    use Temperature::*;

    let land = |name: &str, temperature, precipitation, color: [u8; 3]| BiomeDescriptor {
        name: name.to_string(),
        height: 1.0,
        temperature,
        precipitation,
        color: [color[0], color[1], color[2], 255],
        is_water: false,
    };

    vec![
        land("snow", Coldest, Wettest, [248, 248, 248]),
        BiomeDescriptor {
            name: "water".to_string(),
            height: 0.4,
            temperature: Cold,
            precipitation: Wettest,
            color: [48, 84, 170, 255],
            is_water: true,
        },
        land("tundra", Coldest, Wet, [221, 221, 228]),
        land("frozen steppe", Coldest, Dry, [190, 196, 190]),
        land("polar desert", Coldest, Dryest, [172, 176, 180]),
        land("boreal forest", Cold, Wettest, [95, 115, 62]),
        land("shrubland", Cold, Wet, [135, 152, 90]),
        land("steppe", Cold, Dry, [164, 155, 98]),
        land("cold desert", Cold, Dryest, [192, 172, 120]),
        land("seasonal forest", Hot, Wettest, [64, 130, 53]),
        land("grassland", Hot, Wet, [120, 160, 70]),
        land("savanna", Hot, Dry, [177, 161, 83]),
        land("badlands", Hot, Dryest, [200, 140, 90]),
        land("rainforest", Hottest, Wettest, [38, 110, 54]),
        land("monsoon forest", Hottest, Wet, [70, 140, 60]),
        land("scrub desert", Hottest, Dry, [214, 180, 110]),
        land("desert", Hottest, Dryest, [230, 202, 120]),
    ]
}
