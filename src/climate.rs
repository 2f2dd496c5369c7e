use serde::{Deserialize, Serialize};

use crate::heightfield::HeightField;

/// RGBA color, 8 bits per channel
pub type Rgba = [u8; 4];

/// Discrete precipitation level
///
/// Precipitation reuses the elevation sample directly, so low ground reads as
/// wet and high ground as dry. That conflation is intentional and kept for
/// compatibility with existing maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precipitation {
    Wettest,
    Wet,
    Dry,
    Dryest,
}

impl Precipitation {
    /// Band a precipitation value; thresholds are checked in order and the
    /// first match wins
    pub fn from_value(value: f32) -> Self {
        if value < 0.50 {
            Precipitation::Wettest
        } else if value < 0.66 {
            Precipitation::Wet
        } else if value < 0.80 {
            Precipitation::Dry
        } else {
            Precipitation::Dryest
        }
    }

    /// Diagnostic color for moisture-map rendering
    pub fn diagnostic_color(self) -> Rgba {
        match self {
            Precipitation::Dryest => [255, 0, 0, 255],  // red
            Precipitation::Dry => [255, 255, 0, 255],   // yellow
            Precipitation::Wet => [0, 0, 255, 255],     // blue
            Precipitation::Wettest => [0, 255, 255, 255], // cyan
        }
    }
}

/// Discrete temperature level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Coldest,
    Cold,
    Hot,
    Hottest,
}

impl Temperature {
    /// Band a heat value; first match wins
    pub fn from_value(value: f32) -> Self {
        if value < 0.10 {
            Temperature::Coldest
        } else if value < 0.66 {
            Temperature::Cold
        } else if value < 0.90 {
            Temperature::Hot
        } else {
            Temperature::Hottest
        }
    }

    /// Diagnostic color for heat-map rendering
    pub fn diagnostic_color(self) -> Rgba {
        match self {
            Temperature::Coldest => [255, 255, 255, 255], // white
            Temperature::Cold => [0, 255, 0, 255],        // green
            Temperature::Hot => [255, 255, 0, 255],       // yellow
            Temperature::Hottest => [255, 0, 0, 255],     // red
        }
    }
}

/// Derived climate values for one grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub precipitation: f32,
    pub heat: f32,
    pub precipitation_band: Precipitation,
    pub temperature_band: Temperature,
}

/// Per-cell climate samples for a whole height field
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateGrid {
    width: usize,
    height: usize,
    samples: Vec<ClimateSample>,
}

impl ClimateGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, col: usize, row: usize) -> &ClimateSample {
        &self.samples[row * self.width + col]
    }

    /// Row-major moisture diagnostic coloring, one pixel per cell
    pub fn moisture_color_map(&self) -> Vec<Rgba> {
        self.samples
            .iter()
            .map(|s| s.precipitation_band.diagnostic_color())
            .collect()
    }

    /// Row-major heat diagnostic coloring, one pixel per cell
    pub fn heat_color_map(&self) -> Vec<Rgba> {
        self.samples
            .iter()
            .map(|s| s.temperature_band.diagnostic_color())
            .collect()
    }
}

/// Triangular latitude profile: 1 at the vertical midline, falling off
/// towards the top and bottom edges
///
/// The midline is `rows / 2` in integer arithmetic, so odd row counts bias
/// slightly the same way the reference maps do.
fn latitude_factor(row: usize, rows: usize) -> f32 {
    let half = (rows / 2) as i64;
    1.0 - 2.0 * (half - row as i64).abs() as f32 / rows as f32
}

/// Derive a climate sample for every cell of the height field
///
/// Precipitation is the raw elevation sample. Heat is the latitude profile
/// penalized by `precipitation^10` (tall wet cells cool off sharply) and
/// clamped below at zero. Pure function of the grid; no randomness beyond
/// what the height field already carries.
pub fn classify(height: &HeightField) -> ClimateGrid {
    let width = height.width();
    let rows = height.height();
    let mut samples = Vec::with_capacity(width * rows);

    for row in 0..rows {
        for col in 0..width {
            let precipitation = height.get(col, row);
            let heat = (latitude_factor(row, rows) - precipitation.powi(10)).max(0.0);

            samples.push(ClimateSample {
                precipitation,
                heat,
                precipitation_band: Precipitation::from_value(precipitation),
                temperature_band: Temperature::from_value(heat),
            });
        }
    }

    ClimateGrid { width, height: rows, samples }
}
