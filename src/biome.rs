use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::climate::{ClimateGrid, Precipitation, Rgba, Temperature};
use crate::heightfield::HeightField;

/// One entry of the configured biome table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeDescriptor {
    pub name: String,
    /// Height threshold; only meaningful for the water entry, where it is the
    /// sea level every cell is compared against
    pub height: f32,
    pub temperature: Temperature,
    pub precipitation: Precipitation,
    pub color: Rgba,
    /// Marks the designated water biome. Exactly one entry must carry this.
    #[serde(default)]
    pub is_water: bool,
}

/// Rejected biome-table configurations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BiomeTableError {
    #[error("biome table needs at least 2 entries, got {0}")]
    TooFewEntries(usize),
    #[error("biome table has no entry tagged is_water")]
    NoWaterEntry,
    #[error("biome table tags multiple entries as water: {0:?}")]
    MultipleWaterEntries(Vec<String>),
}

/// Ordered biome table, validated on construction
///
/// Classification scans entries in table order, so earlier entries shadow
/// later ones with the same band pair. The water entry is matched by its tag,
/// not by position.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomeTable {
    entries: Vec<BiomeDescriptor>,
    water: usize,
}

impl BiomeTable {
    pub fn new(entries: Vec<BiomeDescriptor>) -> Result<Self, BiomeTableError> {
        if entries.len() < 2 {
            return Err(BiomeTableError::TooFewEntries(entries.len()));
        }
        let tagged: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_water)
            .map(|(i, _)| i)
            .collect();
        match tagged.as_slice() {
            [] => Err(BiomeTableError::NoWaterEntry),
            [water] => Ok(BiomeTable { entries, water: *water }),
            many => Err(BiomeTableError::MultipleWaterEntries(
                many.iter().map(|&i| entries[i].name.clone()).collect(),
            )),
        }
    }

    pub fn entries(&self) -> &[BiomeDescriptor] {
        &self.entries
    }

    /// The designated water biome
    pub fn water(&self) -> &BiomeDescriptor {
        &self.entries[self.water]
    }
}

/// Classification result for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiomeAssignment {
    /// Raw height at or below sea level; overrides all band matching
    Water,
    /// Index of the matching table entry
    Matched(usize),
    /// No entry covered this cell's band pair; a configuration gap, carried
    /// explicitly instead of hiding behind a default color
    Unclassified,
}

/// Per-cell biome assignments for a whole grid
#[derive(Debug, Clone, PartialEq)]
pub struct BiomeMap {
    width: usize,
    height: usize,
    cells: Vec<BiomeAssignment>,
    unclassified: usize,
}

impl BiomeMap {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, col: usize, row: usize) -> BiomeAssignment {
        self.cells[row * self.width + col]
    }

    /// Number of cells no table entry covered
    pub fn unclassified_cells(&self) -> usize {
        self.unclassified
    }

    /// Row-major RGBA coloring of the assignments
    ///
    /// Unclassified cells come out transparent black, matching what older
    /// maps rendered for table gaps.
    pub fn color_map(&self, table: &BiomeTable) -> Vec<Rgba> {
        self.cells
            .iter()
            .map(|cell| match cell {
                BiomeAssignment::Water => table.water().color,
                BiomeAssignment::Matched(k) => table.entries()[*k].color,
                BiomeAssignment::Unclassified => [0, 0, 0, 0],
            })
            .collect()
    }
}

/// Assign a biome to every cell
///
/// Water first: any cell whose raw height is at or below the water entry's
/// height threshold is water, whatever its climate bands say. Everything else
/// takes the first non-water table entry whose temperature and precipitation
/// bands both match the cell's.
pub fn classify(height: &HeightField, climate: &ClimateGrid, table: &BiomeTable) -> BiomeMap {
    let width = height.width();
    let rows = height.height();
    let sea_level = table.water().height;

    let mut cells = Vec::with_capacity(width * rows);
    let mut unclassified = 0;

    for row in 0..rows {
        for col in 0..width {
            if height.get(col, row) <= sea_level {
                cells.push(BiomeAssignment::Water);
                continue;
            }

            let sample = climate.get(col, row);
            let matched = table
                .entries()
                .iter()
                .enumerate()
                .find(|(_, biome)| {
                    !biome.is_water
                        && biome.temperature == sample.temperature_band
                        && biome.precipitation == sample.precipitation_band
                })
                .map(|(k, _)| k);

            match matched {
                Some(k) => cells.push(BiomeAssignment::Matched(k)),
                None => {
                    unclassified += 1;
                    cells.push(BiomeAssignment::Unclassified);
                }
            }
        }
    }

    BiomeMap { width, height: rows, cells, unclassified }
}
