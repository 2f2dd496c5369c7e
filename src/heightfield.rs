use glam::Vec2;
use noise::{NoiseFn, Perlin};
use rand::prelude::*;
use rand::rngs::StdRng;

/// A 2D grid of normalized elevation samples in [0, 1]
///
/// Addressed as `(column, row)`. Immutable once built; one field is produced
/// per generation pass and every downstream stage reads from it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl HeightField {
    /// Wrap an existing row-major sample buffer as a height field
    ///
    /// # Panics
    /// Panics if `samples.len() != width * height`.
    pub fn from_samples(width: usize, height: usize, samples: Vec<f32>) -> Self {
        assert_eq!(
            samples.len(),
            width * height,
            "sample buffer does not match {}x{} grid",
            width,
            height
        );
        HeightField { width, height, samples }
    }

    /// Number of columns in the grid
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows in the grid
    pub fn height(&self) -> usize {
        self.height
    }

    /// Elevation sample at `(column, row)`
    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.samples[row * self.width + col]
    }
}

/// Parameters controlling fractal noise sampling
#[derive(Debug, Clone)]
pub struct NoiseParams {
    /// Seed for the noise function and octave offsets
    pub seed: u64,
    /// Zoom factor applied to grid coordinates before sampling
    pub scale: f32,
    /// Number of noise layers to combine
    pub octaves: u32,
    /// Per-octave amplitude falloff (0.0-1.0)
    pub persistence: f32,
    /// Per-octave frequency growth (>= 1.0)
    pub lacunarity: f32,
    /// Manual scroll offset through noise space
    pub offset: Vec2,
}

impl Default for NoiseParams {
    fn default() -> Self {
        NoiseParams {
            seed: 0,
            scale: 27.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
        }
    }
}

/// Generate a height field by sampling multi-octave Perlin noise
///
/// Octaves are combined as fractional Brownian motion: each octave samples at
/// `frequency *= lacunarity` and contributes `amplitude *= persistence`, from
/// a seeded random offset so that different seeds decorrelate. The raw sums
/// are renormalized to [0, 1] over the whole grid.
///
/// Out-of-range parameters are clamped before sampling (`width`, `height` to
/// at least 1, `lacunarity` to at least 1, `scale` to a small positive value)
/// rather than rejected.
pub fn generate_height_field(width: usize, height: usize, params: &NoiseParams) -> HeightField {
    let width = width.max(1);
    let height = height.max(1);
    let scale = params.scale.max(1e-4);
    let lacunarity = params.lacunarity.max(1.0);

    let perlin = Perlin::new(params.seed as u32);
    let mut rng = StdRng::seed_from_u64(params.seed);
    let octave_offsets: Vec<Vec2> = (0..params.octaves)
        .map(|_| {
            let x = rng.gen_range(-100_000.0..100_000.0f32) + params.offset.x;
            let y = rng.gen_range(-100_000.0..100_000.0f32) + params.offset.y;
            Vec2::new(x, y)
        })
        .collect();

    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;

    let mut samples = Vec::with_capacity(width * height);
    let mut min_value = f32::MAX;
    let mut max_value = f32::MIN;

    for row in 0..height {
        for col in 0..width {
            let mut amplitude = 1.0f32;
            let mut frequency = 1.0f32;
            let mut value = 0.0f32;

            for offset in &octave_offsets {
                let sample_x = (col as f32 - half_w) / scale * frequency + offset.x;
                let sample_y = (row as f32 - half_h) / scale * frequency + offset.y;
                let noise = perlin.get([sample_x as f64, sample_y as f64]) as f32;
                value += noise * amplitude;

                amplitude *= params.persistence;
                frequency *= lacunarity;
            }

            min_value = min_value.min(value);
            max_value = max_value.max(value);
            samples.push(value);
        }
    }

    // Renormalize the accumulated sums to [0, 1]. A flat field (e.g. zero
    // octaves) has no range to stretch and becomes all zeros.
    let range = max_value - min_value;
    if range > f32::EPSILON {
        for value in &mut samples {
            *value = (*value - min_value) / range;
        }
    } else {
        samples.fill(0.0);
    }

    HeightField::from_samples(width, height, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_honored() {
        let field = generate_height_field(13, 7, &NoiseParams::default());
        assert_eq!(field.width(), 13);
        assert_eq!(field.height(), 7);
    }

    #[test]
    fn test_samples_normalized() {
        let field = generate_height_field(32, 32, &NoiseParams::default());
        for row in 0..field.height() {
            for col in 0..field.width() {
                let v = field.get(col, row);
                assert!((0.0..=1.0).contains(&v), "sample {} out of range", v);
            }
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let params = NoiseParams { seed: 42, ..NoiseParams::default() };
        let a = generate_height_field(16, 16, &params);
        let b = generate_height_field(16, 16, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_height_field(16, 16, &NoiseParams { seed: 1, ..NoiseParams::default() });
        let b = generate_height_field(16, 16, &NoiseParams { seed: 2, ..NoiseParams::default() });
        assert_ne!(a, b);
    }

    #[test]
    fn test_degenerate_dimensions_clamped() {
        let field = generate_height_field(0, 0, &NoiseParams::default());
        assert_eq!(field.width(), 1);
        assert_eq!(field.height(), 1);
    }

    #[test]
    fn test_zero_octaves_yields_flat_field() {
        let params = NoiseParams { octaves: 0, ..NoiseParams::default() };
        let field = generate_height_field(8, 8, &params);
        for row in 0..8 {
            for col in 0..8 {
                assert_eq!(field.get(col, row), 0.0);
            }
        }
    }

    #[test]
    fn test_from_samples_addressing() {
        // (col, row) addressing over a row-major buffer
        let field = HeightField::from_samples(2, 2, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(field.get(0, 0), 0.1);
        assert_eq!(field.get(1, 0), 0.2);
        assert_eq!(field.get(0, 1), 0.3);
        assert_eq!(field.get(1, 1), 0.4);
    }
}
