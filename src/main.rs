mod biome;
mod climate;
mod config;
mod export;
mod heightfield;
mod mesh;
mod render;

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use config::MapConfig;
use export::FileDisplay;
use render::{DrawMode, RenderPayload};

/// Landmass Maker - noise-driven biome maps and terrain meshes
#[derive(Parser)]
#[command(name = "landmass-maker")]
struct Cli {
    /// JSON config file carrying the full parameter set, including the
    /// biome table and height-curve keyframes
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which view to produce
    #[arg(long, value_enum)]
    mode: Option<DrawMode>,

    /// Grid columns
    #[arg(long)]
    width: Option<usize>,

    /// Grid rows
    #[arg(long)]
    height: Option<usize>,

    /// Noise seed
    #[arg(long)]
    seed: Option<u64>,

    /// Noise zoom factor
    #[arg(long)]
    scale: Option<f32>,

    /// Noise octave count
    #[arg(long)]
    octaves: Option<u32>,

    /// Per-octave amplitude falloff
    #[arg(long)]
    persistence: Option<f32>,

    /// Per-octave frequency growth
    #[arg(long)]
    lacunarity: Option<f32>,

    /// Vertical exaggeration of the mesh
    #[arg(long)]
    height_multiplier: Option<f32>,

    /// Output directory for the PNG/GLB files
    #[arg(long, short, default_value = "output")]
    out: PathBuf,
}

impl Cli {
    /// Start from the config file (or defaults) and let flags override
    fn resolve_config(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::load(path)?,
            None => MapConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.draw_mode = mode;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(octaves) = self.octaves {
            config.octaves = octaves;
        }
        if let Some(persistence) = self.persistence {
            config.persistence = persistence;
        }
        if let Some(lacunarity) = self.lacunarity {
            config.lacunarity = lacunarity;
        }
        if let Some(height_multiplier) = self.height_multiplier {
            config.height_multiplier = height_multiplier;
        }
        Ok(config.normalized())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    println!("Landmass Maker");
    if config.infinite {
        eprintln!("Warning: infinite terrain is not supported; generating a single map");
    }

    let table = config.biome_table()?;
    let curve = config.height_curve()?;

    println!(
        "Sampling {}x{} height field (seed {}, {} octaves)...",
        config.width, config.height, config.seed, config.octaves
    );
    let field =
        heightfield::generate_height_field(config.width, config.height, &config.noise_params());

    println!("Producing {:?} payload...", config.draw_mode);
    let output = render::select(
        config.draw_mode,
        &field,
        &table,
        config.height_multiplier,
        &curve,
    );

    if let Some(unclassified) = output.unclassified_cells {
        if unclassified > 0 {
            eprintln!(
                "Warning: {} cells matched no biome entry; check the table's band coverage",
                unclassified
            );
        }
    }

    fs::create_dir_all(&cli.out)?;
    let mut display = FileDisplay::new(&cli.out);
    render::present(&output.payload, &mut display)?;

    match &output.payload {
        RenderPayload::Texture(_) => println!("Wrote texture:"),
        RenderPayload::Mesh { mesh, .. } => println!(
            "Wrote mesh ({} vertices, {} triangles) and texture:",
            mesh.vertices.len(),
            mesh.triangles.len() / 3
        ),
    }
    for path in display.written() {
        println!("  {}", path.display());
    }

    Ok(())
}
