//! Bandviz - render audio as spectral band frames
//!
//! Reads a WAV file (or the default microphone) chunk by chunk and writes
//! one PNG per chunk.

use anyhow::{Context, Result};
use bandviz::audio::{LiveSource, SpectrumSource, WavSource};
use bandviz::config::VisualizerConfig;
use bandviz::display::PngSequenceSink;
use bandviz::spectrum::WindowType;
use bandviz::{RenderStyle, StopReason, Visualizer};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "bandviz")]
#[command(about = "Render audio frequency bands as image frames", long_about = None)]
struct Args {
    /// TOML file with defaults for any of the options below
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// WAV file to visualize (default: live microphone)
    #[arg(long, value_name = "WAV")]
    input: Option<PathBuf>,

    /// Render style: bars, radial, figure
    #[arg(long, value_name = "STYLE")]
    style: Option<String>,

    /// Comma-separated band frequencies in Hz
    #[arg(long, value_name = "HZ,HZ,...", value_delimiter = ',')]
    bands: Option<Vec<f64>>,

    /// Meter gain before compression
    #[arg(long)]
    sensitivity: Option<f64>,

    /// Bar meter width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Bar meter height in pixels
    #[arg(long)]
    height: Option<usize>,

    /// Integer upscaling factor
    #[arg(long)]
    zoom: Option<u32>,

    /// Samples per analyzed chunk
    #[arg(long, value_name = "SAMPLES")]
    chunk_size: Option<usize>,

    /// Analysis window
    #[arg(long, value_enum)]
    window: Option<WindowType>,

    /// Fixed seed for the figure's jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Directory receiving the PNG frames
    #[arg(long, value_name = "DIR", default_value = "frames")]
    output_dir: PathBuf,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    max_frames: Option<usize>,
}

impl Args {
    /// Layer command-line overrides on top of defaults or a config file
    fn build_config(&self) -> Result<VisualizerConfig> {
        let mut config = match &self.config {
            Some(path) => VisualizerConfig::from_file(path)?,
            None => VisualizerConfig::default(),
        };

        if let Some(style) = &self.style {
            config.style = style.parse::<RenderStyle>()?;
        }
        if let Some(bands) = &self.bands {
            config.frequencies = bands.clone();
        }
        if let Some(v) = self.sensitivity {
            config.sensitivity = v;
        }
        if let Some(v) = self.width {
            config.display_width = v;
        }
        if let Some(v) = self.height {
            config.display_height = v;
        }
        if let Some(v) = self.zoom {
            config.zoom = v;
        }
        if let Some(v) = self.chunk_size {
            config.chunk_size = v;
        }
        if let Some(v) = self.window {
            config.window = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }

    fn open_source(&self, chunk_size: usize) -> Result<Box<dyn SpectrumSource>> {
        let source: Box<dyn SpectrumSource> = match &self.input {
            Some(path) => Box::new(
                WavSource::open(path, chunk_size)
                    .with_context(|| format!("failed to open {}", path.display()))?,
            ),
            None => Box::new(
                LiveSource::from_default_device(chunk_size).context("failed to start audio capture")?,
            ),
        };
        Ok(source)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.build_config()?;
    let chunk_size = config.chunk_size;

    let mut visualizer = Visualizer::new(config).context("invalid configuration")?;
    let mut source = args.open_source(chunk_size)?;
    let mut sink = PngSequenceSink::new(&args.output_dir, args.max_frames)?;

    let summary = visualizer.run(source.as_mut(), &mut sink)?;
    info!(
        "{} frame(s) written to {}",
        summary.frames,
        args.output_dir.display()
    );

    if let StopReason::SourceFailed(reason) = summary.reason {
        anyhow::bail!("audio source failed: {}", reason);
    }

    Ok(())
}
