//! Bandviz - Spectral Band Visualizer
//!
//! Turns a stream of audio chunks into raster frames: bar meters, radial
//! meters or a dancing stick figure, one frame per chunk.

pub mod audio;
pub mod bands;
pub mod config;
pub mod display;
pub mod error;
pub mod meter;
pub mod render;
pub mod spectrum;
pub mod visualizer;

pub use bands::{BandLayout, BandRange};
pub use config::VisualizerConfig;
pub use error::VizError;
pub use render::{Frame, RenderStyle, Renderer};
pub use spectrum::SpectrumAnalyzer;
pub use visualizer::{SessionSummary, StopReason, Visualizer};
