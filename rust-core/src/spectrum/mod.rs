//! Magnitude spectrum of a sample chunk

pub mod analysis;
pub mod fft;
pub mod windowing;

pub use analysis::{AnalyzerConfig, SpectrumAnalyzer};
pub use fft::FftEngine;
pub use windowing::WindowType;
