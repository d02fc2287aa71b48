//! Chunk to magnitude spectrum
//!
//! Magnitudes are divided by 128·N, so a full-scale 16-bit sinusoid peaks
//! at roughly 128 regardless of chunk size.

use super::fft::FftEngine;
use super::windowing::{apply_window_inplace, generate_window, WindowType};

/// Fixed normalization divisor applied per sample of the chunk
pub const MAGNITUDE_SCALE: f64 = 128.0;

/// Spectrum analyzer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Chunk length N (the FFT size)
    pub chunk_size: usize,

    /// Window applied before the transform
    pub window_type: WindowType,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            window_type: WindowType::Rectangular,
        }
    }
}

/// Converts sample chunks into normalized magnitude spectra
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    fft_engine: FftEngine,
    window: Vec<f64>,
    signal: Vec<f64>,
}

impl SpectrumAnalyzer {
    /// Create new spectrum analyzer
    pub fn new(config: AnalyzerConfig) -> Self {
        let fft_engine = FftEngine::new(config.chunk_size);
        let window = generate_window(config.window_type, config.chunk_size);

        Self {
            signal: Vec::with_capacity(config.chunk_size),
            config,
            fft_engine,
            window,
        }
    }

    /// Analyze one chunk
    ///
    /// # Returns
    /// `chunk_size / 2` non-negative magnitudes
    pub fn analyze(&mut self, chunk: &[i16]) -> Vec<f64> {
        self.signal.clear();
        self.signal.extend(chunk.iter().map(|&s| s as f64));
        if self.config.window_type != WindowType::Rectangular {
            apply_window_inplace(&mut self.signal, &self.window);
        }

        let scale = MAGNITUDE_SCALE * self.config.chunk_size as f64;
        let mut spectrum = self.fft_engine.compute_magnitude(&self.signal);
        for s in spectrum.iter_mut() {
            *s /= scale;
        }

        spectrum
    }

    /// Update configuration, replanning only if the chunk size changed
    pub fn update_config(&mut self, config: AnalyzerConfig) {
        if config.chunk_size != self.config.chunk_size {
            self.fft_engine = FftEngine::new(config.chunk_size);
        }
        self.window = generate_window(config.window_type, config.chunk_size);
        self.config = config;
    }

    /// Get current configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Length of the spectra this analyzer produces
    pub fn num_bins(&self) -> usize {
        self.fft_engine.num_bins()
    }
}
