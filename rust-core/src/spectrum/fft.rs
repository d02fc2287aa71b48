//! FFT engine using realfft for real-valued signals
//!
//! Plans once per chunk size and reuses its buffers across calls.

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// FFT engine for real-valued signals
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer
    input_buffer: Vec<f64>,

    /// Reusable output buffer (complex spectrum)
    output_buffer: Vec<Complex<f64>>,

    /// Reusable scratch space for the transform
    scratch: Vec<Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples, non-zero)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();
        let scratch = r2c.make_scratch_vec();

        Self {
            fft_size,
            r2c,
            input_buffer,
            output_buffer,
            scratch,
        }
    }

    /// Compute |X[k]| for k = 0..fft_size/2
    ///
    /// The Nyquist bin is left out so the result has exactly `fft_size / 2`
    /// entries, the half of a real signal's spectrum that carries meaning.
    ///
    /// # Arguments
    /// * `signal` - Input signal (zero-padded or truncated to fft_size)
    pub fn compute_magnitude(&mut self, signal: &[f64]) -> Vec<f64> {
        let copy_len = signal.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&signal[..copy_len]);
        self.input_buffer[copy_len..].fill(0.0);

        // Buffer lengths come from the plan itself, so the transform cannot
        // reject them; fall back to silence rather than panicking.
        if self
            .r2c
            .process_with_scratch(&mut self.input_buffer, &mut self.output_buffer, &mut self.scratch)
            .is_err()
        {
            return vec![0.0; self.num_bins()];
        }

        self.output_buffer
            .iter()
            .take(self.num_bins())
            .map(|c| c.norm())
            .collect()
    }

    /// Get FFT size
    /// Number of meaningful bins (fft_size / 2)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2
    }
}
