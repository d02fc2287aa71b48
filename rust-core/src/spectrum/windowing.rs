//! Analysis windows applied to a chunk before the transform
//!
//! The default is `Rectangular`, which leaves the chunk untouched.

use serde::Deserialize;
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    Hann,

    /// w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    Hamming,

    /// w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    Blackman,

    /// No windowing
    #[default]
    Rectangular,
}

/// Generate window coefficients w[n] for n = 0..length
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length < 2 {
        return vec![1.0; length];
    }

    let m = length as f64 - 1.0;
    (0..length)
        .map(|n| {
            let angle = 2.0 * PI * n as f64 / m;
            match window_type {
                WindowType::Hann => 0.5 - 0.5 * angle.cos(),
                WindowType::Hamming => 0.54 - 0.46 * angle.cos(),
                WindowType::Blackman => 0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos(),
                WindowType::Rectangular => 1.0,
            }
        })
        .collect()
}

/// Multiply `signal` by precomputed coefficients in place
pub fn apply_window_inplace(signal: &mut [f64], coefficients: &[f64]) {
    for (s, w) in signal.iter_mut().zip(coefficients.iter()) {
        *s *= w;
    }
}
