//! Band magnitudes to raster frames
//!
//! Each style implements `Renderer`; the style is chosen once, when the
//! pipeline is configured, and the boxed renderer is reused every frame.

pub mod bars;
pub mod canvas;
pub mod figure;
pub mod radial;

pub use bars::BarsRenderer;
pub use canvas::{Canvas, Frame};
pub use figure::{FigureRenderer, Pose};
pub use radial::RadialRenderer;

use crate::config::{ConfigError, VisualizerConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::str::FromStr;

/// Visual style, fixed at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    /// Flat bottom-anchored bar meter
    #[default]
    Bars,
    /// Bars fanned around the canvas center
    RadialBars,
    /// Stick figure whose limbs follow the bands
    Figure,
}

impl FromStr for RenderStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bars" | "1" => Ok(RenderStyle::Bars),
            "radial" | "radial-bars" | "2" => Ok(RenderStyle::RadialBars),
            "figure" | "3" => Ok(RenderStyle::Figure),
            other => Err(ConfigError::UnknownStyle(other.to_string())),
        }
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStyle::Bars => "bars",
            RenderStyle::RadialBars => "radial",
            RenderStyle::Figure => "figure",
        };
        f.write_str(name)
    }
}

/// A visual style
pub trait Renderer {
    /// Draw one frame from per-band peak magnitudes
    ///
    /// `magnitudes` holds one entry per band range, already floored at the
    /// silence magnitude. The frame is at native resolution; zooming is
    /// left to the caller.
    fn render(&mut self, magnitudes: &[f64]) -> Frame;

    fn style(&self) -> RenderStyle;
}

/// Build the renderer for `config.style`
///
/// # Arguments
/// * `config` - Validated configuration
/// * `band_count` - Number of band ranges the renderer will be fed
pub fn build_renderer(config: &VisualizerConfig, band_count: usize) -> Result<Box<dyn Renderer>, ConfigError> {
    let renderer: Box<dyn Renderer> = match config.style {
        RenderStyle::Bars => Box::new(BarsRenderer::new(
            config.display_width,
            config.display_height,
            config.sensitivity,
        )),
        RenderStyle::RadialBars => Box::new(RadialRenderer::new(config.radial_limit, config.sensitivity)),
        RenderStyle::Figure => {
            config.limb_bands.check(band_count)?;
            let rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            Box::new(FigureRenderer::new(
                config.limb_bands,
                config.arm_limit,
                config.leg_limit,
                config.sensitivity,
                rng,
            ))
        }
    };

    Ok(renderer)
}
