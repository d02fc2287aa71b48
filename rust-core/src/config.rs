//! Session configuration
//!
//! Defaults first, then an optional TOML file, then command-line overrides
//! (applied by the binary). `validate` runs once before the pipeline is
//! built.

use crate::render::figure::{FIGURE_HEIGHT, FIGURE_WIDTH};
use crate::render::{radial, RenderStyle};
use crate::spectrum::WindowType;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest radial bar accepted, in pixels
pub const MAX_RADIAL_LIMIT: f64 = 1024.0;

/// Thighs past horizontal would point back above the hip
pub const MAX_LEG_LIMIT: f64 = 90.0;

/// Largest frame side after zoom, for every style
pub const MAX_FRAME_SIDE: usize = 8192;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown render style '{0}' (expected bars, radial or figure)")]
    UnknownStyle(String),

    #[error("At least one band frequency is required")]
    NoBands,

    #[error("Band frequency {0} Hz is not a non-negative finite number")]
    InvalidFrequency(f64),

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be at most {max} (got {value})")]
    TooLarge {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error("{limb} band index {index} is out of range for {band_count} bands")]
    LimbBandOutOfRange {
        limb: &'static str,
        index: usize,
        band_count: usize,
    },

    #[error("Display width {width} is too narrow for {band_count} bands")]
    TooManyBands { width: usize, band_count: usize },

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Band index driving each articulated limb of the figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LimbBands {
    pub left_arm: usize,
    pub right_arm: usize,
    pub left_leg: usize,
    pub right_leg: usize,
}

impl Default for LimbBands {
    fn default() -> Self {
        Self {
            left_arm: 5,
            right_arm: 6,
            left_leg: 0,
            right_leg: 1,
        }
    }
}

impl LimbBands {
    /// Ensure every index names an existing band
    pub fn check(&self, band_count: usize) -> Result<(), ConfigError> {
        for (limb, index) in [
            ("left arm", self.left_arm),
            ("right arm", self.right_arm),
            ("left leg", self.left_leg),
            ("right leg", self.right_leg),
        ] {
            if index >= band_count {
                return Err(ConfigError::LimbBandOutOfRange {
                    limb,
                    index,
                    band_count,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerConfig {
    pub style: RenderStyle,
    /// Target frequencies in Hz
    pub frequencies: Vec<f64>,
    pub sensitivity: f64,
    pub display_width: usize,
    pub display_height: usize,
    /// Integer upscaling applied to every frame before display
    pub zoom: u32,
    pub chunk_size: usize,
    /// Assumed rate until a source reports its own
    pub sample_rate: u32,
    /// Longest radial bar in pixels
    pub radial_limit: f64,
    /// Forearm angle range in degrees
    pub arm_limit: f64,
    /// Thigh angle range in degrees
    pub leg_limit: f64,
    pub limb_bands: LimbBands,
    pub window: WindowType,
    /// Fixed jitter seed for reproducible figure output
    pub seed: Option<u64>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            style: RenderStyle::Bars,
            frequencies: vec![50.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2000.0],
            sensitivity: 1.0,
            display_width: 200,
            display_height: 80,
            zoom: 3,
            chunk_size: 4096,
            sample_rate: 44100,
            radial_limit: 70.0,
            arm_limit: 180.0,
            leg_limit: 80.0,
            limb_bands: LimbBands::default(),
            window: WindowType::Rectangular,
            seed: None,
        }
    }
}

impl VisualizerConfig {
    /// Defaults overlaid with a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_file(read_toml(path.as_ref())?)?;
        Ok(config)
    }

    fn apply_file(&mut self, fc: FileConfig) -> Result<(), ConfigError> {
        if let Some(v) = fc.style {
            self.style = v.parse()?;
        }
        if let Some(v) = fc.frequencies {
            self.frequencies = v;
        }
        if let Some(v) = fc.sensitivity {
            self.sensitivity = v;
        }
        if let Some(v) = fc.display_width {
            self.display_width = v;
        }
        if let Some(v) = fc.display_height {
            self.display_height = v;
        }
        if let Some(v) = fc.zoom {
            self.zoom = v;
        }
        if let Some(v) = fc.chunk_size {
            self.chunk_size = v;
        }
        if let Some(v) = fc.sample_rate {
            self.sample_rate = v;
        }
        if let Some(v) = fc.radial_limit {
            self.radial_limit = v;
        }
        if let Some(v) = fc.arm_limit {
            self.arm_limit = v;
        }
        if let Some(v) = fc.leg_limit {
            self.leg_limit = v;
        }
        if let Some(v) = fc.limb_bands {
            self.limb_bands = v;
        }
        if let Some(v) = fc.window {
            self.window = v;
        }
        if fc.seed.is_some() {
            self.seed = fc.seed;
        }
        Ok(())
    }

    /// Number of band ranges the frequency list produces
    pub fn band_count(&self) -> usize {
        self.frequencies.len() + 1
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequencies.is_empty() {
            return Err(ConfigError::NoBands);
        }
        if let Some(&f) = self.frequencies.iter().find(|f| !f.is_finite() || **f < 0.0) {
            return Err(ConfigError::InvalidFrequency(f));
        }

        for (field, value) in [
            ("sensitivity", self.sensitivity),
            ("display_width", self.display_width as f64),
            ("display_height", self.display_height as f64),
            ("zoom", self.zoom as f64),
            ("chunk_size", self.chunk_size as f64),
            ("sample_rate", self.sample_rate as f64),
            ("radial_limit", self.radial_limit),
            ("arm_limit", self.arm_limit),
            ("leg_limit", self.leg_limit),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        for (field, value, max) in [
            ("radial_limit", self.radial_limit, MAX_RADIAL_LIMIT),
            ("leg_limit", self.leg_limit, MAX_LEG_LIMIT),
        ] {
            if value > max {
                return Err(ConfigError::TooLarge { field, value, max });
            }
        }

        for (field, side) in [
            ("display_width", self.display_width),
            ("display_height", self.display_height),
            ("radial canvas", radial::canvas_side(self.radial_limit)),
            ("figure canvas", FIGURE_HEIGHT.max(FIGURE_WIDTH)),
        ] {
            let zoomed = side.checked_mul(self.zoom as usize).unwrap_or(usize::MAX);
            if zoomed > MAX_FRAME_SIDE {
                return Err(ConfigError::TooLarge {
                    field,
                    value: zoomed as f64,
                    max: MAX_FRAME_SIDE as f64,
                });
            }
        }

        if self.display_width < self.band_count() {
            return Err(ConfigError::TooManyBands {
                width: self.display_width,
                band_count: self.band_count(),
            });
        }

        if self.style == RenderStyle::Figure {
            self.limb_bands.check(self.band_count())?;
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    style: Option<String>,
    frequencies: Option<Vec<f64>>,
    sensitivity: Option<f64>,
    display_width: Option<usize>,
    display_height: Option<usize>,
    zoom: Option<u32>,
    chunk_size: Option<usize>,
    sample_rate: Option<u32>,
    radial_limit: Option<f64>,
    arm_limit: Option<f64>,
    leg_limit: Option<f64>,
    limb_bands: Option<LimbBands>,
    window: Option<WindowType>,
    seed: Option<u64>,
}

fn read_toml(path: &Path) -> Result<FileConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml(&s).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_toml(s: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str::<FileConfig>(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VisualizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.band_count(), 8);
    }

    #[test]
    fn test_file_overrides_only_given_keys() {
        let fc = parse_toml(
            r#"
            style = "figure"
            frequencies = [60.0, 120.0, 240.0, 480.0, 960.0]
            sensitivity = 2.5
            window = "hann"

            [limb_bands]
            left_arm = 1
            right_arm = 2
            left_leg = 3
            right_leg = 4
            "#,
        )
        .unwrap();

        let mut config = VisualizerConfig::default();
        config.apply_file(fc).unwrap();

        assert_eq!(config.style, RenderStyle::Figure);
        assert_eq!(config.frequencies.len(), 5);
        assert_eq!(config.sensitivity, 2.5);
        assert_eq!(config.window, WindowType::Hann);
        assert_eq!(config.limb_bands.right_leg, 4);
        assert_eq!(config.display_height, 80);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_style_in_file_is_fatal() {
        let fc = parse_toml(r#"style = "spiral""#).unwrap();
        let mut config = VisualizerConfig::default();
        assert!(matches!(
            config.apply_file(fc),
            Err(ConfigError::UnknownStyle(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_toml("colour = 3").is_err());
    }

    #[test]
    fn test_validation_failures() {
        let bad = VisualizerConfig {
            frequencies: vec![],
            ..VisualizerConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::NoBands)));

        let bad = VisualizerConfig {
            zoom: 0,
            ..VisualizerConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::NotPositive { field: "zoom", .. })
        ));

        let bad = VisualizerConfig {
            frequencies: vec![100.0, -3.0],
            ..VisualizerConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidFrequency(_))));

        let bad = VisualizerConfig {
            frequencies: vec![100.0, f64::NAN],
            ..VisualizerConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidFrequency(_))));

        let bad = VisualizerConfig {
            display_width: 4,
            ..VisualizerConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::TooManyBands { .. })));

        let bad = VisualizerConfig {
            style: RenderStyle::Figure,
            frequencies: vec![100.0, 200.0],
            ..VisualizerConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::LimbBandOutOfRange { limb: "left arm", .. })
        ));
    }

    #[test]
    fn test_zero_hz_band_is_accepted() {
        let config = VisualizerConfig {
            frequencies: vec![0.0, 100.0, 250.0],
            ..VisualizerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_oversized_radial_limit_rejected() {
        for radial_limit in [1e20, 1e6, MAX_RADIAL_LIMIT + 1.0] {
            let bad = VisualizerConfig {
                radial_limit,
                ..VisualizerConfig::default()
            };
            assert!(matches!(
                bad.validate(),
                Err(ConfigError::TooLarge { field: "radial_limit", .. })
            ));
        }

        // Within the bar bound but too large once zoomed
        let bad = VisualizerConfig {
            radial_limit: MAX_RADIAL_LIMIT,
            zoom: 8,
            ..VisualizerConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::TooLarge { field: "radial canvas", .. })
        ));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let bad = VisualizerConfig {
            display_width: 5000,
            zoom: 2,
            ..VisualizerConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::TooLarge { field: "display_width", .. })
        ));

        let bad = VisualizerConfig {
            display_height: usize::MAX,
            ..VisualizerConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::TooLarge { field: "display_height", .. })
        ));

        let bad = VisualizerConfig {
            zoom: u32::MAX,
            ..VisualizerConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_leg_limit_capped_at_horizontal() {
        let ok = VisualizerConfig {
            leg_limit: MAX_LEG_LIMIT,
            ..VisualizerConfig::default()
        };
        assert!(ok.validate().is_ok());

        let bad = VisualizerConfig {
            leg_limit: 120.0,
            ..VisualizerConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::TooLarge { field: "leg_limit", .. })
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        assert!(matches!(
            VisualizerConfig::from_file("/nonexistent/bandviz.toml"),
            Err(ConfigError::Read { .. })
        ));
    }
}
