//! Crate-level error

use crate::audio::AudioError;
use crate::config::ConfigError;
use crate::display::SinkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VizError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Audio source error: {0}")]
    Audio(#[from] AudioError),

    #[error("Display error: {0}")]
    Sink(#[from] SinkError),
}
