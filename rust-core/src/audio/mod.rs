//! Audio acquisition: chunked sample sources
//!
//! Live capture goes through cpal and a ring buffer, files are decoded up
//! front with hound.

pub mod buffer;
pub mod file;
pub mod input;
pub mod source;

pub use buffer::SampleRingBuffer;
pub use file::WavSource;
pub use input::LiveSource;
pub use source::{Chunk, MemorySource, SpectrumSource};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio input device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to get default config: {0}")]
    DefaultConfig(String),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Input stream delivered no samples for {0} ms")]
    Stalled(u64),

    #[error("Failed to decode audio file: {0}")]
    Decode(#[from] hound::Error),

    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),
}
