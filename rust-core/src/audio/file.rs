//! WAV file source
//!
//! The whole file is decoded up front, downmixed to mono and converted to
//! 16-bit samples, so `next_chunk` never blocks.

use super::input::f32_to_i16;
use super::source::{Chunk, MemorySource, SpectrumSource};
use super::AudioError;
use hound::{SampleFormat, WavReader};
use log::info;
use std::io::Read;
use std::path::Path;

/// Pre-decoded audio file
pub struct WavSource {
    inner: MemorySource,
    channels: u16,
}

impl WavSource {
    /// Decode a WAV file
    ///
    /// # Arguments
    /// * `path` - File to open
    /// * `chunk_size` - Samples per chunk
    pub fn open<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self, AudioError> {
        let path = path.as_ref();
        let reader = WavReader::open(path)?;
        let source = Self::from_reader(reader, chunk_size)?;

        info!(
            "using file {} channels={}, samplerate={}, {} chunk(s)",
            path.display(),
            source.channels,
            source.sample_rate(),
            source.inner.remaining_chunks()
        );

        Ok(source)
    }

    /// Decode from an already opened reader
    pub fn from_reader<R: Read>(reader: WavReader<R>, chunk_size: usize) -> Result<Self, AudioError> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(AudioError::InvalidFormat("file has no channels".into()));
        }

        let interleaved: Vec<i16> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(f32_to_i16))
                .collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                let bits = spec.bits_per_sample;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| int_to_i16(v, bits)))
                    .collect::<Result<_, _>>()?
            }
        };

        let samples = downmix(&interleaved, spec.channels as usize);
        let inner = MemorySource::new(samples, spec.sample_rate, chunk_size)?;

        Ok(Self {
            inner,
            channels: spec.channels,
        })
    }

    /// Channel count of the decoded file
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl SpectrumSource for WavSource {
    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn chunk_size(&self) -> usize {
        self.inner.chunk_size()
    }

    fn next_chunk(&mut self) -> Result<Option<Chunk>, AudioError> {
        let chunk = self.inner.next_chunk()?;
        if chunk.is_none() {
            info!("reached end of file");
        }
        Ok(chunk)
    }
}

/// Rescale an integer sample of arbitrary bit depth to 16 bits
fn int_to_i16(sample: i32, bits: u16) -> i16 {
    if bits >= 16 {
        (sample >> (bits - 16)) as i16
    } else {
        (sample << (16 - bits)) as i16
    }
}

/// Average interleaved frames into one mono channel
fn downmix(interleaved: &[i16], channels: usize) -> Vec<i16> {
    if channels == 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}
