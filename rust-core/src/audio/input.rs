//! Live capture from the default input device using cpal
//!
//! The cpal callback converts the first channel to 16-bit samples and
//! pushes them into a ring buffer; `next_chunk` blocks until one chunk
//! worth of audio has arrived.

use super::buffer::{SampleConsumer, SampleProducer, SampleRingBuffer};
use super::source::{Chunk, SpectrumSource};
use super::AudioError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use log::{error, info};
use std::time::Duration;

/// Chunks of headroom kept in the ring buffer
const BUFFERED_CHUNKS: usize = 8;

/// How long a silent device may stall before the session ends
const STALL_TIMEOUT: Duration = Duration::from_secs(2);

/// Audio input device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Microphone / line-in source
pub struct LiveSource {
    // Kept alive for the duration of the capture
    _stream: Stream,
    consumer: SampleConsumer,
    device_info: AudioDeviceInfo,
    chunk_size: usize,
}

impl LiveSource {
    /// Open the default input device and start capturing
    ///
    /// # Arguments
    /// * `chunk_size` - Samples per chunk handed to the pipeline
    pub fn from_default_device(chunk_size: usize) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, chunk_size)
    }

    /// Open a specific input device and start capturing
    pub fn from_device(device: Device, chunk_size: usize) -> Result<Self, AudioError> {
        if chunk_size == 0 {
            return Err(AudioError::InvalidFormat("chunk size must be non-zero".into()));
        }

        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

        let device_info = AudioDeviceInfo {
            name,
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        };

        let (producer, consumer) = SampleRingBuffer::new(chunk_size * BUFFERED_CHUNKS).split();
        let sample_format = config.sample_format();
        let stream_config: StreamConfig = config.into();
        let stream = build_stream(&device, &stream_config, sample_format, producer, chunk_size)?;

        stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))?;

        info!(
            "capturing from '{}' at {} Hz ({} channel(s))",
            device_info.name, device_info.sample_rate, device_info.channels
        );

        Ok(Self {
            _stream: stream,
            consumer,
            device_info,
            chunk_size,
        })
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

impl SpectrumSource for LiveSource {
    fn sample_rate(&self) -> u32 {
        self.device_info.sample_rate
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn next_chunk(&mut self) -> Result<Option<Chunk>, AudioError> {
        let mut chunk = vec![0; self.chunk_size];
        if self.consumer.read_exact(&mut chunk, STALL_TIMEOUT) {
            Ok(Some(chunk))
        } else {
            Err(AudioError::Stalled(STALL_TIMEOUT.as_millis() as u64))
        }
    }
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    producer: SampleProducer,
    chunk_size: usize,
) -> Result<Stream, AudioError> {
    let mut downmixer = Downmixer::new(producer, config.channels as usize, chunk_size);
    let on_error = |err: cpal::StreamError| error!("audio input error: {}", err);

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                downmixer.push(data, f32_to_i16);
            },
            on_error,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                downmixer.push(data, |sample| sample);
            },
            on_error,
            None,
        ),
        other => {
            return Err(AudioError::InvalidFormat(format!(
                "unsupported device sample format {:?}",
                other
            )))
        }
    };

    stream.map_err(|e| AudioError::BuildStream(e.to_string()))
}

/// Forwards the first channel of interleaved callback buffers
///
/// The scratch buffer lives as long as the stream, so the callback only
/// allocates if the device hands over a larger buffer than seen before.
struct Downmixer {
    producer: SampleProducer,
    channels: usize,
    scratch: Vec<i16>,
}

impl Downmixer {
    fn new(producer: SampleProducer, channels: usize, capacity: usize) -> Self {
        Self {
            producer,
            channels: channels.max(1),
            scratch: Vec::with_capacity(capacity),
        }
    }

    /// Convert and queue one callback buffer, returning the samples queued
    fn push<T: Copy>(&mut self, data: &[T], convert: impl Fn(T) -> i16) -> usize {
        self.scratch.clear();
        self.scratch
            .extend(data.chunks(self.channels).map(|frame| convert(frame[0])));
        self.producer.write(&self.scratch)
    }
}

/// Convert a normalized float sample to 16-bit amplitude
pub(crate) fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_to_i16_full_scale() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(-1.0), -i16::MAX);

        // Out-of-range input saturates
        assert_eq!(f32_to_i16(3.5), i16::MAX);
    }

    #[test]
    fn test_downmixer_keeps_first_channel() {
        let (producer, mut consumer) = SampleRingBuffer::new(64).split();
        let mut downmixer = Downmixer::new(producer, 2, 8);

        assert_eq!(downmixer.push(&[1i16, -1, 2, -2, 3, -3], |s| s), 3);
        assert_eq!(downmixer.push(&[0.0f32, 0.9, 1.0, 0.9], f32_to_i16), 2);

        let mut out = vec![0; 5];
        assert!(consumer.read_exact(&mut out, Duration::from_millis(10)));
        assert_eq!(out, vec![1, 2, 3, 0, i16::MAX]);
    }

    #[test]
    fn test_downmixer_reuses_scratch() {
        let (producer, _consumer) = SampleRingBuffer::new(1024).split();
        let mut downmixer = Downmixer::new(producer, 1, 16);
        let scratch = downmixer.scratch.as_ptr();

        for _ in 0..4 {
            downmixer.push(&[5i16; 16], |s| s);
        }
        assert_eq!(downmixer.scratch.as_ptr(), scratch);
    }

    #[test]
    fn test_default_device_probe() {
        // Just ensure it doesn't crash on machines without audio hardware
        let _ = LiveSource::from_default_device(1024);
    }
}
