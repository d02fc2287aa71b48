//! Chunked sample sources
//!
//! A source hands out fixed-length blocks of signed 16-bit samples until it
//! runs dry. A trailing block shorter than one chunk counts as end-of-stream.

use super::AudioError;

/// One fixed-length block of signed amplitude samples
pub type Chunk = Vec<i16>;

/// Producer of fixed-size sample blocks
pub trait SpectrumSource {
    /// Samples per second
    fn sample_rate(&self) -> u32;

    /// Samples per chunk (fixed for the lifetime of the source)
    fn chunk_size(&self) -> usize;

    /// Next full chunk, or `Ok(None)` at end-of-stream
    fn next_chunk(&mut self) -> Result<Option<Chunk>, AudioError>;
}

/// Source over samples already held in memory
pub struct MemorySource {
    samples: Vec<i16>,
    cursor: usize,
    sample_rate: u32,
    chunk_size: usize,
}

impl MemorySource {
    /// Create a source over pre-decoded mono samples
    ///
    /// # Arguments
    /// * `samples` - Mono 16-bit samples
    /// * `sample_rate` - Sample rate in Hz
    /// * `chunk_size` - Samples per chunk (must be non-zero)
    pub fn new(samples: Vec<i16>, sample_rate: u32, chunk_size: usize) -> Result<Self, AudioError> {
        if chunk_size == 0 {
            return Err(AudioError::InvalidFormat("chunk size must be non-zero".into()));
        }
        if sample_rate == 0 {
            return Err(AudioError::InvalidFormat("sample rate must be non-zero".into()));
        }

        Ok(Self {
            samples,
            cursor: 0,
            sample_rate,
            chunk_size,
        })
    }

    /// Number of full chunks left before end-of-stream
    pub fn remaining_chunks(&self) -> usize {
        (self.samples.len() - self.cursor) / self.chunk_size
    }
}

impl SpectrumSource for MemorySource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn next_chunk(&mut self) -> Result<Option<Chunk>, AudioError> {
        let end = self.cursor + self.chunk_size;
        if end > self.samples.len() {
            // Partial tail is dropped
            self.cursor = self.samples.len();
            return Ok(None);
        }

        let chunk = self.samples[self.cursor..end].to_vec();
        self.cursor = end;
        Ok(Some(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_yields_full_chunks() {
        let samples: Vec<i16> = (0..10).collect();
        let mut source = MemorySource::new(samples, 8000, 4).unwrap();

        assert_eq!(source.remaining_chunks(), 2);
        assert_eq!(source.next_chunk().unwrap(), Some(vec![0, 1, 2, 3]));
        assert_eq!(source.next_chunk().unwrap(), Some(vec![4, 5, 6, 7]));

        // [8, 9] is shorter than one chunk
        assert_eq!(source.next_chunk().unwrap(), None);
        assert_eq!(source.next_chunk().unwrap(), None);
    }

    #[test]
    fn test_memory_source_rejects_zero_chunk() {
        assert!(MemorySource::new(vec![0; 16], 8000, 0).is_err());
        assert!(MemorySource::new(vec![0; 16], 0, 4).is_err());
    }
}
