//! Lock-free ring buffer for captured samples
//!
//! Carries 16-bit samples from the capture callback thread to the render
//! loop, which drains them one chunk at a time.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while waiting for a chunk to fill
const WAIT_STEP: Duration = Duration::from_millis(2);

/// Sample ring buffer, split into producer and consumer ends before use
pub struct SampleRingBuffer {
    producer: HeapProducer<i16>,
    consumer: HeapConsumer<i16>,
}

impl SampleRingBuffer {
    /// Create new ring buffer with given capacity
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity in samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<i16>::new(capacity);
        let (producer, consumer) = rb.split();

        Self { producer, consumer }
    }

    /// Split into producer and consumer ends
    pub fn split(self) -> (SampleProducer, SampleConsumer) {
        (
            SampleProducer {
                producer: self.producer,
            },
            SampleConsumer {
                consumer: self.consumer,
            },
        )
    }
}

/// Writing end, owned by the capture callback
pub struct SampleProducer {
    producer: HeapProducer<i16>,
}

impl SampleProducer {
    /// Write samples, returning how many fit
    ///
    /// Samples that do not fit are dropped; the render loop is behind and
    /// newer audio will follow.
    pub fn write(&mut self, samples: &[i16]) -> usize {
        self.producer.push_slice(samples)
    }
}

/// Reading end, owned by the live source
pub struct SampleConsumer {
    consumer: HeapConsumer<i16>,
}

impl SampleConsumer {
    /// Fill `buffer` completely, blocking until enough samples arrive
    ///
    /// # Returns
    /// `true` once the buffer is full, `false` if no new sample arrived
    /// within `stall_timeout`
    pub fn read_exact(&mut self, buffer: &mut [i16], stall_timeout: Duration) -> bool {
        let mut total_read = 0;
        let mut last_progress = Instant::now();

        while total_read < buffer.len() {
            let n = self.consumer.pop_slice(&mut buffer[total_read..]);
            total_read += n;

            if n > 0 {
                last_progress = Instant::now();
            } else if last_progress.elapsed() >= stall_timeout {
                return false;
            } else {
                thread::sleep(WAIT_STEP);
            }
        }

        true
    }

    /// Number of samples waiting
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}
