//! Lock-free ring buffer for IQ samples
//!
//! Hands complex samples from an acquisition thread to the processing side

use num_complex::Complex64;
use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use tracing::warn;

/// Single-producer, single-consumer IQ ring buffer
pub struct IqRingBuffer {
    producer: HeapProducer<Complex64>,
    consumer: HeapConsumer<Complex64>,
    capacity: usize,
}

impl IqRingBuffer {
    /// Create new ring buffer with given capacity
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity in samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<Complex64>::new(capacity);
        let (producer, consumer) = rb.split();

        Self {
            producer,
            consumer,
            capacity,
        }
    }

    /// Split into producer and consumer ends
    pub fn split(self) -> (IqProducer, IqConsumer) {
        (
            IqProducer {
                producer: self.producer,
                capacity: self.capacity,
                dropped: 0,
            },
            IqConsumer {
                consumer: self.consumer,
                capacity: self.capacity,
            },
        )
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Producer end (acquisition side)
pub struct IqProducer {
    producer: HeapProducer<Complex64>,
    capacity: usize,
    dropped: u64,
}

impl IqProducer {
    /// Write samples to buffer
    ///
    /// # Returns
    /// Number of samples actually written; the rest are dropped and counted
    pub fn write(&mut self, samples: &[Complex64]) -> usize {
        let written = self.producer.push_slice(samples);
        if written < samples.len() {
            let lost = samples.len() - written;
            self.dropped += lost as u64;
            warn!(lost, total_dropped = self.dropped, "IQ ring buffer full, dropping samples");
        }
        written
    }

    /// Total samples dropped because the buffer was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Get number of free slots
    pub fn free_len(&self) -> usize {
        self.producer.free_len()
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Consumer end (processing side)
pub struct IqConsumer {
    consumer: HeapConsumer<Complex64>,
    capacity: usize,
}

impl IqConsumer {
    /// Read up to `buffer.len()` samples
    ///
    /// # Returns
    /// Number of samples actually read
    pub fn read(&mut self, buffer: &mut [Complex64]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Take exactly `len` samples, or nothing if fewer are available
    pub fn read_block(&mut self, len: usize) -> Option<Vec<Complex64>> {
        if len == 0 || self.consumer.len() < len {
            return None;
        }
        let mut block = vec![Complex64::new(0.0, 0.0); len];
        let read = self.consumer.pop_slice(&mut block);
        debug_assert_eq!(read, len);
        Some(block)
    }

    /// Check if buffer has n samples available
    pub fn has_data(&self, n: usize) -> bool {
        self.consumer.len() >= n
    }

    /// Get number of available samples
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
