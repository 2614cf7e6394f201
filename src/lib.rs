//! Sensor Ring Buffer - a single-producer, single-consumer ring buffer
//! for timestamped sensor samples with overwrite-on-full eviction.
//!
//! # Overview
//!
//! The crate decouples a high-frequency sampling routine, typically an
//! interrupt handler, from a slower consumer task such as logging or
//! transmission:
//!
//! 1. The producer calls [`RingBuffer::write`] for each new sample; the
//!    call is bounded, never blocks and never fails. When the buffer is
//!    full the oldest unread record is evicted and the write reports it.
//! 2. The consumer polls [`RingBuffer::available`] and drains records
//!    with [`RingBuffer::read`] in FIFO order on its own cadence.
//!
//! # Key Features
//!
//! - Fixed capacity, allocated once at construction
//! - Overwrite-on-full: the producer always has a slot to write into
//! - Spinlock critical sections that are legal in interrupt-style
//!   contexts (no parking, no allocation, bounded duration)
//! - Monotonic record ids for detecting loss and ordering records
//! - A process-wide default buffer with free functions for deployments
//!   where exactly one buffer sits between one sampling routine and one
//!   consumer task
//!
//! # Usage
//!
//! The library is typically used by:
//! 1. Initializing the global sample buffer (or constructing `RingBuffer`
//!    values directly for multi-buffer setups)
//! 2. Writing samples from the producer context
//! 3. Polling `available` and reading from the consumer context
//!
//! See the `demos` directory for a complete producer/consumer example.

#![deny(missing_docs)]

mod buffer;

pub use buffer::spsc::RingBuffer;
pub use buffer::{BufferError, Record, DEFAULT_CAPACITY};

use once_cell::sync::OnceCell;
use std::sync::Arc;

/// The canonical sample value, a signed 16-bit ADC reading
pub type Sample = i16;

/// Global instance of the sample buffer shared by producer and consumer
static SAMPLE_BUFFER: OnceCell<Arc<RingBuffer<Sample>>> = OnceCell::new();

/// Initialize the global sample buffer with a custom capacity
///
/// # Arguments
///
/// * `capacity` - Number of record slots, must be greater than 0
///
/// # Panics
///
/// Panics if `capacity` is 0.
pub fn init_sample_buffer(capacity: u16) -> Arc<RingBuffer<Sample>> {
    let buffer = match RingBuffer::new(capacity) {
        Ok(buffer) => Arc::new(buffer),
        Err(e) => panic!("Failed to create sample buffer: {:?}", e),
    };

    // The OnceCell cannot be replaced, so the first initialization wins
    // for all subsequent calls to get_sample_buffer
    SAMPLE_BUFFER.get_or_init(|| buffer.clone());

    buffer
}

/// Get a reference to the global sample buffer
pub fn get_sample_buffer() -> Arc<RingBuffer<Sample>> {
    SAMPLE_BUFFER
        .get_or_init(|| {
            // Default 512 slots (about 5 KiB of records)
            Arc::new(RingBuffer::with_default_capacity())
        })
        .clone()
}

/// Write a sample to the global buffer
///
/// # Arguments
///
/// * `value` - Sample value to store
/// * `timestamp` - Caller-supplied capture time for the sample
///
/// # Returns
///
/// `false` if the sample was stored without loss, `true` if the oldest
/// unread record was evicted to make room
pub fn write(value: Sample, timestamp: u32) -> bool {
    get_sample_buffer().write(value, timestamp)
}

/// Read the oldest unread record from the global buffer
///
/// Returns `None` when the buffer is empty.
pub fn read() -> Option<Record<Sample>> {
    get_sample_buffer().read()
}

/// Number of unread records in the global buffer
pub fn available() -> u16 {
    get_sample_buffer().available()
}

/// Re-exported data types used in the API
pub mod types {
    pub use crate::buffer::{BufferError, Record};
}
