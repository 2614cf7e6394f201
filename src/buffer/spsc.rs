//! SPSC ring buffer with overwrite-on-full eviction
//!
//! This module implements the single-producer, single-consumer ring buffer
//! that sits between a high-frequency sampling routine and a slower
//! consumer task. Key properties:
//!
//! - Fixed capacity, allocated once at construction
//! - Writes never block and never fail: when the buffer is full the
//!   oldest unread record is evicted and the write reports the loss
//! - Reads drain in FIFO order, one record per call
//! - Every operation runs inside a short spinlock critical section that
//!   covers the index update and the one-record copy, so the producer may
//!   be an interrupt handler
//!
//! Bookkeeping uses head/tail/count indices: `head` is the next slot to
//! write, `tail` the next slot to read, and `count` the number of live
//! records between them. All of them are touched only under the critical
//! section, so no per-field atomics are needed.

use crate::buffer::{BufferError, Record, SpinLock, DEFAULT_CAPACITY};
use std::fmt;

/// Mutable buffer state, wholly owned by the critical section
struct BufferState<T> {
    /// Pre-allocated record storage
    slots: Box<[Record<T>]>,
    /// Next slot to write
    head: u16,
    /// Next slot to read
    tail: u16,
    /// Number of unread records
    count: u16,
    /// Id assigned to the next written record
    next_id: u32,
}

/// Single-producer, single-consumer ring buffer for timestamped samples
///
/// The buffer is shared between exactly one producer context and one
/// consumer context, typically through an `Arc`. More writers or readers
/// stay memory safe (everything runs under one lock) but FIFO hand-off
/// positions between them are unspecified, so that usage is unsupported.
pub struct RingBuffer<T> {
    /// Indices and storage, guarded by the spinlock
    state: SpinLock<BufferState<T>>,
    /// Fixed slot count, immutable after construction
    capacity: u16,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a new ring buffer with the given capacity
    ///
    /// All record slots are allocated up front; nothing allocates after
    /// construction.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of record slots, must be greater than 0
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: u16) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }

        let slots = vec![Record::default(); capacity as usize].into_boxed_slice();

        Ok(Self {
            state: SpinLock::new(BufferState {
                slots,
                head: 0,
                tail: 0,
                count: 0,
                next_id: 0,
            }),
            capacity,
        })
    }

    /// Create a ring buffer with the default capacity (512 records)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY).expect("default capacity is nonzero")
    }

    /// Write one sample into the buffer
    ///
    /// Stores a new record carrying the next monotonic id and the given
    /// timestamp. When the buffer is already full the oldest unread
    /// record is evicted to make room; the write itself always succeeds.
    ///
    /// # Arguments
    ///
    /// * `value` - Sample value to store
    /// * `timestamp` - Caller-supplied capture time for the sample
    ///
    /// # Returns
    ///
    /// `false` if the sample was stored without loss, `true` if the
    /// oldest unread record was evicted to make room
    pub fn write(&self, value: T, timestamp: u32) -> bool {
        let mut state = self.state.lock();

        let slot = state.head as usize;
        let id = state.next_id;
        state.slots[slot] = Record { id, timestamp, value };
        state.next_id = id.wrapping_add(1);
        state.head = (state.head + 1) % self.capacity;

        if state.count < self.capacity {
            state.count += 1;
            return false;
        }

        // Full: head and tail coincide, so the write landed on the oldest
        // unread record. Advance the tail past the loss and report it.
        state.tail = (state.tail + 1) % self.capacity;
        true
    }

    /// Read the oldest unread record out of the buffer
    ///
    /// Records drain in FIFO order, one per call. Returns `None` when the
    /// buffer is empty, an expected transient state for a polling
    /// consumer rather than an error.
    pub fn read(&self) -> Option<Record<T>> {
        let mut state = self.state.lock();

        if state.count == 0 {
            return None;
        }

        let record = state.slots[state.tail as usize];
        state.tail = (state.tail + 1) % self.capacity;
        state.count -= 1;

        Some(record)
    }

    /// Number of unread records currently buffered
    ///
    /// The count is read under the critical section but can be stale by
    /// the time the caller acts on it: the peer context may write or read
    /// right after this returns. Treat the value as a hint, and tolerate
    /// an empty read after a nonzero count.
    pub fn available(&self) -> u16 {
        self.state.lock().count
    }

    /// Get the fixed buffer capacity in records
    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Check whether the buffer holds no unread records
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Check whether the next write will evict the oldest record
    pub fn is_full(&self) -> bool {
        self.available() == self.capacity
    }

    /// Get the current buffer usage as a percentage
    pub fn usage_percent(&self) -> f32 {
        let used = self.state.lock().count as f32;
        (used / self.capacity as f32) * 100.0
    }

    /// Drop all unread records
    ///
    /// The id counter keeps counting from where it was, so record ids
    /// stay unique across a capture restart.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.tail = state.head;
        state.count = 0;
    }
}

// Reports the fixed capacity only. The indices and slots live behind the
// spinlock and formatting must never take it.
impl<T> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_basic_write_read() {
        let buffer = RingBuffer::new(8).unwrap();

        assert!(!buffer.write(42i16, 1000));
        assert_eq!(buffer.available(), 1);

        let record = buffer.read().unwrap();
        assert_eq!(record.value, 42);
        assert_eq!(record.timestamp, 1000);
        assert_eq!(record.id, 0);

        assert_eq!(buffer.available(), 0);
        assert!(buffer.read().is_none());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            RingBuffer::<i16>::new(0).unwrap_err(),
            BufferError::ZeroCapacity
        );
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let buffer = RingBuffer::new(4).unwrap();

        for i in 0..4u32 {
            assert!(!buffer.write(i as i16, i), "write {} should not overflow", i);
        }
        assert!(buffer.is_full());

        // The fifth and sixth writes evict the two oldest records
        assert!(buffer.write(4i16, 4));
        assert!(buffer.write(5i16, 5));
        assert_eq!(buffer.available(), 4);

        let values: Vec<i16> = std::iter::from_fn(|| buffer.read()).map(|r| r.value).collect();
        assert_eq!(values, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_capacity_one_keeps_latest() {
        let buffer = RingBuffer::new(1).unwrap();

        assert!(!buffer.write(7i16, 0));
        assert!(buffer.write(8i16, 1));

        let record = buffer.read().unwrap();
        assert_eq!(record.value, 8);
        assert!(buffer.read().is_none());
    }

    #[test]
    fn test_id_wrapping() {
        let buffer = RingBuffer::new(4).unwrap();

        // Push the id counter to the wrap point
        buffer.state.lock().next_id = u32::MAX;

        buffer.write(1i16, 10);
        buffer.write(2i16, 11);

        assert_eq!(buffer.read().unwrap().id, u32::MAX);
        assert_eq!(buffer.read().unwrap().id, 0);
    }

    #[test]
    fn test_clear_keeps_ids_unique() {
        let buffer = RingBuffer::new(4).unwrap();

        buffer.write(1i16, 0);
        buffer.write(2i16, 1);
        buffer.clear();

        assert!(buffer.is_empty());
        assert!(buffer.read().is_none());

        // Two records were written before the clear, so the next id is 2
        buffer.write(3i16, 2);
        assert_eq!(buffer.read().unwrap().id, 2);
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RingBuffer<i16>>();
    }

    #[test]
    fn test_two_thread_accounting() {
        const SAMPLES: u32 = 20_000;

        let buffer = Arc::new(RingBuffer::new(64).unwrap());
        let barrier = Arc::new(Barrier::new(2));

        let producer = {
            let buffer = buffer.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait(); // Synchronize start

                let mut evicted = 0u32;
                for i in 0..SAMPLES {
                    if buffer.write(i as i16, i) {
                        evicted += 1;
                    }
                }
                evicted
            })
        };

        barrier.wait();

        // Drain concurrently; the producer assigns ids in lockstep with
        // the timestamps, so any torn record shows up as a mismatch
        let mut read = 0u32;
        loop {
            match buffer.read() {
                Some(record) => {
                    assert_eq!(record.id, record.timestamp);
                    assert_eq!(record.value, record.timestamp as i16);
                    read += 1;
                }
                None => {
                    if producer.is_finished() {
                        break;
                    }
                    thread::yield_now();
                }
            }
        }

        // Catch records written between the last empty read and the join
        while let Some(record) = buffer.read() {
            assert_eq!(record.value, record.timestamp as i16);
            read += 1;
        }

        let evicted = producer.join().unwrap();
        assert_eq!(read + evicted, SAMPLES, "every write is read or evicted");
    }
}
