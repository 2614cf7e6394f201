//! Core data structures for the sample ring buffer
//!
//! This module provides the building blocks shared by the buffer
//! implementation:
//!
//! - Record structure combining a monotonic id, a caller-supplied
//!   timestamp and the sample value
//! - BufferError for construction-time failures
//! - SpinLock, a minimal critical section that is legal in
//!   interrupt-style contexts
//! - Cache-line padding to prevent false sharing on the lock word
//!
//! Everything here keeps to the constraints of the producer side: the
//! lock is acquired by pure spinning, never by parking the thread, and
//! nothing allocates after construction.

pub mod spsc;

use crossbeam_utils::{Backoff, CachePadded};
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Default buffer capacity (512 samples = ~2 s of headroom at 250 Hz sampling)
pub const DEFAULT_CAPACITY: u16 = 512;

/// Errors that can occur when constructing a buffer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// Requested capacity was zero
    #[error("buffer capacity must be greater than 0")]
    ZeroCapacity,
}

/// A timestamped sample as stored in and returned by the ring buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Record<T> {
    /// Monotonically increasing record id (wraps at `u32::MAX`)
    pub id: u32,
    /// Caller-supplied capture time, monotonic by convention
    pub timestamp: u32,
    /// The sample value
    pub value: T,
}

/// A minimal spinlock serving as the buffer's critical section
///
/// Acquisition never parks the thread, never performs a syscall and
/// never allocates, so the lock may be taken from contexts where
/// blocking is forbidden, such as an interrupt handler. Non-reentrant:
/// taking it twice from the same context deadlocks.
pub(crate) struct SpinLock<S> {
    /// Lock word, cache-line padded to keep it off the state's line
    locked: CachePadded<AtomicBool>,
    /// The guarded state
    state: UnsafeCell<S>,
}

// SAFETY: the lock word serializes all access to `state`, so sharing the
// wrapper between threads is sound whenever the state itself is Send.
unsafe impl<S: Send> Send for SpinLock<S> {}
unsafe impl<S: Send> Sync for SpinLock<S> {}

impl<S> SpinLock<S> {
    /// Create a new unlocked spinlock around the given state
    pub fn new(state: S) -> Self {
        Self {
            locked: CachePadded::new(AtomicBool::new(false)),
            state: UnsafeCell::new(state),
        }
    }

    /// Acquire the lock, spinning until the peer context releases it
    pub fn lock(&self) -> SpinGuard<'_, S> {
        let backoff = Backoff::new();
        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return SpinGuard { lock: self };
            }

            // Wait on a plain load before retrying the exchange. The
            // backoff only issues pause hints, it never yields to the
            // scheduler.
            while self.locked.load(Ordering::Relaxed) {
                backoff.spin();
            }
        }
    }
}

/// RAII guard for a held [`SpinLock`], releasing on drop
pub(crate) struct SpinGuard<'a, S> {
    lock: &'a SpinLock<S>,
}

impl<S> Deref for SpinGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        // SAFETY: the guard proves the lock is held, so no other context
        // can touch the state until this guard drops.
        unsafe { &*self.lock.state.get() }
    }
}

impl<S> DerefMut for SpinGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        // SAFETY: same exclusivity argument as Deref.
        unsafe { &mut *self.lock.state.get() }
    }
}

impl<S> Drop for SpinGuard<'_, S> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
