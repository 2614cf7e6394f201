//! Basic usage example for the sensor ring buffer
//!
//! This example demonstrates:
//! 1. Initializing the global sample buffer
//! 2. Writing samples from a producer thread, the way an interrupt-driven
//!    sampling routine would
//! 3. Draining records from the main thread on a slower cadence
//!
//! The producer writes a fixed number of synthetic samples with tick
//! timestamps, the consumer polls and drains in bursts, and the run ends
//! with an accounting summary: every sample was either read or evicted.

use sensor_ring_buffer::{available, init_sample_buffer, read, write};

use std::thread;
use std::time::Duration;

const TOTAL_SAMPLES: u32 = 10_000;

fn main() {
    // Initialize the global buffer
    // We specify the number of record slots, not raw bytes
    let buffer = init_sample_buffer(512);
    println!("Sample buffer ready, capacity {} records", buffer.capacity());

    // Producer: one synthetic ADC reading per tick
    let producer = thread::spawn(move || {
        let mut evicted = 0u32;

        for i in 0..TOTAL_SAMPLES {
            // Sawtooth sweep as the sample value
            let value = ((i % 2000) as i32 - 1000) as i16;

            if write(value, i) {
                evicted += 1;
            }

            // Pause now and then to let the consumer catch up a little
            if i % 256 == 0 {
                thread::sleep(Duration::from_millis(1));
            }
        }

        evicted
    });

    // Consumer: drain in bursts on a slower cadence
    let mut read_count = 0u32;
    while !producer.is_finished() {
        while let Some(record) = read() {
            read_count += 1;
            if read_count % 2500 == 0 {
                println!(
                    "  drained id={} timestamp={} value={}",
                    record.id, record.timestamp, record.value
                );
            }
        }
        thread::sleep(Duration::from_millis(2));
    }

    // The producer has stopped, so the leftover count only moves under
    // our own reads. Snapshot it, then drain it.
    let leftover = available();
    let mut drained_after = 0u32;
    while read().is_some() {
        drained_after += 1;
    }

    let evicted = producer.join().unwrap();

    println!("Producer wrote {} samples:", TOTAL_SAMPLES);
    println!("  - Read: {}", read_count + drained_after);
    println!("  - Evicted on overflow: {}", evicted);
    println!("  - Left when producer stopped: {}", leftover);

    assert_eq!(drained_after, leftover as u32);
    assert_eq!(read_count + drained_after + evicted, TOTAL_SAMPLES);
    println!("Example completed successfully");
}
