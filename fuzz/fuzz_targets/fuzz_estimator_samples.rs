//! Fuzz testing for the heart-rate estimator
//!
//! Tests that sample admission and analysis handle any input signal,
//! including NaN and infinite values, without panicking.
//!
//! Run with: cargo +nightly fuzz run fuzz_estimator_samples

#![no_main]

use libfuzzer_sys::fuzz_target;
use vital_monitor::vitals::heart_rate::HeartRateEstimator;

fuzz_target!(|data: &[u8]| {
    // Each sample is 10 bytes: 8 for the value, 2 for the timestamp delta
    if data.len() < 10 {
        return;
    }

    let mut estimator = HeartRateEstimator::new();
    let mut timestamp_ms = 0u64;

    for chunk in data.chunks_exact(10) {
        let value_bytes: [u8; 8] = chunk[..8].try_into().unwrap();
        let delta_bytes: [u8; 2] = chunk[8..].try_into().unwrap();

        // Values are taken as-is; NaN and infinity are admissible noise
        let value = f64::from_le_bytes(value_bytes);
        timestamp_ms += u16::from_le_bytes(delta_bytes) as u64;

        estimator.add_sample(value, timestamp_ms);

        // Analysis must not panic, and any estimate must be plausible
        if let Some(bpm) = estimator.analyze() {
            assert!((50..=180).contains(&bpm));
        }
    }
});
