//! Fuzz testing for ROI frame reduction
//!
//! Tests that frame reduction handles arbitrary buffer/dimension
//! combinations without panicking.
//!
//! Run with: cargo +nightly fuzz run fuzz_roi_sampler

#![no_main]

use libfuzzer_sys::fuzz_target;
use vital_monitor::vitals::frame::RoiSampler;

fuzz_target!(|data: &[u8]| {
    if data.len() < 5 {
        return;
    }

    // First bytes pick the claimed dimensions and ROI; the rest is the buffer
    let width = data[0] as u32;
    let height = data[1] as u32;
    let roi_size = data[2] as u32;
    let rgba = &data[3..];

    let sampler = RoiSampler::new(roi_size);

    // Either a valid mean or a typed error, never a panic
    if let Ok(sample) = sampler.sample(rgba, width, height, 0) {
        assert!(sample.value >= 0.0 && sample.value <= 255.0);
    }
});
