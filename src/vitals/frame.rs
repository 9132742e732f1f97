//! Region-of-interest frame reduction
//!
//! Reduces one RGBA camera frame to a single brightness sample: the
//! arithmetic mean of the red channel over a square region centered on the
//! frame (the fingertip area when the finger covers the lens). Pure buffer
//! math; camera access and pixel readback live in the capture layer.

use thiserror::Error;

use super::Sample;

/// Default side length of the centered sampling region (pixels)
pub const DEFAULT_ROI_SIZE: u32 = 100;

/// Frame reduction errors
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame has a zero dimension ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },
}

/// Reduces RGBA frames to mean-red brightness samples over a centered ROI.
///
/// The ROI is clamped to the frame when the frame is smaller than the
/// configured size, so tiny frames still produce a sample.
pub struct RoiSampler {
    roi_size: u32,
}

impl RoiSampler {
    /// Create a sampler with the given ROI side length
    pub fn new(roi_size: u32) -> Self {
        Self {
            roi_size: roi_size.max(1),
        }
    }

    /// Reduce one frame to a brightness sample.
    ///
    /// `rgba` must hold exactly `width * height * 4` bytes in RGBA order.
    pub fn sample(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        timestamp_ms: u64,
    ) -> Result<Sample, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimension { width, height });
        }

        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }

        let side = self.roi_size.min(width).min(height);
        let x0 = (width - side) / 2;
        let y0 = (height - side) / 2;

        let mut red_sum = 0u64;
        for y in y0..y0 + side {
            let row_start = (y as usize * width as usize + x0 as usize) * 4;
            for x in 0..side as usize {
                red_sum += rgba[row_start + x * 4] as u64;
            }
        }

        let pixel_count = side as u64 * side as u64;
        Ok(Sample {
            value: red_sum as f64 / pixel_count as f64,
            timestamp_ms,
        })
    }
}

impl Default for RoiSampler {
    fn default() -> Self {
        Self::new(DEFAULT_ROI_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a width x height RGBA frame with a uniform red value
    fn uniform_frame(width: u32, height: u32, red: u8) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width * height {
            rgba.extend_from_slice(&[red, 0, 0, 255]);
        }
        rgba
    }

    #[test]
    fn test_uniform_frame_mean_equals_red_value() {
        let sampler = RoiSampler::default();
        let frame = uniform_frame(640, 480, 200);
        let sample = sampler.sample(&frame, 640, 480, 1_000).unwrap();
        assert_eq!(sample.value, 200.0);
        assert_eq!(sample.timestamp_ms, 1_000);
    }

    #[test]
    fn test_roi_ignores_border_pixels() {
        // Border bright, center dark: only the centered ROI is averaged
        let width = 200u32;
        let height = 200u32;
        let mut frame = uniform_frame(width, height, 255);
        let sampler = RoiSampler::new(100);

        // Darken the centered 100x100 region
        for y in 50..150usize {
            for x in 50..150usize {
                frame[(y * width as usize + x) * 4] = 10;
            }
        }

        let sample = sampler.sample(&frame, width, height, 0).unwrap();
        assert_eq!(sample.value, 10.0);
    }

    #[test]
    fn test_small_frame_clamps_roi() {
        let sampler = RoiSampler::new(100);
        let frame = uniform_frame(8, 8, 42);
        let sample = sampler.sample(&frame, 8, 8, 0).unwrap();
        assert_eq!(sample.value, 42.0);
    }

    #[test]
    fn test_buffer_size_mismatch_errors() {
        let sampler = RoiSampler::default();
        let frame = uniform_frame(8, 8, 42);
        let err = sampler.sample(&frame, 16, 16, 0).unwrap_err();
        assert!(matches!(err, FrameError::BufferSize { .. }));
    }

    #[test]
    fn test_zero_dimension_errors() {
        let sampler = RoiSampler::default();
        let err = sampler.sample(&[], 0, 480, 0).unwrap_err();
        assert!(matches!(err, FrameError::ZeroDimension { .. }));
    }

    #[test]
    fn test_split_roi_averages() {
        // Left half of the ROI dark, right half bright → mean in between
        let width = 10u32;
        let height = 10u32;
        let mut frame = uniform_frame(width, height, 0);
        for y in 0..10usize {
            for x in 5..10usize {
                frame[(y * 10 + x) * 4] = 100;
            }
        }
        let sampler = RoiSampler::new(10);
        let sample = sampler.sample(&frame, width, height, 0).unwrap();
        assert_eq!(sample.value, 50.0);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_sample_never_panics(
            width in 0u32..64,
            height in 0u32..64,
            extra in 0usize..16,
            red in 0u8..=255
        ) {
            let len = width as usize * height as usize * 4 + extra;
            let rgba = vec![red; len];
            let sampler = RoiSampler::default();
            // Either a valid mean or a typed error, never a panic
            if let Ok(sample) = sampler.sample(&rgba, width, height, 0) {
                prop_assert!(sample.value >= 0.0 && sample.value <= 255.0);
            }
        }
    }
}
