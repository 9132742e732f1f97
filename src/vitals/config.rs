//! Vitals analysis configuration

/// Configuration for the vitals analysis system
#[derive(Debug, Clone)]
pub struct VitalsConfig {
    /// Rolling sample window length in milliseconds
    pub window_ms: u64,
    /// Minimum admitted samples before analysis produces estimates
    pub min_samples: usize,
    /// Amplitude threshold for candidate peaks (after mean removal)
    pub peak_threshold: f64,
    /// Minimum candidate peaks required for a stable rate
    pub min_peaks: usize,
    /// Lowest physiologically plausible BPM (inclusive)
    pub bpm_min: u32,
    /// Highest physiologically plausible BPM (inclusive)
    pub bpm_max: u32,

    /// Side length of the centered square region of interest (pixels)
    pub roi_size: u32,
    /// Maximum readings retained in the session history
    pub history_len: usize,
    /// Minimum capture-time gap between analysis passes (ms)
    pub analysis_interval_ms: u64,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            window_ms: 10_000,
            min_samples: 150,
            peak_threshold: 0.5,
            min_peaks: 3,
            bpm_min: 50,
            bpm_max: 180,
            roi_size: 100,
            history_len: 20,
            analysis_interval_ms: 100,
        }
    }
}

impl VitalsConfig {
    /// Plausible BPM range as an inclusive range
    pub fn plausible_bpm(&self) -> std::ops::RangeInclusive<u32> {
        self.bpm_min..=self.bpm_max
    }
}
