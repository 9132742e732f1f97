//! Vital-Signs Analysis Module
//!
//! Provides real-time heart-rate extraction from a camera brightness signal,
//! running as a sidecar to the capture layer.
//!
//! ## Components
//!
//! - **Heart-rate estimator** - Peak detection over a 10 s rolling sample window
//! - **Frame reduction** - RGBA frame → mean red intensity over a centered ROI
//! - **Session aggregation** - Reading history, BPM min/max/mean, zone tallies
//!
//! ## Architecture
//!
//! The vitals thread runs in parallel with the capture loop:
//!
//! ```text
//! Camera Frames (RGBA)
//!          |
//!          v
//!    Vitals Thread
//!          |
//!    RoiSampler (red-channel mean)
//!          |
//!          v
//!  HeartRateEstimator (10s window)
//!          |
//!          v
//!   Zone Classification
//!          |
//!          v
//!  SessionAggregator ──> HeartRateReading / SessionVitals
//! ```
//!
//! Callers that already hold a reduced brightness signal (e.g. a recorded
//! trace) can bypass the frame path and feed samples directly.

pub mod config;
pub mod frame;
pub mod heart_rate;
pub mod session;
pub mod thread;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use config::VitalsConfig;
pub use thread::{start_vitals_thread, VitalsHandle};

/// One brightness reading from the capture layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Mean red-channel intensity over the region of interest (0-255 scale)
    pub value: f64,
    /// Milliseconds since capture start
    pub timestamp_ms: u64,
}

/// Input message types for the vitals thread
#[derive(Debug, Clone)]
pub enum VitalsInput {
    /// Raw RGBA frame from the camera
    Frame {
        rgba: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_ms: u64,
    },
    /// Pre-reduced brightness sample (trace replay, external sampler)
    Sample { value: f64, timestamp_ms: u64 },
    /// Reset all per-session state (estimator window, aggregates)
    Reset,
    /// Shutdown signal
    Shutdown,
}

/// Output message types from the vitals thread
#[derive(Debug, Clone)]
pub enum VitalsOutput {
    /// An accepted heart-rate estimate
    Reading(HeartRateReading),
    /// Updated session aggregates
    Session(SessionVitals),
}

/// Heart-rate zone, following the common resting-rate bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartRateZone {
    /// Below 60 BPM (bradycardia range)
    Low,
    /// 60-80 BPM
    Normal,
    /// 81-100 BPM
    Elevated,
    /// Above 100 BPM (tachycardia range)
    High,
}

impl HeartRateZone {
    /// Classify a BPM value into its zone
    pub fn classify(bpm: u32) -> Self {
        if bpm < 60 {
            HeartRateZone::Low
        } else if bpm > 100 {
            HeartRateZone::High
        } else if bpm > 80 {
            HeartRateZone::Elevated
        } else {
            HeartRateZone::Normal
        }
    }

    /// Short display label
    pub fn label(&self) -> &'static str {
        match self {
            HeartRateZone::Low => "low",
            HeartRateZone::Normal => "normal",
            HeartRateZone::Elevated => "elevated",
            HeartRateZone::High => "high",
        }
    }
}

/// One accepted heart-rate estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartRateReading {
    /// Beats per minute
    pub bpm: u32,
    /// Zone classification for display
    pub zone: HeartRateZone,
    /// Capture timestamp of the newest sample in the analysis window
    pub timestamp_ms: u64,
    /// Wall-clock time the reading was produced
    pub wall_clock: DateTime<Utc>,
}

/// Per-zone reading tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCounts {
    pub low: u32,
    pub normal: u32,
    pub elevated: u32,
    pub high: u32,
}

impl ZoneCounts {
    /// Increment the tally for a zone
    pub fn record(&mut self, zone: HeartRateZone) {
        match zone {
            HeartRateZone::Low => self.low += 1,
            HeartRateZone::Normal => self.normal += 1,
            HeartRateZone::Elevated => self.elevated += 1,
            HeartRateZone::High => self.high += 1,
        }
    }

    /// Total readings across all zones
    pub fn total(&self) -> u32 {
        self.low + self.normal + self.elevated + self.high
    }
}

/// Aggregated session-level vitals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionVitals {
    /// Total accepted readings this session
    pub reading_count: u32,
    /// Lowest accepted BPM
    pub bpm_min: Option<u32>,
    /// Highest accepted BPM
    pub bpm_max: Option<u32>,
    /// Mean accepted BPM
    pub bpm_mean: Option<f32>,
    /// Reading tallies per zone
    pub zone_counts: ZoneCounts,
    /// Capture-time span from first to last admitted sample (ms)
    pub duration_ms: u64,
    /// Most recent readings, oldest first (bounded)
    pub history: Vec<HeartRateReading>,
}
