//! Session vitals aggregation
//!
//! Tracks session-level statistics from accepted readings:
//! - Rolling reading history (bounded)
//! - BPM min/max/mean
//! - Per-zone tallies
//! - Capture-time span from first to last admitted sample

use std::collections::VecDeque;

use super::{HeartRateReading, SessionVitals, ZoneCounts};

/// Default maximum readings retained in the history
const MAX_READING_HISTORY: usize = 20;

/// Aggregates session-level vitals from the reading stream
pub struct SessionAggregator {
    /// Capture timestamp of the first admitted sample
    session_start_ms: Option<u64>,
    /// Capture timestamp of the last admitted sample
    session_end_ms: u64,
    /// Bounded reading history, oldest first
    history: VecDeque<HeartRateReading>,
    history_len: usize,
    reading_count: u32,
    bpm_min: Option<u32>,
    bpm_max: Option<u32>,
    /// Sum of accepted BPM values for the mean
    bpm_sum: u64,
    zone_counts: ZoneCounts,
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::with_history_len(MAX_READING_HISTORY)
    }

    /// Create an aggregator with a custom history bound
    pub fn with_history_len(history_len: usize) -> Self {
        Self {
            session_start_ms: None,
            session_end_ms: 0,
            history: VecDeque::with_capacity(history_len),
            history_len: history_len.max(1),
            reading_count: 0,
            bpm_min: None,
            bpm_max: None,
            bpm_sum: 0,
            zone_counts: ZoneCounts::default(),
        }
    }

    /// Note an admitted sample's capture timestamp for the session span.
    ///
    /// Called for every sample, accepted estimate or not, so the duration
    /// covers warm-up time too.
    pub fn note_sample(&mut self, timestamp_ms: u64) {
        if self.session_start_ms.is_none() {
            self.session_start_ms = Some(timestamp_ms);
        }
        self.session_end_ms = timestamp_ms.max(self.session_end_ms);
    }

    /// Add an accepted reading
    pub fn add_reading(&mut self, reading: HeartRateReading) {
        self.note_sample(reading.timestamp_ms);

        self.reading_count += 1;
        self.bpm_sum += reading.bpm as u64;
        self.bpm_min = Some(match self.bpm_min {
            Some(min) => min.min(reading.bpm),
            None => reading.bpm,
        });
        self.bpm_max = Some(match self.bpm_max {
            Some(max) => max.max(reading.bpm),
            None => reading.bpm,
        });
        self.zone_counts.record(reading.zone);

        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(reading);
    }

    /// Current aggregate snapshot
    pub fn vitals(&self) -> SessionVitals {
        let duration_ms = match self.session_start_ms {
            Some(start) => self.session_end_ms.saturating_sub(start),
            None => 0,
        };

        let bpm_mean = if self.reading_count > 0 {
            Some(self.bpm_sum as f32 / self.reading_count as f32)
        } else {
            None
        };

        SessionVitals {
            reading_count: self.reading_count,
            bpm_min: self.bpm_min,
            bpm_max: self.bpm_max,
            bpm_mean,
            zone_counts: self.zone_counts,
            duration_ms,
            history: self.history.iter().cloned().collect(),
        }
    }

    /// Clear all per-session state
    pub fn reset(&mut self) {
        self.session_start_ms = None;
        self.session_end_ms = 0;
        self.history.clear();
        self.reading_count = 0;
        self.bpm_min = None;
        self.bpm_max = None;
        self.bpm_sum = 0;
        self.zone_counts = ZoneCounts::default();
    }
}

impl Default for SessionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::HeartRateZone;
    use chrono::Utc;

    fn reading(bpm: u32, timestamp_ms: u64) -> HeartRateReading {
        HeartRateReading {
            bpm,
            zone: HeartRateZone::classify(bpm),
            timestamp_ms,
            wall_clock: Utc::now(),
        }
    }

    #[test]
    fn test_empty_aggregator() {
        let aggregator = SessionAggregator::new();
        let vitals = aggregator.vitals();
        assert_eq!(vitals.reading_count, 0);
        assert!(vitals.bpm_min.is_none());
        assert!(vitals.bpm_mean.is_none());
        assert_eq!(vitals.duration_ms, 0);
    }

    #[test]
    fn test_min_max_mean() {
        let mut aggregator = SessionAggregator::new();
        aggregator.add_reading(reading(60, 5_000));
        aggregator.add_reading(reading(72, 5_100));
        aggregator.add_reading(reading(90, 5_200));

        let vitals = aggregator.vitals();
        assert_eq!(vitals.reading_count, 3);
        assert_eq!(vitals.bpm_min, Some(60));
        assert_eq!(vitals.bpm_max, Some(90));
        assert_eq!(vitals.bpm_mean, Some(74.0));
        assert_eq!(vitals.zone_counts.normal, 2);
        assert_eq!(vitals.zone_counts.elevated, 1);
    }

    #[test]
    fn test_history_bounded_at_limit() {
        let mut aggregator = SessionAggregator::new();
        for i in 0..30u32 {
            aggregator.add_reading(reading(60 + i % 10, 5_000 + i as u64 * 100));
        }

        let vitals = aggregator.vitals();
        assert_eq!(vitals.reading_count, 30);
        assert_eq!(vitals.history.len(), 20);
        // Oldest surviving reading is the 11th added
        assert_eq!(vitals.history[0].timestamp_ms, 6_000);
    }

    #[test]
    fn test_duration_covers_warmup() {
        let mut aggregator = SessionAggregator::new();
        aggregator.note_sample(0);
        aggregator.note_sample(4_900);
        aggregator.add_reading(reading(72, 5_000));

        let vitals = aggregator.vitals();
        assert_eq!(vitals.duration_ms, 5_000);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut aggregator = SessionAggregator::new();
        aggregator.add_reading(reading(72, 5_000));
        aggregator.reset();

        let vitals = aggregator.vitals();
        assert_eq!(vitals.reading_count, 0);
        assert!(vitals.bpm_min.is_none());
        assert!(vitals.history.is_empty());
        assert_eq!(vitals.duration_ms, 0);
    }
}
