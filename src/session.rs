//! Monitoring session lifecycle
//!
//! Tracks one camera monitoring session from idle through calibration to
//! live measurement, and produces status snapshots for the display layer.
//! The signal itself lives in the vitals thread; this manager only holds
//! lifecycle state.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Monitoring session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    Idle,
    /// Camera is being opened
    Initializing,
    /// Samples are accumulating but no estimate has been accepted yet
    Calibrating,
    /// At least one estimate has been accepted
    Measuring,
    Error,
}

/// Session lifecycle errors
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum SessionError {
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),
    #[error("Capture error: {0}")]
    CaptureError(String),
}

/// Status update sent to the display layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub state: MonitorState,
    pub session_id: Option<String>,
    pub elapsed_ms: u64,
    /// Warm-up fill fraction (0.0-1.0); 1.0 once the analysis window is full
    pub calibration_progress: f32,
    pub error_message: Option<String>,
}

/// Manages the monitoring session lifecycle
pub struct MonitorSession {
    state: MonitorState,
    /// Unique session ID for log correlation (generated on start)
    session_id: Option<String>,
    start_time: Option<std::time::Instant>,
    samples_admitted: u32,
    /// Samples needed before the estimator can produce a reading
    warmup_samples: u32,
    error: Option<SessionError>,
}

impl MonitorSession {
    pub fn new(warmup_samples: u32) -> Self {
        Self {
            state: MonitorState::Idle,
            session_id: None,
            start_time: None,
            samples_admitted: 0,
            warmup_samples: warmup_samples.max(1),
            error: None,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Begin a session: Idle → Initializing
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != MonitorState::Idle {
            return Err(SessionError::InvalidTransition(format!(
                "start from {:?}",
                self.state
            )));
        }
        self.state = MonitorState::Initializing;
        self.session_id = Some(Uuid::new_v4().to_string());
        self.start_time = Some(std::time::Instant::now());
        self.samples_admitted = 0;
        self.error = None;
        Ok(())
    }

    /// Capture is live: Initializing → Calibrating
    pub fn begin_capture(&mut self) -> Result<(), SessionError> {
        if self.state != MonitorState::Initializing {
            return Err(SessionError::InvalidTransition(format!(
                "begin_capture from {:?}",
                self.state
            )));
        }
        self.state = MonitorState::Calibrating;
        Ok(())
    }

    /// Note one admitted sample (drives calibration progress)
    pub fn record_sample(&mut self) {
        if matches!(
            self.state,
            MonitorState::Calibrating | MonitorState::Measuring
        ) {
            self.samples_admitted = self.samples_admitted.saturating_add(1);
        }
    }

    /// Note one accepted reading: Calibrating → Measuring
    pub fn record_reading(&mut self) {
        if self.state == MonitorState::Calibrating {
            self.state = MonitorState::Measuring;
        }
    }

    /// Record a capture failure: any active state → Error
    pub fn fail(&mut self, message: impl Into<String>) {
        let err = SessionError::CaptureError(message.into());
        self.error = Some(err);
        self.state = MonitorState::Error;
    }

    /// End the session and return to Idle
    pub fn stop(&mut self) {
        self.state = MonitorState::Idle;
        self.session_id = None;
        self.start_time = None;
        self.samples_admitted = 0;
        self.error = None;
    }

    /// Current status snapshot
    pub fn status(&self) -> MonitorStatus {
        let elapsed_ms = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        let calibration_progress = match self.state {
            MonitorState::Idle | MonitorState::Initializing => 0.0,
            MonitorState::Measuring => 1.0,
            _ => (self.samples_admitted as f32 / self.warmup_samples as f32).min(1.0),
        };

        MonitorStatus {
            state: self.state,
            session_id: self.session_id.clone(),
            elapsed_ms,
            calibration_progress,
            error_message: self.error.as_ref().map(|e| e.to_string()),
        }
    }
}
