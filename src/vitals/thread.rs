//! Vitals processing thread
//!
//! Runs in parallel with the capture loop, processing:
//! - Raw RGBA frames (reduced to brightness samples via the ROI sampler)
//! - Pre-reduced brightness samples (trace replay, external samplers)
//!
//! The worker owns the estimator and aggregator exclusively; callers
//! interact only through the channels on [`VitalsHandle`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::config::VitalsConfig;
use super::frame::RoiSampler;
use super::heart_rate::HeartRateEstimator;
use super::session::SessionAggregator;
use super::{HeartRateReading, HeartRateZone, VitalsInput, VitalsOutput};

/// Handle to control the vitals thread
pub struct VitalsHandle {
    /// Channel to send inputs to the vitals thread
    input_tx: Sender<VitalsInput>,
    /// Channel to receive outputs from the vitals thread
    output_rx: Receiver<VitalsOutput>,
    /// Stop flag
    stop_flag: Arc<AtomicBool>,
    /// Thread handle
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl VitalsHandle {
    /// Send a raw RGBA frame for reduction and analysis
    pub fn send_frame(&self, rgba: Vec<u8>, width: u32, height: u32, timestamp_ms: u64) {
        let _ = self.input_tx.send(VitalsInput::Frame {
            rgba,
            width,
            height,
            timestamp_ms,
        });
    }

    /// Send a pre-reduced brightness sample
    pub fn send_sample(&self, value: f64, timestamp_ms: u64) {
        let _ = self.input_tx.send(VitalsInput::Sample {
            value,
            timestamp_ms,
        });
    }

    /// Reset per-session state (estimator window, aggregates)
    pub fn send_reset(&self) {
        let _ = self.input_tx.send(VitalsInput::Reset);
    }

    /// Try to receive a vitals output (non-blocking)
    pub fn try_recv(&self) -> Option<VitalsOutput> {
        self.output_rx.try_recv().ok()
    }

    /// Receive a vitals output, waiting up to `timeout`.
    ///
    /// Returns `None` on timeout or once the worker has exited and drained.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<VitalsOutput> {
        self.output_rx.recv_timeout(timeout).ok()
    }

    /// Request the thread to stop
    pub fn stop(&self) {
        info!("Requesting vitals thread stop");
        self.stop_flag.store(true, Ordering::SeqCst);
        let _ = self.input_tx.send(VitalsInput::Shutdown);
    }

    /// Wait for the thread to finish
    pub fn join(mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Start the vitals processing thread
pub fn start_vitals_thread(config: VitalsConfig) -> VitalsHandle {
    let (input_tx, input_rx) = mpsc::channel();
    let (output_tx, output_rx) = mpsc::channel();
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();

    let thread_handle = thread::spawn(move || {
        run_vitals_thread(config, input_rx, output_tx, stop_flag_clone);
    });

    VitalsHandle {
        input_tx,
        output_rx,
        stop_flag,
        thread_handle: Some(thread_handle),
    }
}

fn run_vitals_thread(
    config: VitalsConfig,
    input_rx: Receiver<VitalsInput>,
    output_tx: Sender<VitalsOutput>,
    stop_flag: Arc<AtomicBool>,
) {
    info!("Vitals thread started");
    info!(
        "  Window: {} ms, warm-up: {} samples",
        config.window_ms, config.min_samples
    );
    info!(
        "  Plausible range: {}-{} BPM, ROI: {} px",
        config.bpm_min, config.bpm_max, config.roi_size
    );

    let roi_sampler = RoiSampler::new(config.roi_size);
    let mut estimator = HeartRateEstimator::with_config(&config);
    let mut session = SessionAggregator::with_history_len(config.history_len);

    // Capture timestamp of the last analysis pass, for cadence gating
    let mut last_analysis_ms: Option<u64> = None;

    loop {
        // Queued inputs are processed before shutdown; the stop flag is
        // only honored while idle, so a pending trace always drains
        let input = match input_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(input) => input,
            Err(RecvTimeoutError::Timeout) => {
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => {
                info!("Vitals input channel disconnected");
                break;
            }
        };

        match input {
            VitalsInput::Frame {
                rgba,
                width,
                height,
                timestamp_ms,
            } => match roi_sampler.sample(&rgba, width, height, timestamp_ms) {
                Ok(sample) => admit_sample(
                    sample.value,
                    sample.timestamp_ms,
                    &config,
                    &mut estimator,
                    &mut session,
                    &mut last_analysis_ms,
                    &output_tx,
                ),
                Err(e) => {
                    warn!("Dropping malformed frame at {}ms: {}", timestamp_ms, e);
                }
            },

            VitalsInput::Sample {
                value,
                timestamp_ms,
            } => admit_sample(
                value,
                timestamp_ms,
                &config,
                &mut estimator,
                &mut session,
                &mut last_analysis_ms,
                &output_tx,
            ),

            VitalsInput::Reset => {
                info!("Vitals thread: resetting per-session state");
                estimator.reset();
                session.reset();
                last_analysis_ms = None;
            }

            VitalsInput::Shutdown => {
                info!("Vitals thread received shutdown signal");
                break;
            }
        }
    }

    // Final aggregate snapshot for the session record
    let _ = output_tx.send(VitalsOutput::Session(session.vitals()));

    info!("Vitals thread stopped");
}

/// Admit one sample and run the analysis pass when the cadence allows
fn admit_sample(
    value: f64,
    timestamp_ms: u64,
    config: &VitalsConfig,
    estimator: &mut HeartRateEstimator,
    session: &mut SessionAggregator,
    last_analysis_ms: &mut Option<u64>,
    output_tx: &Sender<VitalsOutput>,
) {
    estimator.add_sample(value, timestamp_ms);
    session.note_sample(timestamp_ms);

    // Analysis runs on its own cadence in capture time
    let due = match *last_analysis_ms {
        Some(last) => timestamp_ms.saturating_sub(last) >= config.analysis_interval_ms,
        None => true,
    };
    if !due {
        return;
    }
    *last_analysis_ms = Some(timestamp_ms);

    if let Some(bpm) = estimator.analyze() {
        let reading = HeartRateReading {
            bpm,
            zone: HeartRateZone::classify(bpm),
            timestamp_ms,
            wall_clock: Utc::now(),
        };
        debug!("Reading: {} BPM ({})", reading.bpm, reading.zone.label());

        session.add_reading(reading.clone());
        let _ = output_tx.send(VitalsOutput::Reading(reading));
        let _ = output_tx.send(VitalsOutput::Session(session.vitals()));
    }
}
