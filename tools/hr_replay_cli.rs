//! Heart-Rate Replay CLI
//!
//! A standalone tool to replay a recorded brightness trace (or a synthetic
//! pulse) through the heart-rate estimator without a camera.
//!
//! Usage:
//!   cargo run --bin hr_replay_cli -- <trace.jsonl>
//!   cargo run --bin hr_replay_cli -- --sine <bpm> <seconds>
//!
//! Trace format: one JSON object per line, e.g.
//!   {"value": 131.2, "timestamp_ms": 1234}

use std::env;
use std::fs;

use vital_monitor::config::Config;
use vital_monitor::session::MonitorSession;
use vital_monitor::vitals::heart_rate::HeartRateEstimator;
use vital_monitor::vitals::session::SessionAggregator;
use vital_monitor::vitals::{HeartRateReading, HeartRateZone, Sample};

/// Sample rate for synthetic traces (matches the nominal camera rate)
const SINE_RATE_HZ: f64 = 30.0;

/// Amplitude for synthetic traces, comfortably above the peak threshold
const SINE_AMPLITUDE: f64 = 2.0;

fn synthetic_pulse(bpm: f64, seconds: f64) -> Vec<Sample> {
    let count = (seconds * SINE_RATE_HZ) as usize;
    let freq_hz = bpm / 60.0;
    (0..count)
        .map(|i| {
            let t = i as f64 / SINE_RATE_HZ;
            Sample {
                value: 128.0 + SINE_AMPLITUDE * (2.0 * std::f64::consts::PI * freq_hz * t).cos(),
                timestamp_ms: (t * 1000.0).round() as u64,
            }
        })
        .collect()
}

fn load_trace(path: &str) -> Result<Vec<Sample>, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let mut samples = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Sample>(line) {
            Ok(sample) => samples.push(sample),
            Err(e) => eprintln!("Skipping malformed line {}: {}", line_no + 1, e),
        }
    }
    Ok(samples)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Heart-Rate Replay CLI");
        eprintln!();
        eprintln!("Usage: {} <trace.jsonl>", args[0]);
        eprintln!("       {} --sine <bpm> <seconds>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} session_trace.jsonl", args[0]);
        eprintln!("  {} --sine 72 15", args[0]);
        std::process::exit(1);
    }

    let samples = if args[1] == "--sine" {
        if args.len() < 4 {
            eprintln!("--sine requires <bpm> <seconds>");
            std::process::exit(1);
        }
        let bpm: f64 = args[2].parse()?;
        let seconds: f64 = args[3].parse()?;
        println!("Synthetic pulse: {} BPM for {} s at {} Hz", bpm, seconds, SINE_RATE_HZ);
        synthetic_pulse(bpm, seconds)
    } else {
        let samples = load_trace(&args[1])?;
        println!("Loaded {} samples from {}", samples.len(), args[1]);
        samples
    };

    if samples.is_empty() {
        eprintln!("No samples to replay");
        std::process::exit(1);
    }

    let config = Config::load_or_default();
    let vitals_config = config.vitals();

    let mut estimator = HeartRateEstimator::with_config(&vitals_config);
    let mut aggregator = SessionAggregator::with_history_len(vitals_config.history_len);
    let mut monitor = MonitorSession::new(vitals_config.min_samples as u32);

    monitor.start()?;
    monitor.begin_capture()?;

    let mut last_analysis_ms: Option<u64> = None;
    for sample in &samples {
        estimator.add_sample(sample.value, sample.timestamp_ms);
        aggregator.note_sample(sample.timestamp_ms);
        monitor.record_sample();

        let due = match last_analysis_ms {
            Some(last) => {
                sample.timestamp_ms.saturating_sub(last) >= vitals_config.analysis_interval_ms
            }
            None => true,
        };
        if !due {
            continue;
        }
        last_analysis_ms = Some(sample.timestamp_ms);

        if let Some(bpm) = estimator.analyze() {
            let reading = HeartRateReading {
                bpm,
                zone: HeartRateZone::classify(bpm),
                timestamp_ms: sample.timestamp_ms,
                wall_clock: chrono::Utc::now(),
            };
            monitor.record_reading();
            println!(
                "t={:>7.1}s  {:>3} BPM ({})",
                reading.timestamp_ms as f64 / 1000.0,
                reading.bpm,
                reading.zone.label()
            );
            aggregator.add_reading(reading);
        }
    }

    let vitals = aggregator.vitals();
    let status = monitor.status();

    println!();
    println!("=== Session summary ===");
    println!("State:        {:?}", status.state);
    println!("Samples:      {}", samples.len());
    println!("Readings:     {}", vitals.reading_count);
    match (vitals.bpm_min, vitals.bpm_mean, vitals.bpm_max) {
        (Some(min), Some(mean), Some(max)) => {
            println!("BPM:          min {} / mean {:.1} / max {}", min, mean, max);
        }
        _ => println!("BPM:          no estimate"),
    }
    println!(
        "Zones:        low {} / normal {} / elevated {} / high {}",
        vitals.zone_counts.low,
        vitals.zone_counts.normal,
        vitals.zone_counts.elevated,
        vitals.zone_counts.high
    );
    println!("Trace span:   {:.1} s", vitals.duration_ms as f64 / 1000.0);

    monitor.stop();
    Ok(())
}
