//! Application configuration
//!
//! Versioned JSON config persisted under the user's home directory. Loading
//! falls back to defaults so a broken or missing file never blocks a
//! monitoring session.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::vitals::VitalsConfig;

/// Internal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,
    /// Rolling sample window length in milliseconds
    pub window_ms: u64,
    /// Minimum admitted samples before analysis produces estimates
    pub min_samples: usize,
    /// Amplitude threshold for candidate peaks (after mean removal)
    pub peak_threshold: f64,
    /// Minimum candidate peaks required for a stable rate
    pub min_peaks: usize,
    /// Plausible BPM range (inclusive)
    pub bpm_min: u32,
    pub bpm_max: u32,
    /// Side length of the centered region of interest (pixels)
    pub roi_size: u32,
    /// Maximum readings retained in the session history
    pub history_len: usize,
    /// Minimum capture-time gap between analysis passes (ms)
    pub analysis_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let vitals = VitalsConfig::default();
        Self {
            schema_version: 1,
            window_ms: vitals.window_ms,
            min_samples: vitals.min_samples,
            peak_threshold: vitals.peak_threshold,
            min_peaks: vitals.min_peaks,
            bpm_min: vitals.bpm_min,
            bpm_max: vitals.bpm_max,
            roi_size: vitals.roi_size,
            history_len: vitals.history_len,
            analysis_interval_ms: vitals.analysis_interval_ms,
        }
    }
}

impl Config {
    /// Get the default config directory
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".vitalmonitor"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default path or return default
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                debug!("Failed to load config, using default: {}", e);
                Self::default()
            }
        }
    }

    /// Load config from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config dir {}", dir.display()))?;
        self.save_to(&Self::config_path()?)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Runtime vitals configuration derived from these settings
    pub fn vitals(&self) -> VitalsConfig {
        VitalsConfig {
            window_ms: self.window_ms,
            min_samples: self.min_samples,
            peak_threshold: self.peak_threshold,
            min_peaks: self.min_peaks,
            bpm_min: self.bpm_min,
            bpm_max: self.bpm_max,
            roi_size: self.roi_size,
            history_len: self.history_len,
            analysis_interval_ms: self.analysis_interval_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_vitals_default() {
        let config = Config::default();
        let vitals = config.vitals();
        assert_eq!(vitals.window_ms, 10_000);
        assert_eq!(vitals.min_samples, 150);
        assert_eq!(vitals.peak_threshold, 0.5);
        assert_eq!(vitals.bpm_min, 50);
        assert_eq!(vitals.bpm_max, 180);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.roi_size = 64;
        config.history_len = 5;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.roi_size, 64);
        assert_eq!(loaded.history_len, 5);
        assert_eq!(loaded.schema_version, 1);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
