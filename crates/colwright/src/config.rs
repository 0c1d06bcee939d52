//! Engine configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ColwrightError, Result};

/// Tunable thresholds and markers used by the transformation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Non-null values sampled per column when detecting JSON.
    pub json_sample_size: usize,
    /// Share of sampled values that must be JSON for a column to qualify.
    pub json_threshold: f64,
    /// Text joined in place of missing values under `null_string`.
    pub null_marker: String,
    /// Rows shown in split previews.
    pub split_preview_rows: usize,
    /// Non-null values sampled when validating a split.
    pub split_sample_rows: usize,
    /// Missing-value share (percent) above which merge validation warns.
    pub missing_warning_percent: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            json_sample_size: 100,
            json_threshold: 0.5,
            null_marker: "NULL".to_string(),
            split_preview_rows: 5,
            split_sample_rows: 10,
            missing_warning_percent: 50.0,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file. Missing fields keep defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ColwrightError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: EngineConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ColwrightError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that thresholds are in range.
    pub fn validate(&self) -> Result<()> {
        if self.json_sample_size == 0 {
            return Err(ColwrightError::Config(
                "json_sample_size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.json_threshold) {
            return Err(ColwrightError::Config(format!(
                "json_threshold must be between 0 and 1, got {}",
                self.json_threshold
            )));
        }
        if !(0.0..=100.0).contains(&self.missing_warning_percent) {
            return Err(ColwrightError::Config(format!(
                "missing_warning_percent must be between 0 and 100, got {}",
                self.missing_warning_percent
            )));
        }
        Ok(())
    }
}
