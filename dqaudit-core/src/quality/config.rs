//! Quality assessment configuration.
//!
//! Thresholds used by the rule checks and the legacy inline checks, plus
//! settings for the auxiliary isolation-forest scan. Every field has a
//! default so a partial JSON file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{DqAuditError, Result};

/// Isolation-forest scan configuration.
///
/// The scan is a diagnostic signal only; it never produces violations and
/// never affects the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Enable the isolation-forest scan
    pub enabled: bool,
    /// Expected fraction of anomalous rows, in (0, 0.5]
    pub contamination: f64,
    /// Number of isolation trees
    pub n_trees: usize,
    /// Rows sub-sampled per tree
    pub sample_size: usize,
    /// Seed for the tree sampler
    pub seed: u64,
    /// Wall-clock budget in milliseconds before the scan gives up
    pub budget_ms: u64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            contamination: 0.05,
            n_trees: 100,
            sample_size: 256,
            seed: 42,
            budget_ms: 2_000,
        }
    }
}

impl AnomalyConfig {
    /// Creates a new anomaly config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable/disable the scan.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder method to set the contamination fraction.
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        if !(contamination > 0.0 && contamination <= 0.5) {
            tracing::warn!(
                "contamination {} clamped to valid range (0.0, 0.5]",
                contamination
            );
        }
        self.contamination = contamination.clamp(f64::EPSILON, 0.5);
        self
    }

    /// Builder method to set the tree count.
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees.max(1);
        self
    }

    /// Builder method to set the sampler seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to set the time budget.
    pub fn with_budget_ms(mut self, budget_ms: u64) -> Self {
        self.budget_ms = budget_ms;
        self
    }
}

/// Quality assessment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Columns whose non-null fraction is below this raise `Missing Data` (0.0-1.0)
    pub completeness_min: f64,
    /// Missing plus blank percentage above which `High Missingness` fires (0-100)
    pub missingness_max_pct: f64,
    /// Fraction of non-numeric values above which `Type Conformance` fires (0.0-1.0)
    pub type_conformance_max_bad: f64,
    /// Number of most frequent categories accepted by the lookup check
    pub lookup_top_n: usize,
    /// IQR multiplier for outlier bounds
    pub iqr_multiplier: f64,
    /// Consecutive change percentage above which a spike/drop is flagged
    pub spike_threshold_pct: f64,
    /// Minimum non-null values for outlier and spike detection
    pub min_series_len: usize,
    /// Run the email/phone format check
    pub contact_validation: bool,
    /// Isolation-forest settings
    pub anomaly_detection: AnomalyConfig,
}

/// Validation errors for quality configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    /// `completeness_min` outside `[0, 1]`
    #[error("completeness_min must be between 0.0 and 1.0, got {0}")]
    InvalidCompleteness(f64),
    /// `missingness_max_pct` outside `[0, 100]`
    #[error("missingness_max_pct must be between 0 and 100, got {0}")]
    InvalidMissingness(f64),
    /// `type_conformance_max_bad` outside `[0, 1]`
    #[error("type_conformance_max_bad must be between 0.0 and 1.0, got {0}")]
    InvalidTypeConformance(f64),
    /// `lookup_top_n` is zero
    #[error("lookup_top_n must be at least 1")]
    InvalidLookupSize,
    /// `min_series_len` is zero
    #[error("min_series_len must be at least 1")]
    InvalidSeriesLength,
    /// Negative or NaN `iqr_multiplier`
    #[error("iqr_multiplier must be non-negative, got {0}")]
    InvalidIqrMultiplier(f64),
    /// Negative or NaN `spike_threshold_pct`
    #[error("spike_threshold_pct must be non-negative, got {0}")]
    InvalidSpikeThreshold(f64),
    /// Contamination outside `(0, 0.5]`
    #[error("contamination must be in (0.0, 0.5], got {0}")]
    InvalidContamination(f64),
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            completeness_min: 0.8,
            missingness_max_pct: 20.0,
            type_conformance_max_bad: 0.2,
            lookup_top_n: 10,
            iqr_multiplier: 1.5,
            spike_threshold_pct: 50.0,
            min_series_len: 5,
            contact_validation: true,
            anomaly_detection: AnomalyConfig::default(),
        }
    }
}

impl QualityConfig {
    /// Creates a new quality config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| DqAuditError::Io {
            context: format!("Failed to read config {}", path.display()),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            DqAuditError::serialization(format!("Invalid config {}", path.display()), e)
        })?;
        config
            .validate()
            .map_err(|e| DqAuditError::configuration(e.to_string()))?;
        Ok(config)
    }

    /// Builder method to set the completeness threshold.
    pub fn with_completeness_min(mut self, threshold: f64) -> Self {
        if !(0.0..=1.0).contains(&threshold) {
            tracing::warn!(
                "completeness_min {} clamped to valid range [0.0, 1.0]",
                threshold
            );
        }
        self.completeness_min = threshold.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set the missingness threshold (percent).
    pub fn with_missingness_max_pct(mut self, threshold: f64) -> Self {
        if !(0.0..=100.0).contains(&threshold) {
            tracing::warn!(
                "missingness_max_pct {} clamped to valid range [0, 100]",
                threshold
            );
        }
        self.missingness_max_pct = threshold.clamp(0.0, 100.0);
        self
    }

    /// Builder method to set the type conformance threshold.
    pub fn with_type_conformance_max_bad(mut self, threshold: f64) -> Self {
        if !(0.0..=1.0).contains(&threshold) {
            tracing::warn!(
                "type_conformance_max_bad {} clamped to valid range [0.0, 1.0]",
                threshold
            );
        }
        self.type_conformance_max_bad = threshold.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set the lookup category count.
    pub fn with_lookup_top_n(mut self, top_n: usize) -> Self {
        self.lookup_top_n = top_n.max(1);
        self
    }

    /// Builder method to enable/disable the contact format check.
    pub fn with_contact_validation(mut self, enabled: bool) -> Self {
        self.contact_validation = enabled;
        self
    }

    /// Builder method to set the anomaly scan config.
    pub fn with_anomaly_detection(mut self, config: AnomalyConfig) -> Self {
        self.anomaly_detection = config;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.completeness_min) {
            return Err(ConfigValidationError::InvalidCompleteness(
                self.completeness_min,
            ));
        }
        if !(0.0..=100.0).contains(&self.missingness_max_pct) {
            return Err(ConfigValidationError::InvalidMissingness(
                self.missingness_max_pct,
            ));
        }
        if !(0.0..=1.0).contains(&self.type_conformance_max_bad) {
            return Err(ConfigValidationError::InvalidTypeConformance(
                self.type_conformance_max_bad,
            ));
        }
        if self.lookup_top_n == 0 {
            return Err(ConfigValidationError::InvalidLookupSize);
        }
        if self.min_series_len == 0 {
            return Err(ConfigValidationError::InvalidSeriesLength);
        }
        if !(self.iqr_multiplier >= 0.0) {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }
        if !(self.spike_threshold_pct >= 0.0) {
            return Err(ConfigValidationError::InvalidSpikeThreshold(
                self.spike_threshold_pct,
            ));
        }
        let contamination = self.anomaly_detection.contamination;
        if !(contamination > 0.0 && contamination <= 0.5) {
            return Err(ConfigValidationError::InvalidContamination(contamination));
        }
        Ok(())
    }
}
