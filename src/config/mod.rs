// src/config/mod.rs
//! Configuration management for the analytics engine

pub mod constants;
pub mod loader;
pub mod processing_config;
pub mod scoring_config;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};
pub use processing_config::*;
pub use scoring_config::*;

use serde::{Deserialize, Serialize};

use crate::error::ValidationFailure;

/// Complete engine configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub signal: SignalLimits,
    #[serde(default)]
    pub conditioning: ConditioningConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Structural acceptance limits checked before any processing
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SignalLimits {
    #[serde(default = "defaults::min_sampling_rate_hz")]
    pub min_sampling_rate_hz: f64,

    #[serde(default = "defaults::max_sampling_rate_hz")]
    pub max_sampling_rate_hz: f64,

    #[serde(default = "defaults::min_duration_s")]
    pub min_duration_s: f64,

    #[serde(default = "defaults::max_duration_s")]
    pub max_duration_s: f64,

    #[serde(default = "defaults::max_channel_count")]
    pub max_channel_count: usize,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::signal;

    pub fn min_sampling_rate_hz() -> f64 { signal::MIN_SAMPLING_RATE_HZ }
    pub fn max_sampling_rate_hz() -> f64 { signal::MAX_SAMPLING_RATE_HZ }
    pub fn min_duration_s() -> f64 { signal::MIN_DURATION_S }
    pub fn max_duration_s() -> f64 { signal::MAX_DURATION_S }
    pub fn max_channel_count() -> usize { signal::MAX_CHANNEL_COUNT }
}

impl Default for SignalLimits {
    fn default() -> Self {
        Self {
            min_sampling_rate_hz: defaults::min_sampling_rate_hz(),
            max_sampling_rate_hz: defaults::max_sampling_rate_hz(),
            min_duration_s: defaults::min_duration_s(),
            max_duration_s: defaults::max_duration_s(),
            max_channel_count: defaults::max_channel_count(),
        }
    }
}

impl SignalLimits {
    pub fn validate(&self) -> Vec<ValidationFailure> {
        let mut errors = Vec::new();

        if !(self.min_sampling_rate_hz > 0.0 && self.max_sampling_rate_hz >= self.min_sampling_rate_hz) {
            errors.push(ValidationFailure::MalformedConfig {
                field: "signal.max_sampling_rate_hz".to_string(),
                reason: "requires 0 < min_sampling_rate_hz <= max_sampling_rate_hz".to_string(),
            });
        }
        if !(self.min_duration_s >= 0.0 && self.max_duration_s >= self.min_duration_s) {
            errors.push(ValidationFailure::MalformedConfig {
                field: "signal.max_duration_s".to_string(),
                reason: "requires 0 <= min_duration_s <= max_duration_s".to_string(),
            });
        }
        if self.max_channel_count == 0 {
            errors.push(ValidationFailure::MalformedConfig {
                field: "signal.max_channel_count".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        errors
    }
}

impl AnalysisConfig {
    /// Validate every section, returning all problems at once
    pub fn validate_consistency(&self) -> Result<(), Vec<ValidationFailure>> {
        let mut errors = self.signal.validate();
        errors.extend(self.conditioning.validate());
        errors.extend(self.detection.validate());
        errors.extend(self.features.validate());
        errors.extend(self.scoring.validate());

        // High-pass cutoff must stay below the lowest accepted Nyquist frequency
        let nyquist = self.signal.min_sampling_rate_hz / 2.0;
        if self.conditioning.highpass_cutoff_hz >= nyquist {
            errors.push(ValidationFailure::MalformedConfig {
                field: "conditioning.highpass_cutoff_hz".to_string(),
                reason: format!(
                    "cutoff {} Hz must be below the Nyquist frequency {} Hz of the minimum sampling rate",
                    self.conditioning.highpass_cutoff_hz, nyquist
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get configuration summary
    pub fn get_summary(&self) -> ConfigSummary {
        ConfigSummary {
            scoring_config: format!("{}@{}", self.scoring.name, self.scoring.version),
            highpass_cutoff_hz: self.conditioning.highpass_cutoff_hz,
            envelope_method: self.conditioning.envelope_method,
            threshold_factor: self.detection.threshold_factor,
            min_duration_ms: self.detection.min_duration_ms,
            temporal_statistics: self.features.temporal_statistics,
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub scoring_config: String,
    pub highpass_cutoff_hz: f64,
    pub envelope_method: EnvelopeMethod,
    pub threshold_factor: f64,
    pub min_duration_ms: f64,
    pub temporal_statistics: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = AnalysisConfig::default();
        assert_eq!(config.signal.min_sampling_rate_hz, signal::MIN_SAMPLING_RATE_HZ);
        assert!(config.validate_consistency().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AnalysisConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AnalysisConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_config_validation_collects_all_errors() {
        let mut config = AnalysisConfig::default();
        config.signal.max_channel_count = 0;
        config.detection.threshold_factor = 0.0;
        config.scoring.mvc_threshold_percentage = 120.0;

        let errors = config.validate_consistency().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_highpass_above_minimum_nyquist_rejected() {
        let mut config = AnalysisConfig::default();
        config.signal.min_sampling_rate_hz = 30.0;
        assert!(config.validate_consistency().is_err());
    }

    #[test]
    fn test_summary() {
        let summary = AnalysisConfig::default().get_summary();
        assert_eq!(summary.scoring_config, "default@1.0.0");
        assert_eq!(summary.envelope_method, EnvelopeMethod::LowPass);
    }
}
