// src/config/scoring_config.rs
//! Versioned scoring configuration
//!
//! A [`ScoringConfig`] is a value object: the engine receives it with every
//! call and never mutates it. `name` and `version` are echoed into the
//! result metadata so a stored score can always be traced back to the
//! weights that produced it.

use serde::{Deserialize, Serialize};

use crate::config::constants::{bfr, scoring};
use crate::error::ValidationFailure;

/// Complete scoring configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub name: String,
    pub version: String,
    pub weights: ScoringWeights,
    pub compliance: ComplianceWeights,
    /// Percentage of the MVC a contraction must reach to count as intense enough
    pub mvc_threshold_percentage: f64,
    pub intensity_measure: AmplitudeMeasure,
    pub duration_threshold: DurationThreshold,
    pub bfr_band: BfrSafetyBand,
    /// Zero the overall score when BFR parameters are missing
    pub require_bfr: bool,
    pub missing_component_policy: MissingComponentPolicy,
}

/// Weights of the four composite components
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    pub compliance: f64,
    pub symmetry: f64,
    pub effort: f64,
    pub game: f64,
}

/// Sub-weights of the per-muscle compliance rates
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ComplianceWeights {
    pub completion: f64,
    pub intensity: f64,
    pub duration: f64,
}

/// Amplitude compared against the MVC intensity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmplitudeMeasure {
    Peak,
    Mean,
}

/// Policy producing the duration threshold used for classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DurationThreshold {
    /// Constant threshold in milliseconds
    Fixed { ms: f64 },
    /// Percentile of the observed contraction durations, clamped to a range
    AdaptivePercentile { percentile: f64, min_ms: f64, max_ms: f64 },
}

/// Safe band for applied pressure as a percentage of occlusion pressure
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BfrSafetyBand {
    pub min_percent: f64,
    pub max_percent: f64,
}

/// How the composite treats a component whose input is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingComponentPolicy {
    /// Renormalize the weights of the available components
    Redistribute,
    /// Keep all weights; the missing component contributes zero
    ZeroWeight,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            name: scoring::DEFAULT_CONFIG_NAME.to_string(),
            version: scoring::DEFAULT_CONFIG_VERSION.to_string(),
            weights: ScoringWeights::default(),
            compliance: ComplianceWeights::default(),
            mvc_threshold_percentage: scoring::DEFAULT_MVC_THRESHOLD_PERCENTAGE,
            intensity_measure: AmplitudeMeasure::Peak,
            duration_threshold: DurationThreshold::default(),
            bfr_band: BfrSafetyBand::default(),
            require_bfr: false,
            missing_component_policy: MissingComponentPolicy::Redistribute,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            compliance: scoring::DEFAULT_COMPLIANCE_WEIGHT,
            symmetry: scoring::DEFAULT_SYMMETRY_WEIGHT,
            effort: scoring::DEFAULT_EFFORT_WEIGHT,
            game: scoring::DEFAULT_GAME_WEIGHT,
        }
    }
}

impl Default for ComplianceWeights {
    fn default() -> Self {
        Self {
            completion: scoring::DEFAULT_COMPLETION_WEIGHT,
            intensity: scoring::DEFAULT_INTENSITY_WEIGHT,
            duration: scoring::DEFAULT_DURATION_WEIGHT,
        }
    }
}

impl Default for DurationThreshold {
    fn default() -> Self {
        DurationThreshold::Fixed {
            ms: scoring::DEFAULT_DURATION_THRESHOLD_MS,
        }
    }
}

impl Default for BfrSafetyBand {
    fn default() -> Self {
        Self {
            min_percent: bfr::DEFAULT_SAFE_MIN_PERCENT,
            max_percent: bfr::DEFAULT_SAFE_MAX_PERCENT,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.compliance + self.symmetry + self.effort + self.game
    }

    fn as_array(&self) -> [(&'static str, f64); 4] {
        [
            ("compliance", self.compliance),
            ("symmetry", self.symmetry),
            ("effort", self.effort),
            ("game", self.game),
        ]
    }
}

impl ComplianceWeights {
    pub fn sum(&self) -> f64 {
        self.completion + self.intensity + self.duration
    }
}

impl BfrSafetyBand {
    /// Whether a percentage of occlusion pressure lies inside the band (inclusive)
    pub fn contains(&self, percent: f64) -> bool {
        percent.is_finite() && percent >= self.min_percent && percent <= self.max_percent
    }
}

fn malformed(field: &str, reason: String) -> ValidationFailure {
    ValidationFailure::MalformedConfig {
        field: field.to_string(),
        reason,
    }
}

impl ScoringConfig {
    /// Collect every consistency problem of the configuration
    pub fn validate(&self) -> Vec<ValidationFailure> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(malformed("scoring.name", "must not be empty".to_string()));
        }
        if self.version.trim().is_empty() {
            errors.push(malformed("scoring.version", "must not be empty".to_string()));
        }

        for (name, weight) in self.weights.as_array() {
            if !(0.0..=1.0).contains(&weight) {
                errors.push(malformed(
                    &format!("scoring.weights.{}", name),
                    format!("weight {} must be in [0, 1]", weight),
                ));
            }
        }
        if (self.weights.sum() - 1.0).abs() > scoring::WEIGHT_SUM_TOLERANCE {
            errors.push(malformed(
                "scoring.weights",
                format!("weights must sum to 1, got {:.4}", self.weights.sum()),
            ));
        }

        let sub = [
            ("completion", self.compliance.completion),
            ("intensity", self.compliance.intensity),
            ("duration", self.compliance.duration),
        ];
        for (name, weight) in sub {
            if !(0.0..=1.0).contains(&weight) {
                errors.push(malformed(
                    &format!("scoring.compliance.{}", name),
                    format!("sub-weight {} must be in [0, 1]", weight),
                ));
            }
        }
        if (self.compliance.sum() - 1.0).abs() > scoring::WEIGHT_SUM_TOLERANCE {
            errors.push(malformed(
                "scoring.compliance",
                format!("sub-weights must sum to 1, got {:.4}", self.compliance.sum()),
            ));
        }

        if !(self.mvc_threshold_percentage > 0.0 && self.mvc_threshold_percentage <= 100.0) {
            errors.push(malformed(
                "scoring.mvc_threshold_percentage",
                "must be in (0, 100]".to_string(),
            ));
        }

        match self.duration_threshold {
            DurationThreshold::Fixed { ms } => {
                if !(ms >= 0.0 && ms.is_finite()) {
                    errors.push(malformed("scoring.duration_threshold.ms", "must be non-negative".to_string()));
                }
            }
            DurationThreshold::AdaptivePercentile { percentile, min_ms, max_ms } => {
                if !(0.0..=100.0).contains(&percentile) {
                    errors.push(malformed(
                        "scoring.duration_threshold.percentile",
                        "must be in [0, 100]".to_string(),
                    ));
                }
                if !(min_ms >= 0.0 && max_ms >= min_ms && max_ms.is_finite()) {
                    errors.push(malformed(
                        "scoring.duration_threshold.max_ms",
                        "requires 0 <= min_ms <= max_ms".to_string(),
                    ));
                }
            }
        }

        let band = self.bfr_band;
        if !(band.min_percent >= 0.0 && band.max_percent <= 100.0 && band.min_percent < band.max_percent) {
            errors.push(malformed(
                "scoring.bfr_band",
                format!("band [{}, {}] must satisfy 0 <= min < max <= 100", band.min_percent, band.max_percent),
            ));
        }

        errors
    }
}
