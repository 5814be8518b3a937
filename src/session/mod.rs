// src/session/mod.rs
//! Session-level entry point: input schema, validation and result assembly

pub mod aggregator;
pub mod validation;

pub use aggregator::SessionAggregator;
pub use validation::{ChannelValidator, ParameterValidator, SessionValidator, Validator};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::processing_config::DetectionConfig;
use crate::config::scoring_config::{ScoringConfig, ScoringWeights};
use crate::config::AnalysisConfig;
use crate::scoring::{BfrSessionParameters, GameScore, PerformanceScores};
use crate::types::{Annotations, ChannelAnalytics, EmgChannel, Side};

/// A recorded session as handed over by the extraction layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub channels: Vec<EmgChannel>,
    #[serde(default)]
    pub session_parameters: SessionParameters,
}

impl SessionInput {
    pub fn new(channels: Vec<EmgChannel>) -> Self {
        Self {
            channels,
            session_parameters: SessionParameters::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: SessionParameters) -> Self {
        self.session_parameters = parameters;
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Per-session values; anything set here overrides the configured default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionParameters {
    pub mvc_values_by_channel: BTreeMap<String, f64>,
    pub mvc_threshold_percentage: Option<f64>,
    pub expected_contractions_by_channel: BTreeMap<String, u32>,
    pub min_duration_ms: Option<f64>,
    pub merge_threshold_ms: Option<f64>,
    pub refractory_ms: Option<f64>,
    /// Borg CR10 rating, 0-10
    pub post_session_rpe: Option<u8>,
    pub bfr_parameters: BfrSessionParameters,
    pub scoring_weights: Option<ScoringWeights>,
    pub game_score: Option<GameScore>,
    /// Explicit laterality; when empty the first channel is left, the second right
    pub channel_sides: BTreeMap<String, Side>,
}

impl SessionParameters {
    /// Configuration with the session overrides applied
    pub fn apply_to(&self, config: &AnalysisConfig) -> AnalysisConfig {
        let mut effective = config.clone();

        if let Some(ms) = self.min_duration_ms {
            effective.detection.min_duration_ms = ms;
        }
        if let Some(ms) = self.merge_threshold_ms {
            effective.detection.merge_threshold_ms = ms;
        }
        if let Some(ms) = self.refractory_ms {
            effective.detection.refractory_ms = ms;
        }
        if let Some(percentage) = self.mvc_threshold_percentage {
            effective.scoring.mvc_threshold_percentage = percentage;
        }
        if let Some(weights) = self.scoring_weights {
            effective.scoring.weights = weights;
        }

        effective
    }

    /// Side of each channel, in channel order
    pub fn resolve_sides(&self, channel_names: &[&str]) -> BTreeMap<String, Side> {
        if !self.channel_sides.is_empty() {
            return self.channel_sides.clone();
        }
        channel_names
            .iter()
            .zip([Side::Left, Side::Right])
            .map(|(name, side)| (name.to_string(), side))
            .collect()
    }
}

/// Provenance of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub engine_version: String,
    pub scoring_config_name: String,
    pub scoring_config_version: String,
    pub channel_sides: BTreeMap<String, Side>,
    pub session_parameters: SessionParameters,
    /// Detection settings after session overrides
    pub detection: DetectionConfig,
    /// Scoring settings after session overrides
    pub scoring: ScoringConfig,
}

/// Complete analysis of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub channels: BTreeMap<String, ChannelAnalytics>,
    pub scores: PerformanceScores,
    pub metadata: SessionMetadata,
    pub annotations: Annotations,
}

impl SessionResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Symmetry between the left and right muscles, if both were present
    pub fn symmetry_score(&self) -> Option<f64> {
        self.scores.symmetry_score
    }
}
