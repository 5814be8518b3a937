// src/scoring/compliance.rs
//! Per-muscle compliance

use serde::{Deserialize, Serialize};

use crate::config::scoring_config::ComplianceWeights;
use crate::types::ChannelAnalytics;

/// Compliance rates of one muscle, all rates in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleCompliance {
    pub expected_contractions: Option<u32>,
    pub completed_contractions: usize,
    /// `None` when no expected count was supplied
    pub completion_rate: Option<f64>,
    pub intensity_rate: f64,
    pub duration_rate: f64,
    /// Sub-weighted rates scaled to [0, 100]
    pub score: f64,
    pub is_partial: bool,
}

/// Score one muscle against its prescribed contraction count
///
/// Without an expected count the completion sub-weight is redistributed over
/// intensity and duration in proportion to their own weights.
pub fn muscle_compliance(
    analytics: &ChannelAnalytics,
    expected: Option<u32>,
    weights: &ComplianceWeights,
) -> MuscleCompliance {
    let completed = analytics.contraction_count;
    let rate = |count: usize| {
        if completed == 0 {
            0.0
        } else {
            count as f64 / completed as f64
        }
    };

    let intensity_rate = rate(analytics.mvc_contraction_count);
    let duration_rate = rate(analytics.duration_contraction_count);
    let completion_rate = expected
        .filter(|&e| e > 0)
        .map(|e| (completed as f64 / e as f64).min(1.0));

    let score = match completion_rate {
        Some(completion) => {
            weights.completion * completion + weights.intensity * intensity_rate + weights.duration * duration_rate
        }
        None => {
            let remaining = weights.intensity + weights.duration;
            if remaining > 0.0 {
                (weights.intensity * intensity_rate + weights.duration * duration_rate) / remaining
            } else {
                0.0
            }
        }
    };

    MuscleCompliance {
        expected_contractions: expected,
        completed_contractions: completed,
        completion_rate,
        intensity_rate,
        duration_rate,
        score: (score * 100.0).clamp(0.0, 100.0),
        is_partial: completion_rate.is_none(),
    }
}
