// src/scoring/mod.rs
//! Composite therapy-performance scoring
//!
//! The overall score is a weighted sum of four components: compliance,
//! bilateral symmetry, perceived effort and game performance. Components
//! whose inputs are missing are handled by the configured
//! [`MissingComponentPolicy`]; the BFR safety gate is applied last and can
//! force the overall score to zero.

pub mod bfr;
pub mod compliance;
pub mod effort;
pub mod symmetry;

pub use bfr::{evaluate_bfr_gate, BfrGate, BfrGateOutcome, BfrParameters, BfrSessionParameters, BfrSideAssessment};
pub use compliance::{muscle_compliance, MuscleCompliance};
pub use effort::effort_score;
pub use symmetry::symmetry_score;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::constants::effort::MAX_RPE;
use crate::config::scoring_config::{MissingComponentPolicy, ScoringConfig, ScoringWeights};
use crate::error::{AnalyticsErrorBuilder, AnalyticsResult};
use crate::types::{Annotation, AnnotationKind, Annotations, ChannelAnalytics, Side};

/// Game points achieved in the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameScore {
    pub points: f64,
    pub max_points: f64,
}

impl GameScore {
    /// Points as a percentage of the maximum, `None` without a positive maximum
    pub fn percentage(&self) -> Option<f64> {
        if !(self.max_points > 0.0 && self.points.is_finite()) {
            return None;
        }
        Some((self.points / self.max_points * 100.0).clamp(0.0, 100.0))
    }
}

/// One scored muscle
#[derive(Debug, Clone)]
pub struct MuscleInput<'a> {
    pub name: &'a str,
    pub side: Option<Side>,
    pub analytics: &'a ChannelAnalytics,
    pub expected_contractions: Option<u32>,
}

/// Everything the scorer needs for one session
#[derive(Debug, Clone, Default)]
pub struct ScoringInput<'a> {
    pub muscles: Vec<MuscleInput<'a>>,
    pub post_session_rpe: Option<u8>,
    pub game_score: Option<GameScore>,
    pub bfr: BfrSessionParameters,
}

/// Component scores in [0, 100]; `None` marks a missing input
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub compliance: Option<f64>,
    pub symmetry: Option<f64>,
    pub effort: Option<f64>,
    pub game: Option<f64>,
}

impl ComponentScores {
    fn weighted(&self, weights: &ScoringWeights) -> [(Option<f64>, f64); 4] {
        [
            (self.compliance, weights.compliance),
            (self.symmetry, weights.symmetry),
            (self.effort, weights.effort),
            (self.game, weights.game),
        ]
    }
}

/// Weighted combination of component scores
///
/// Returns the score and the weights that were effectively applied.
pub fn weighted_overall(
    components: &ComponentScores,
    weights: &ScoringWeights,
    policy: MissingComponentPolicy,
) -> (f64, ScoringWeights) {
    let mask = |value: Option<f64>, weight: f64| if value.is_some() { weight } else { 0.0 };
    let mut effective = ScoringWeights {
        compliance: mask(components.compliance, weights.compliance),
        symmetry: mask(components.symmetry, weights.symmetry),
        effort: mask(components.effort, weights.effort),
        game: mask(components.game, weights.game),
    };

    if policy == MissingComponentPolicy::Redistribute {
        let available = effective.sum();
        if available > 0.0 {
            effective.compliance /= available;
            effective.symmetry /= available;
            effective.effort /= available;
            effective.game /= available;
        }
    }

    let score: f64 = components
        .weighted(&effective)
        .iter()
        .map(|(value, weight)| value.unwrap_or(0.0) * weight)
        .sum();

    (score.clamp(0.0, 100.0), effective)
}

/// Per-component detail of a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBreakdown {
    pub muscles: BTreeMap<String, MuscleCompliance>,
    pub side_compliance: BTreeMap<Side, f64>,
    pub configured_weights: ScoringWeights,
    pub effective_weights: ScoringWeights,
    pub policy: MissingComponentPolicy,
    /// Weighted score before the BFR gate
    pub weighted_score: f64,
}

/// Composite performance scores of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScores {
    pub overall_score: f64,
    pub compliance_score: Option<f64>,
    pub symmetry_score: Option<f64>,
    pub effort_score: Option<f64>,
    pub game_score: Option<f64>,
    pub component_breakdown: ComponentBreakdown,
    pub bfr_gate: BfrGate,
    pub is_partial: bool,
}

/// Performance scorer bound to one scoring configuration
#[derive(Debug, Clone)]
pub struct PerformanceScorer {
    config: ScoringConfig,
}

impl PerformanceScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self { config: config.clone() }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a session; missing optional inputs never fail the call
    pub fn score(&self, input: &ScoringInput<'_>) -> AnalyticsResult<(PerformanceScores, Annotations)> {
        if let Some(rpe) = input.post_session_rpe {
            if rpe > MAX_RPE {
                return Err(AnalyticsErrorBuilder::new("scoring", "score").invalid_parameter(
                    "post_session_rpe",
                    rpe,
                    "must be between 0 and 10",
                ));
            }
        }

        let mut annotations = Annotations::new();
        let mut partial = |key: &str, message: String| {
            warn!(field = key, "{}", message);
            annotations.insert(key.to_string(), Annotation::new(AnnotationKind::PartialScoring, message));
        };

        // Compliance per muscle
        let mut muscles = BTreeMap::new();
        let mut by_side: BTreeMap<Side, Vec<f64>> = BTreeMap::new();
        for muscle in &input.muscles {
            let result = muscle_compliance(muscle.analytics, muscle.expected_contractions, &self.config.compliance);
            if result.is_partial {
                partial(
                    &format!("scores.compliance.{}.completion", muscle.name),
                    "no expected contraction count; completion weight redistributed".to_string(),
                );
            }
            if let Some(side) = muscle.side {
                by_side.entry(side).or_default().push(result.score);
            }
            muscles.insert(muscle.name.to_string(), result);
        }

        let compliance = mean(muscles.values().map(|m| m.score));
        if compliance.is_none() {
            partial("scores.compliance", "no muscles to score".to_string());
        }

        let side_compliance: BTreeMap<Side, f64> = by_side
            .iter()
            .filter_map(|(side, scores)| mean(scores.iter().copied()).map(|m| (*side, m)))
            .collect();

        let symmetry = match (side_compliance.get(&Side::Left), side_compliance.get(&Side::Right)) {
            (Some(&left), Some(&right)) => Some(symmetry_score(left, right)),
            _ => {
                partial("scores.symmetry", "both a left and a right muscle are required".to_string());
                None
            }
        };

        let effort = input.post_session_rpe.and_then(effort_score);
        if effort.is_none() {
            partial("scores.effort", "no post-session RPE supplied".to_string());
        }

        let game = input.game_score.as_ref().and_then(GameScore::percentage);
        if game.is_none() {
            partial("scores.game", "no game score supplied".to_string());
        }

        let components = ComponentScores {
            compliance,
            symmetry,
            effort,
            game,
        };
        let (weighted_score, effective_weights) =
            weighted_overall(&components, &self.config.weights, self.config.missing_component_policy);

        let is_partial = muscles.values().any(|m| m.is_partial)
            || [compliance, symmetry, effort, game].iter().any(Option::is_none);

        // BFR gate last
        let bfr_gate = evaluate_bfr_gate(&input.bfr, &self.config.bfr_band, self.config.require_bfr);
        let gate_message = match bfr_gate.outcome {
            BfrGateOutcome::Passed => None,
            BfrGateOutcome::Failed => Some("pressure outside the safe band or unusable; overall score set to 0"),
            BfrGateOutcome::NotApplied => Some("no BFR parameters; safety gate not applied"),
            BfrGateOutcome::MissingRequired => Some("BFR parameters required but missing; overall score set to 0"),
        };
        drop(partial);
        if let Some(message) = gate_message {
            warn!(outcome = ?bfr_gate.outcome, "{}", message);
            annotations.insert(
                "scores.bfr".to_string(),
                Annotation::new(AnnotationKind::SafetyGate, message),
            );
        }

        let overall_score = if bfr_gate.zeroes_overall() { 0.0 } else { weighted_score };

        debug!(overall_score, weighted_score, is_partial, "session scored");

        let scores = PerformanceScores {
            overall_score,
            compliance_score: compliance,
            symmetry_score: symmetry,
            effort_score: effort,
            game_score: game,
            component_breakdown: ComponentBreakdown {
                muscles,
                side_compliance,
                configured_weights: self.config.weights,
                effective_weights,
                policy: self.config.missing_component_policy,
                weighted_score,
            },
            bfr_gate,
            is_partial,
        };

        Ok((scores, annotations))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
