// src/scoring/bfr.rs
//! Blood flow restriction safety gate
//!
//! Applied cuff pressure must stay inside a band relative to arterial
//! occlusion pressure. The gate overrides the weighted score instead of
//! contributing to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::scoring_config::BfrSafetyBand;
use crate::types::Side;

/// BFR cuff parameters of one limb
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfrParameters {
    /// Arterial occlusion pressure in mmHg
    pub aop_mmhg: Option<f64>,
    pub applied_pressure_mmhg: Option<f64>,
    /// Applied pressure as a percentage of AOP; derived when absent
    pub percentage_aop: Option<f64>,
    /// Per-limb therapeutic band; can only narrow the configured one
    pub therapeutic_range_min: Option<f64>,
    pub therapeutic_range_max: Option<f64>,
}

impl BfrParameters {
    pub fn new(aop_mmhg: f64, applied_pressure_mmhg: f64) -> Self {
        Self {
            aop_mmhg: Some(aop_mmhg),
            applied_pressure_mmhg: Some(applied_pressure_mmhg),
            ..Default::default()
        }
    }

    /// Percentage of AOP, given or derived from the pressures
    pub fn percentage(&self) -> Option<f64> {
        if let Some(percentage) = self.percentage_aop {
            return percentage.is_finite().then_some(percentage);
        }
        match (self.aop_mmhg, self.applied_pressure_mmhg) {
            (Some(aop), Some(applied)) if aop > 0.0 && applied.is_finite() => Some(applied * 100.0 / aop),
            _ => None,
        }
    }

    /// Band this limb is judged against: the configured band intersected
    /// with the limb's therapeutic range
    ///
    /// The result may be empty (`min_percent > max_percent`) when the two do
    /// not overlap, in which case no pressure is compliant.
    pub fn band(&self, configured: &BfrSafetyBand) -> BfrSafetyBand {
        let min_percent = match self.therapeutic_range_min {
            Some(min) if min.is_finite() => min.max(configured.min_percent),
            _ => configured.min_percent,
        };
        let max_percent = match self.therapeutic_range_max {
            Some(max) if max.is_finite() => max.min(configured.max_percent),
            _ => configured.max_percent,
        };
        BfrSafetyBand { min_percent, max_percent }
    }

    /// The limb's own therapeutic range when both ends are given
    pub fn therapeutic_range(&self) -> Option<(f64, f64)> {
        self.therapeutic_range_min.zip(self.therapeutic_range_max)
    }
}

/// BFR parameters for both limbs of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfrSessionParameters {
    pub left: Option<BfrParameters>,
    pub right: Option<BfrParameters>,
}

impl BfrSessionParameters {
    pub fn get(&self, side: Side) -> Option<&BfrParameters> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }
}

/// Evaluation of one limb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BfrSideAssessment {
    /// `None` when the supplied parameters yield no usable percentage
    pub percentage_aop: Option<f64>,
    /// Effective band the percentage was judged against
    pub range_min: f64,
    pub range_max: f64,
    /// Therapeutic range supplied for the limb, reported as given
    pub therapeutic_range: Option<(f64, f64)>,
    pub is_compliant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BfrGateOutcome {
    /// Every limb with parameters lies inside its band
    Passed,
    /// At least one limb lies outside its band or has unusable parameters
    Failed,
    /// No usable parameters and none required
    NotApplied,
    /// No usable parameters although the configuration requires them
    MissingRequired,
}

/// Result of the BFR safety gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BfrGate {
    pub outcome: BfrGateOutcome,
    pub sides: BTreeMap<Side, BfrSideAssessment>,
}

impl BfrGate {
    /// Whether the gate forces the overall score to zero
    pub fn zeroes_overall(&self) -> bool {
        matches!(self.outcome, BfrGateOutcome::Failed | BfrGateOutcome::MissingRequired)
    }
}

/// Evaluate the gate over every limb that carries parameters
///
/// A supplied limb whose percentage cannot be derived is never compliant.
pub fn evaluate_bfr_gate(params: &BfrSessionParameters, band: &BfrSafetyBand, require_bfr: bool) -> BfrGate {
    let mut sides = BTreeMap::new();

    for side in [Side::Left, Side::Right] {
        let Some(limb) = params.get(side) else {
            continue;
        };
        let percentage = limb.percentage();
        let limb_band = limb.band(band);
        sides.insert(
            side,
            BfrSideAssessment {
                percentage_aop: percentage,
                range_min: limb_band.min_percent,
                range_max: limb_band.max_percent,
                therapeutic_range: limb.therapeutic_range(),
                is_compliant: percentage.is_some_and(|p| limb_band.contains(p)),
            },
        );
    }

    let outcome = if sides.is_empty() {
        if require_bfr {
            BfrGateOutcome::MissingRequired
        } else {
            BfrGateOutcome::NotApplied
        }
    } else if sides.values().all(|s| s.is_compliant) {
        BfrGateOutcome::Passed
    } else {
        BfrGateOutcome::Failed
    };

    BfrGate { outcome, sides }
}
