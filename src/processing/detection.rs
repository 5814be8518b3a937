// src/processing/detection.rs
//! Contraction detection on amplitude envelopes
//!
//! The detector is a small state machine driven sample by sample:
//!
//! - `Idle` to `InContraction` when the envelope reaches the threshold.
//! - `InContraction` closes when the envelope falls below the threshold. A
//!   candidate that lasted at least `min_duration_ms` is emitted and the
//!   detector becomes `Refractory`; shorter candidates are dropped.
//! - A crossing that starts within `merge_threshold_ms` of the previous
//!   emitted contraction re-opens it. This check runs before the refractory
//!   rule.
//! - Any other crossing during `Refractory` is suppressed until the envelope
//!   falls below the threshold again, even if that is after refractory ends.
//!
//! Classification against intensity and duration thresholds is a separate
//! step, see [`classify`].

use tracing::debug;

use crate::config::processing_config::DetectionConfig;
use crate::config::scoring_config::{AmplitudeMeasure, DurationThreshold};
use crate::types::Contraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    Idle,
    InContraction { start: usize },
    Refractory { until: usize },
}

/// Threshold-crossing contraction detector for one envelope rate
#[derive(Debug, Clone)]
pub struct ContractionDetector {
    config: DetectionConfig,
    sample_rate: f64,
}

impl ContractionDetector {
    pub fn new(config: &DetectionConfig, sample_rate: f64) -> Self {
        Self {
            config: config.clone(),
            sample_rate,
        }
    }

    /// Onset threshold for an MVC reference value
    pub fn threshold(&self, mvc_reference: f64) -> f64 {
        mvc_reference * self.config.threshold_factor
    }

    fn samples_to_ms(&self, samples: usize) -> f64 {
        samples as f64 / self.sample_rate * 1000.0
    }

    fn ms_to_samples(&self, ms: f64) -> usize {
        (ms * self.sample_rate / 1000.0).round() as usize
    }

    /// Detect contractions; all flags of the result are unset
    pub fn detect(&self, envelope: &[f64], mvc_reference: f64) -> Vec<Contraction> {
        let threshold = self.threshold(mvc_reference);
        if envelope.is_empty() || !(threshold > 0.0 && threshold.is_finite()) || !(self.sample_rate > 0.0) {
            return Vec::new();
        }

        let refractory = self.ms_to_samples(self.config.refractory_ms);
        let mut events: Vec<Contraction> = Vec::new();
        let mut state = DetectorState::Idle;
        let mut suppressed = false;

        for (i, &value) in envelope.iter().enumerate() {
            let above = value >= threshold;

            state = match state {
                DetectorState::InContraction { start } => {
                    if above {
                        state
                    } else {
                        self.close(envelope, start, i, refractory, &mut events)
                    }
                }
                DetectorState::Idle | DetectorState::Refractory { .. } => {
                    let resting = match state {
                        DetectorState::Refractory { until } if i < until => state,
                        _ => DetectorState::Idle,
                    };

                    if suppressed {
                        suppressed = above;
                        resting
                    } else if !above {
                        resting
                    } else if let Some(start) = self.merge_candidate(&events, i) {
                        events.pop();
                        DetectorState::InContraction { start }
                    } else if resting != DetectorState::Idle {
                        suppressed = true;
                        resting
                    } else {
                        DetectorState::InContraction { start: i }
                    }
                }
            };
        }

        if let DetectorState::InContraction { start } = state {
            self.close(envelope, start, envelope.len(), refractory, &mut events);
        }

        debug!(
            contractions = events.len(),
            threshold,
            samples = envelope.len(),
            "contraction detection complete"
        );
        events
    }

    /// Start index of the previous contraction when a crossing at `i` merges into it
    fn merge_candidate(&self, events: &[Contraction], i: usize) -> Option<usize> {
        let last = events.last()?;
        let gap_ms = self.samples_to_ms(i.saturating_sub(last.end_index));
        (gap_ms <= self.config.merge_threshold_ms).then_some(last.start_index)
    }

    fn close(
        &self,
        envelope: &[f64],
        start: usize,
        end: usize,
        refractory: usize,
        events: &mut Vec<Contraction>,
    ) -> DetectorState {
        let duration_ms = self.samples_to_ms(end - start);
        if duration_ms < self.config.min_duration_ms {
            return DetectorState::Idle;
        }

        events.push(self.build(envelope, start, end));
        DetectorState::Refractory {
            until: end + refractory,
        }
    }

    fn build(&self, envelope: &[f64], start: usize, end: usize) -> Contraction {
        let span = &envelope[start..end];
        let peak = span.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = span.iter().sum::<f64>() / span.len() as f64;

        Contraction {
            start_index: start,
            end_index: end,
            start_time_ms: self.samples_to_ms(start),
            end_time_ms: self.samples_to_ms(end),
            duration_ms: self.samples_to_ms(end - start),
            peak_amplitude: peak,
            mean_amplitude: mean,
            meets_mvc: false,
            meets_duration: false,
            is_good: false,
        }
    }
}

/// Source of the duration threshold used to classify contractions
pub trait DurationThresholdPolicy {
    /// Threshold in milliseconds given the detected contraction durations
    fn threshold_ms(&self, durations_ms: &[f64]) -> f64;
}

impl DurationThresholdPolicy for DurationThreshold {
    fn threshold_ms(&self, durations_ms: &[f64]) -> f64 {
        match *self {
            DurationThreshold::Fixed { ms } => ms,
            DurationThreshold::AdaptivePercentile { percentile, min_ms, max_ms } => {
                match percentile_of(durations_ms, percentile) {
                    Some(value) => value.clamp(min_ms, max_ms),
                    None => min_ms,
                }
            }
        }
    }
}

/// Linear-interpolated percentile (0-100) of unsorted values
pub fn percentile_of(values: &[f64], percentile: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (percentile.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Set the classification flags of detected contractions
///
/// Returns the duration threshold the policy produced.
pub fn classify(
    contractions: &mut [Contraction],
    intensity_threshold: f64,
    measure: AmplitudeMeasure,
    policy: &dyn DurationThresholdPolicy,
) -> f64 {
    let durations: Vec<f64> = contractions.iter().map(|c| c.duration_ms).collect();
    let duration_threshold_ms = policy.threshold_ms(&durations);

    for contraction in contractions.iter_mut() {
        let amplitude = match measure {
            AmplitudeMeasure::Peak => contraction.peak_amplitude,
            AmplitudeMeasure::Mean => contraction.mean_amplitude,
        };
        contraction.meets_mvc = amplitude >= intensity_threshold;
        contraction.meets_duration = contraction.duration_ms >= duration_threshold_ms;
        contraction.is_good = contraction.meets_mvc && contraction.meets_duration;
    }

    duration_threshold_ms
}
