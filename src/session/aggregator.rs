// src/session/aggregator.rs
//! Session aggregator: fans channels out to the processing stages and joins
//! the results into a scored [`SessionResult`]

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, debug_span, info, info_span};

use crate::config::processing_config::EnvelopeSource;
use crate::config::AnalysisConfig;
use crate::error::{AnalyticsError, AnalyticsResult, ProcessingStage};
use crate::error_context;
use crate::processing::conditioning::SignalConditioner;
use crate::processing::detection::{classify, ContractionDetector};
use crate::processing::features::{MetricsCalculator, MetricsInput};
use crate::processing::filters::FilterError;
use crate::scoring::{MuscleInput, PerformanceScorer, ScoringInput};
use crate::session::validation::{SessionValidator, Validator};
use crate::session::{SessionInput, SessionMetadata, SessionParameters, SessionResult};
use crate::types::{Annotation, AnnotationKind, Annotations, ChannelAnalytics, ChannelThresholds, EmgChannel};

/// Analytics of one channel before the join
struct ChannelOutcome {
    name: String,
    analytics: ChannelAnalytics,
    annotations: Annotations,
}

/// Stateless session analyzer bound to a base configuration
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    config: AnalysisConfig,
}

impl SessionAggregator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Validate, process every channel, score and assemble the result
    ///
    /// Either the whole session succeeds or an error is returned; no partial
    /// result is ever produced.
    pub fn analyze(&self, input: &SessionInput) -> AnalyticsResult<SessionResult> {
        let span = info_span!("analyze_session", channels = input.channels.len());
        let _enter = span.enter();

        let parameters = &input.session_parameters;
        let config = parameters.apply_to(&self.config);
        SessionValidator::new(&config).validate(input)?;

        let outcomes = input
            .channels
            .par_iter()
            .map(|channel| analyze_channel(&config, parameters, channel))
            .collect::<AnalyticsResult<Vec<_>>>()?;

        let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
        let sides = parameters.resolve_sides(&names);

        let scoring_input = ScoringInput {
            muscles: outcomes
                .iter()
                .map(|outcome| MuscleInput {
                    name: &outcome.name,
                    side: sides.get(&outcome.name).copied(),
                    analytics: &outcome.analytics,
                    expected_contractions: parameters.expected_contractions_by_channel.get(&outcome.name).copied(),
                })
                .collect(),
            post_session_rpe: parameters.post_session_rpe,
            game_score: parameters.game_score,
            bfr: parameters.bfr_parameters.clone(),
        };
        let (scores, score_annotations) = PerformanceScorer::new(&config.scoring).score(&scoring_input)?;

        let mut annotations = Annotations::new();
        let mut channels = BTreeMap::new();
        for outcome in outcomes {
            annotations.extend(outcome.annotations);
            channels.insert(outcome.name, outcome.analytics);
        }
        annotations.extend(score_annotations);

        info!(
            overall_score = scores.overall_score,
            is_partial = scores.is_partial,
            annotations = annotations.len(),
            "session analysed"
        );

        Ok(SessionResult {
            channels,
            scores,
            metadata: metadata(&config, parameters, sides),
            annotations,
        })
    }
}

fn metadata(
    config: &AnalysisConfig,
    parameters: &SessionParameters,
    channel_sides: BTreeMap<String, crate::types::Side>,
) -> SessionMetadata {
    SessionMetadata {
        engine_version: crate::VERSION.to_string(),
        scoring_config_name: config.scoring.name.clone(),
        scoring_config_version: config.scoring.version.clone(),
        channel_sides,
        session_parameters: parameters.clone(),
        detection: config.detection.clone(),
        scoring: config.scoring.clone(),
    }
}

fn stage_error(stage: ProcessingStage, channel: &str, err: FilterError) -> AnalyticsError {
    AnalyticsError::Processing {
        stage,
        reason: err.to_string(),
        context: error_context!("session", "analyze_channel").add_info("channel", channel),
    }
}

/// Conditioning, detection, classification and metrics for one channel
fn analyze_channel(
    config: &AnalysisConfig,
    parameters: &SessionParameters,
    channel: &EmgChannel,
) -> AnalyticsResult<ChannelOutcome> {
    let span = debug_span!("analyze_channel", channel = %channel.name);
    let _enter = span.enter();

    let name = channel.name.as_str();
    let fs = channel.sampling_rate_hz;
    let conditioning = |e| stage_error(ProcessingStage::Conditioning, name, e);

    let conditioner = SignalConditioner::new(&config.conditioning, fs).map_err(conditioning)?;
    let conditioned = conditioner.condition(&channel.raw_samples).map_err(conditioning)?;

    let envelope = match (&channel.activated_samples, config.conditioning.envelope_source) {
        (Some(activated), EnvelopeSource::PreActivated) => {
            debug!("using device activation envelope");
            conditioner.prepare_activated(activated).map_err(conditioning)?
        }
        _ => conditioned.envelope,
    };
    let envelope_rate_hz = conditioned.envelope_rate_hz;

    let mut annotations = Annotations::new();
    let (mvc_value, mvc_estimated) = match parameters.mvc_values_by_channel.get(name) {
        Some(&mvc) => (mvc, false),
        None => {
            let peak = envelope.iter().copied().fold(0.0, f64::max);
            annotations.insert(
                format!("channels.{}.mvc_value", name),
                Annotation::new(
                    AnnotationKind::Estimated,
                    format!("no MVC supplied; estimated from the envelope peak {:.6}", peak),
                ),
            );
            (peak, true)
        }
    };

    let detector = ContractionDetector::new(&config.detection, envelope_rate_hz);
    let mut contractions = detector.detect(&envelope, mvc_value);

    let intensity_threshold = mvc_value * config.scoring.mvc_threshold_percentage / 100.0;
    let duration_threshold_ms = classify(
        &mut contractions,
        intensity_threshold,
        config.scoring.intensity_measure,
        &config.scoring.duration_threshold,
    );

    debug!(
        contractions = contractions.len(),
        mvc_value,
        mvc_estimated,
        duration_threshold_ms,
        "contractions detected"
    );

    let thresholds = ChannelThresholds {
        mvc_value,
        mvc_estimated,
        detection_threshold: detector.threshold(mvc_value),
        intensity_threshold,
        duration_threshold_ms,
    };

    let (analytics, metric_annotations) = MetricsCalculator::new(&config.features, fs).compute(MetricsInput {
        channel: name,
        raw: &channel.raw_samples,
        envelope: &envelope,
        envelope_rate_hz,
        contractions,
        thresholds,
    });
    annotations.extend(metric_annotations);

    Ok(ChannelOutcome {
        name: channel.name.clone(),
        analytics,
        annotations,
    })
}
