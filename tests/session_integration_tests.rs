// tests/session_integration_tests.rs
//! End-to-end session analysis tests
//!
//! These run complete synthetic sessions through the aggregator and check
//! the assembled result: per-channel analytics, scores, metadata,
//! annotations and JSON output.

mod common;

use common::{bilateral_session, noisy_bursts, schedule, FS};
use emg_analytics::config::{AnalysisConfig, ConfigLoader, EnvelopeMethod};
use emg_analytics::scoring::{BfrGateOutcome, BfrParameters, GameScore};
use emg_analytics::session::{SessionAggregator, SessionInput, SessionResult};
use emg_analytics::types::{AnnotationKind, EmgChannel, Side};

fn analyze(input: &SessionInput) -> SessionResult {
    SessionAggregator::new(AnalysisConfig::default())
        .analyze(input)
        .expect("session should analyse")
}

#[test]
fn test_bilateral_session_end_to_end() {
    let result = analyze(&bilateral_session(4));

    assert_eq!(result.channels.len(), 2);
    for (name, analytics) in &result.channels {
        assert_eq!(analytics.contraction_count, 4, "channel {}", name);
        assert_eq!(analytics.contraction_count, analytics.contractions.len());
        assert!(analytics.good_contraction_count <= analytics.contraction_count);
        assert_eq!(analytics.good_contraction_count, 4);
        assert!(!analytics.thresholds.mvc_estimated);

        for contraction in &analytics.contractions {
            assert!((contraction.duration_ms - 3000.0).abs() < 150.0, "duration {}", contraction.duration_ms);
            assert!(contraction.is_good);
        }
        assert!(analytics.mpf_hz.is_some());
        assert!(analytics.mdf_hz.is_some());
    }

    let scores = &result.scores;
    assert_eq!(scores.symmetry_score, Some(100.0));
    assert_eq!(scores.effort_score, Some(100.0));
    assert!(scores.game_score.is_none());
    assert!(scores.is_partial);
    assert!((scores.overall_score - 100.0).abs() < 1e-6);
    assert_eq!(scores.bfr_gate.outcome, BfrGateOutcome::NotApplied);

    assert_eq!(result.annotations["scores.game"].kind, AnnotationKind::PartialScoring);
    assert_eq!(result.annotations["scores.bfr"].kind, AnnotationKind::SafetyGate);
}

#[test]
fn test_percentages_within_bounds() {
    let mut input = bilateral_session(3);
    input.session_parameters.game_score = Some(GameScore {
        points: 40.0,
        max_points: 50.0,
    });
    let result = analyze(&input);
    let scores = &result.scores;

    for value in [
        Some(scores.overall_score),
        scores.compliance_score,
        scores.symmetry_score,
        scores.effort_score,
        scores.game_score,
    ]
    .into_iter()
    .flatten()
    {
        assert!((0.0..=100.0).contains(&value), "{} out of range", value);
    }
    assert_eq!(scores.game_score, Some(80.0));
}

#[test]
fn test_bfr_violation_zeroes_overall() {
    let mut input = bilateral_session(3);
    input.session_parameters.bfr_parameters.left = Some(BfrParameters::new(200.0, 100.0));
    input.session_parameters.bfr_parameters.right = Some(BfrParameters::new(200.0, 150.0));

    let result = analyze(&input);
    assert_eq!(result.scores.overall_score, 0.0);
    assert_eq!(result.scores.bfr_gate.outcome, BfrGateOutcome::Failed);
    assert!(result.scores.component_breakdown.weighted_score > 0.0);
    assert!(!result.scores.bfr_gate.sides[&Side::Right].is_compliant);
}

#[test]
fn test_bfr_compliant_keeps_weighted_score() {
    let mut input = bilateral_session(3);
    input.session_parameters.bfr_parameters.left = Some(BfrParameters::new(180.0, 90.0));
    input.session_parameters.bfr_parameters.right = Some(BfrParameters::new(180.0, 90.0));

    let result = analyze(&input);
    assert_eq!(result.scores.bfr_gate.outcome, BfrGateOutcome::Passed);
    assert_eq!(
        result.scores.overall_score,
        result.scores.component_breakdown.weighted_score
    );
    assert!(!result.annotations.contains_key("scores.bfr"));
}

#[test]
fn test_results_are_deterministic() {
    let input = bilateral_session(3);
    let aggregator = SessionAggregator::default();

    let first = aggregator.analyze(&input).unwrap();
    let second = aggregator.analyze(&input).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_json_output_shape() {
    let result = analyze(&bilateral_session(2));
    let value = result.to_value().unwrap();

    assert!(value["channels"]["CH1"]["contraction_count"].is_u64());
    assert!(value["scores"]["overall_score"].is_number());
    assert_eq!(value["metadata"]["scoring_config_name"], "default");
    assert_eq!(value["metadata"]["channel_sides"]["CH1"], "left");
    assert_eq!(value["metadata"]["channel_sides"]["CH2"], "right");

    let pretty = result.to_json_pretty().unwrap();
    let parsed: SessionResult = serde_json::from_str(&pretty).unwrap();
    assert_eq!(parsed.channels.len(), 2);
}

#[test]
fn test_session_overrides_recorded_in_metadata() {
    let mut input = bilateral_session(2);
    input.session_parameters.min_duration_ms = Some(500.0);
    input.session_parameters.mvc_threshold_percentage = Some(50.0);

    let result = analyze(&input);
    assert_eq!(result.metadata.detection.min_duration_ms, 500.0);
    assert_eq!(result.metadata.scoring.mvc_threshold_percentage, 50.0);
    assert_eq!(result.channels["CH1"].thresholds.intensity_threshold, 0.25);
}

#[test]
fn test_single_channel_session_is_partial() {
    let bursts = schedule(2, 3.0, 5.0);
    let input = SessionInput::new(vec![EmgChannel::new(
        "CH1",
        noisy_bursts(7, 12.0, &bursts, 1.0, 0.01),
        FS,
    )]);

    let result = analyze(&input);
    assert!(result.scores.symmetry_score.is_none());
    assert!(result.scores.is_partial);
    assert!(result.channels["CH1"].thresholds.mvc_estimated);
    assert_eq!(result.annotations["channels.CH1.mvc_value"].kind, AnnotationKind::Estimated);
    assert!(result.annotations.contains_key("scores.compliance.CH1.completion"));
}

#[test]
fn test_moving_rms_envelope() {
    let mut config = AnalysisConfig::default();
    config.conditioning.envelope_method = EnvelopeMethod::MovingRms;
    config.conditioning.decimation_factor = Some(10);

    let result = SessionAggregator::new(config).analyze(&bilateral_session(3)).unwrap();
    let ch1 = &result.channels["CH1"];
    assert_eq!(ch1.envelope_rate_hz, 100.0);
    assert_eq!(ch1.contraction_count, 3);
    assert!(ch1.contractions.iter().all(|c| c.end_index <= 1700));
}

#[test]
fn test_config_from_toml_drives_analysis() {
    let config = ConfigLoader::from_toml_str(
        r#"
        [detection]
        min_duration_ms = 4000.0

        [scoring]
        name = "strict"
        version = "2.1.0"
        "#,
    )
    .unwrap();

    let result = SessionAggregator::new(config).analyze(&bilateral_session(3)).unwrap();
    // Three-second bursts no longer qualify as contractions
    assert_eq!(result.channels["CH1"].contraction_count, 0);
    assert_eq!(result.metadata.scoring_config_name, "strict");
    assert_eq!(result.metadata.scoring_config_version, "2.1.0");
}
