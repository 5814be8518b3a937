// tests/error_propagation_tests.rs
//! Error propagation and handling tests
//!
//! This module checks that:
//! - Structural problems are reported as validation errors before processing
//! - Validation failures carry the structured context callers need
//! - Degenerate metrics and missing inputs become annotations, not errors
//! - Configuration errors convert into the unified error type

mod common;

use common::{bilateral_session, sine, FS};
use emg_analytics::config::{AnalysisConfig, ConfigError, ConfigLoader};
use emg_analytics::error::{AnalyticsError, ErrorContext, ValidationFailure};
use emg_analytics::session::{SessionAggregator, SessionInput};
use emg_analytics::types::{AnnotationKind, EmgChannel};

fn failure_of(input: &SessionInput) -> ValidationFailure {
    let err = SessionAggregator::new(AnalysisConfig::default())
        .analyze(input)
        .expect_err("session should be rejected");
    assert!(err.is_validation(), "expected validation error, got {:?}", err);
    err.validation_failure().cloned().expect("validation failure")
}

#[test]
fn test_too_short_channel_rejected_with_durations() {
    let input = SessionInput::new(vec![EmgChannel::new("CH1", sine(80.0, 0.4, 1.0), FS)]);

    match failure_of(&input) {
        ValidationFailure::SignalTooShort {
            channel,
            found_samples,
            required_samples,
            found_ms,
            required_ms,
        } => {
            assert_eq!(channel, "CH1");
            assert_eq!(found_samples, 400);
            assert_eq!(required_samples, 1000);
            assert_eq!(found_ms, 400.0);
            assert_eq!(required_ms, 1000.0);
        }
        other => panic!("Expected SignalTooShort, got {:?}", other),
    }
}

#[test]
fn test_one_bad_channel_fails_whole_session() {
    let mut input = bilateral_session(2);
    input.channels[1].raw_samples[10] = f64::INFINITY;

    assert_eq!(
        failure_of(&input),
        ValidationFailure::NonFiniteSample {
            channel: "CH2".to_string(),
            index: 10
        }
    );
}

#[test]
fn test_duplicate_and_empty_sessions() {
    assert_eq!(failure_of(&SessionInput::default()), ValidationFailure::NoChannels);

    let mut input = bilateral_session(2);
    input.channels[1].name = "CH1".to_string();
    assert!(matches!(failure_of(&input), ValidationFailure::DuplicateChannel { channel } if channel == "CH1"));
}

#[test]
fn test_sampling_rate_out_of_range() {
    let input = SessionInput::new(vec![EmgChannel::new("CH1", vec![0.0; 100_000], 50_000.0)]);
    match failure_of(&input) {
        ValidationFailure::SamplingRateOutOfRange { found_hz, max_hz, .. } => {
            assert_eq!(found_hz, 50_000.0);
            assert_eq!(max_hz, 20_000.0);
        }
        other => panic!("Expected SamplingRateOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_signal_too_long() {
    let mut config = AnalysisConfig::default();
    config.signal.max_duration_s = 5.0;
    let input = SessionInput::new(vec![EmgChannel::new("CH1", sine(80.0, 6.0, 1.0), FS)]);

    let err = SessionAggregator::new(config).analyze(&input).unwrap_err();
    assert!(matches!(err.validation_failure(), Some(ValidationFailure::SignalTooLong { .. })));
}

#[test]
fn test_invalid_session_parameters() {
    let mut input = bilateral_session(2);
    input.session_parameters.post_session_rpe = Some(12);
    assert!(matches!(
        failure_of(&input),
        ValidationFailure::InvalidParameter { field, .. } if field == "post_session_rpe"
    ));

    let mut input = bilateral_session(2);
    input.session_parameters.mvc_values_by_channel.insert("CH1".to_string(), -1.0);
    assert!(matches!(
        failure_of(&input),
        ValidationFailure::InvalidParameter { field, .. } if field == "mvc_values_by_channel.CH1"
    ));
}

#[test]
fn test_validation_error_display() {
    let input = SessionInput::new(vec![EmgChannel::new("CH1", sine(80.0, 0.4, 1.0), FS)]);
    let err = SessionAggregator::default().analyze(&input).unwrap_err();

    let display = err.to_string();
    assert!(display.contains("[VALIDATION]"));
    assert!(display.contains("'CH1' is too short"));
    assert!(display.contains("validate"));

    match &err {
        AnalyticsError::Validation { context, .. } => {
            assert_eq!(context.component, "session");
            assert!(context.file.is_some());
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[test]
fn test_degenerate_metrics_are_annotations() {
    let input = SessionInput::new(vec![EmgChannel::new("FLAT", vec![0.0; 3000], FS)]);
    let result = SessionAggregator::default().analyze(&input).expect("flat channel is not an error");

    let flat = &result.channels["FLAT"];
    assert_eq!(flat.contraction_count, 0);
    assert!(flat.mpf_hz.is_none());
    assert!(flat.fatigue_index_fi_nsm5.is_none());

    for key in ["channels.FLAT.mpf_hz", "channels.FLAT.mdf_hz", "channels.FLAT.fatigue_index"] {
        assert_eq!(result.annotations[key].kind, AnnotationKind::NumericDegenerate, "{}", key);
    }
}

#[test]
fn test_config_errors_convert() {
    let err = ConfigLoader::from_toml_str("[detection]\nthreshold_factor = 2.0").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(ref failures) if failures.len() == 1));

    let analytics_error: AnalyticsError = err.into();
    match analytics_error {
        AnalyticsError::Configuration { reason, .. } => assert!(reason.contains("threshold_factor")),
        other => panic!("Expected configuration error, got {:?}", other),
    }

    let parse_error = ConfigLoader::from_toml_str("[detection\nbroken").unwrap_err();
    assert!(matches!(parse_error, ConfigError::ParseError(_)));
}

#[test]
fn test_error_context_additional_info() {
    let context = ErrorContext::new("session", "analyze_channel").add_info("channel", "CH3");
    assert_eq!(context.additional_info["channel"], "CH3");
}
