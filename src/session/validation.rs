// src/session/validation.rs
//! Structural validation of a session before any processing starts

use std::collections::BTreeSet;

use crate::config::constants::effort::MAX_RPE;
use crate::config::processing_config::ConditioningConfig;
use crate::config::{AnalysisConfig, SignalLimits};
use crate::error::{AnalyticsError, ValidationFailure};
use crate::error_context;
use crate::processing::conditioning;
use crate::session::{SessionInput, SessionParameters};
use crate::types::{EmgChannel, Side};

pub trait Validator<T: ?Sized> {
    type Error;
    fn validate(&self, input: &T) -> Result<(), Self::Error>;
}

/// Checks a single channel against the signal limits
pub struct ChannelValidator<'a> {
    limits: &'a SignalLimits,
    conditioning: &'a ConditioningConfig,
}

impl<'a> ChannelValidator<'a> {
    pub fn new(limits: &'a SignalLimits, conditioning: &'a ConditioningConfig) -> Self {
        Self { limits, conditioning }
    }

    /// Fewest samples a channel at `sample_rate` must carry
    pub fn required_samples(&self, sample_rate: f64) -> Result<usize, ValidationFailure> {
        let filters = conditioning::min_samples_required(self.conditioning, sample_rate).map_err(|e| {
            ValidationFailure::MalformedConfig {
                field: "conditioning".to_string(),
                reason: e.to_string(),
            }
        })?;
        let duration = (self.limits.min_duration_s * sample_rate).ceil() as usize;
        Ok(filters.max(duration))
    }
}

impl Validator<EmgChannel> for ChannelValidator<'_> {
    type Error = ValidationFailure;

    fn validate(&self, channel: &EmgChannel) -> Result<(), Self::Error> {
        let fs = channel.sampling_rate_hz;
        if !(fs >= self.limits.min_sampling_rate_hz && fs <= self.limits.max_sampling_rate_hz) {
            return Err(ValidationFailure::SamplingRateOutOfRange {
                channel: channel.name.clone(),
                found_hz: fs,
                min_hz: self.limits.min_sampling_rate_hz,
                max_hz: self.limits.max_sampling_rate_hz,
            });
        }

        if let Some(index) = channel.raw_samples.iter().position(|x| !x.is_finite()) {
            return Err(ValidationFailure::NonFiniteSample {
                channel: channel.name.clone(),
                index,
            });
        }

        if let Some(activated) = &channel.activated_samples {
            if activated.len() != channel.raw_samples.len() {
                return Err(ValidationFailure::InvalidParameter {
                    field: format!("channels.{}.activated_samples", channel.name),
                    value: activated.len().to_string(),
                    reason: format!("length must match the {} raw samples", channel.raw_samples.len()),
                });
            }
            if let Some(index) = activated.iter().position(|x| !x.is_finite()) {
                return Err(ValidationFailure::NonFiniteSample {
                    channel: channel.name.clone(),
                    index,
                });
            }
        }

        let found_samples = channel.raw_samples.len();
        let found_ms = found_samples as f64 / fs * 1000.0;

        let max_ms = self.limits.max_duration_s * 1000.0;
        if found_ms > max_ms {
            return Err(ValidationFailure::SignalTooLong {
                channel: channel.name.clone(),
                found_samples,
                found_ms,
                max_ms,
            });
        }

        let required_samples = self.required_samples(fs)?;
        if found_samples < required_samples {
            return Err(ValidationFailure::SignalTooShort {
                channel: channel.name.clone(),
                found_samples,
                required_samples,
                found_ms,
                required_ms: required_samples as f64 / fs * 1000.0,
            });
        }

        Ok(())
    }
}

/// Checks the per-session parameters not covered by the configuration
pub struct ParameterValidator;

impl Validator<SessionParameters> for ParameterValidator {
    type Error = ValidationFailure;

    fn validate(&self, parameters: &SessionParameters) -> Result<(), Self::Error> {
        if let Some(rpe) = parameters.post_session_rpe {
            if rpe > MAX_RPE {
                return Err(ValidationFailure::InvalidParameter {
                    field: "post_session_rpe".to_string(),
                    value: rpe.to_string(),
                    reason: format!("must be between 0 and {}", MAX_RPE),
                });
            }
        }

        for (channel, &mvc) in &parameters.mvc_values_by_channel {
            if !(mvc > 0.0 && mvc.is_finite()) {
                return Err(ValidationFailure::InvalidParameter {
                    field: format!("mvc_values_by_channel.{}", channel),
                    value: mvc.to_string(),
                    reason: "must be positive and finite".to_string(),
                });
            }
        }

        for side in [Side::Left, Side::Right] {
            let Some(limb) = parameters.bfr_parameters.get(side) else {
                continue;
            };
            if limb.percentage().is_none() {
                return Err(ValidationFailure::InvalidParameter {
                    field: format!("bfr_parameters.{}", side.as_str()),
                    value: format!(
                        "aop={:?} applied={:?} percentage={:?}",
                        limb.aop_mmhg, limb.applied_pressure_mmhg, limb.percentage_aop
                    ),
                    reason: "percentage of AOP must be finite or derivable from a positive AOP".to_string(),
                });
            }
        }

        if let Some(game) = &parameters.game_score {
            if !(game.points.is_finite() && game.max_points.is_finite()) {
                return Err(ValidationFailure::InvalidParameter {
                    field: "game_score".to_string(),
                    value: format!("{}/{}", game.points, game.max_points),
                    reason: "points must be finite".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Fail-fast validation of a whole session against an effective configuration
pub struct SessionValidator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> SessionValidator<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    fn check(&self, input: &SessionInput) -> Result<(), ValidationFailure> {
        if let Err(mut failures) = self.config.validate_consistency() {
            return Err(failures.remove(0));
        }

        if input.channels.is_empty() {
            return Err(ValidationFailure::NoChannels);
        }
        if input.channels.len() > self.config.signal.max_channel_count {
            return Err(ValidationFailure::InvalidParameter {
                field: "channels".to_string(),
                value: input.channels.len().to_string(),
                reason: format!("at most {} channels are supported", self.config.signal.max_channel_count),
            });
        }

        let mut seen = BTreeSet::new();
        for channel in &input.channels {
            if !seen.insert(channel.name.as_str()) {
                return Err(ValidationFailure::DuplicateChannel {
                    channel: channel.name.clone(),
                });
            }
        }

        let channels = ChannelValidator::new(&self.config.signal, &self.config.conditioning);
        for channel in &input.channels {
            channels.validate(channel)?;
        }

        let parameters = &input.session_parameters;
        ParameterValidator.validate(parameters)?;

        if let Some(unknown) = parameters.channel_sides.keys().find(|name| !seen.contains(name.as_str())) {
            return Err(ValidationFailure::InvalidParameter {
                field: "channel_sides".to_string(),
                value: unknown.clone(),
                reason: "names a channel that is not in the session".to_string(),
            });
        }

        Ok(())
    }
}

impl Validator<SessionInput> for SessionValidator<'_> {
    type Error = AnalyticsError;

    fn validate(&self, input: &SessionInput) -> Result<(), Self::Error> {
        self.check(input)
            .map_err(|failure| AnalyticsError::validation(failure, error_context!("session", "validate")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::BfrParameters;

    fn channel(name: &str, samples: usize, fs: f64) -> EmgChannel {
        let raw = (0..samples).map(|i| ((i % 7) as f64 - 3.0) * 0.01).collect();
        EmgChannel::new(name, raw, fs)
    }

    fn validate(input: &SessionInput) -> Result<(), ValidationFailure> {
        let config = AnalysisConfig::default();
        SessionValidator::new(&config).check(input)
    }

    #[test]
    fn test_valid_session() {
        let input = SessionInput::new(vec![channel("CH1", 2000, 1000.0), channel("CH2", 2000, 1000.0)]);
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_no_channels() {
        assert_eq!(validate(&SessionInput::default()), Err(ValidationFailure::NoChannels));
    }

    #[test]
    fn test_duplicate_channel() {
        let input = SessionInput::new(vec![channel("CH1", 2000, 1000.0), channel("CH1", 2000, 1000.0)]);
        assert!(matches!(validate(&input), Err(ValidationFailure::DuplicateChannel { .. })));
    }

    #[test]
    fn test_too_short_reports_durations() {
        let input = SessionInput::new(vec![channel("CH1", 500, 1000.0)]);
        match validate(&input) {
            Err(ValidationFailure::SignalTooShort {
                found_samples,
                required_samples,
                found_ms,
                required_ms,
                ..
            }) => {
                assert_eq!(found_samples, 500);
                assert_eq!(required_samples, 1000);
                assert_eq!(found_ms, 500.0);
                assert_eq!(required_ms, 1000.0);
            }
            other => panic!("Expected SignalTooShort, got {:?}", other),
        }
    }

    #[test]
    fn test_sampling_rate_range() {
        let input = SessionInput::new(vec![channel("CH1", 2000, 50.0)]);
        assert!(matches!(validate(&input), Err(ValidationFailure::SamplingRateOutOfRange { .. })));
    }

    #[test]
    fn test_non_finite_sample() {
        let mut ch = channel("CH1", 2000, 1000.0);
        ch.raw_samples[42] = f64::NAN;
        let failure = validate(&SessionInput::new(vec![ch])).unwrap_err();
        assert_eq!(
            failure,
            ValidationFailure::NonFiniteSample {
                channel: "CH1".to_string(),
                index: 42
            }
        );
    }

    #[test]
    fn test_activated_length_mismatch() {
        let ch = channel("CH1", 2000, 1000.0).with_activated(vec![0.0; 10]);
        assert!(matches!(
            validate(&SessionInput::new(vec![ch])),
            Err(ValidationFailure::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_parameter_checks() {
        let mut parameters = SessionParameters {
            post_session_rpe: Some(11),
            ..Default::default()
        };
        assert!(ParameterValidator.validate(&parameters).is_err());

        parameters.post_session_rpe = Some(10);
        parameters.mvc_values_by_channel.insert("CH1".to_string(), 0.0);
        assert!(ParameterValidator.validate(&parameters).is_err());

        parameters.mvc_values_by_channel.insert("CH1".to_string(), 0.5);
        assert!(ParameterValidator.validate(&parameters).is_ok());
    }

    #[test]
    fn test_unusable_bfr_side_rejected() {
        let mut parameters = SessionParameters::default();
        parameters.bfr_parameters.left = Some(BfrParameters::new(200.0, 100.0));
        parameters.bfr_parameters.right = Some(BfrParameters::new(0.0, 250.0));

        match ParameterValidator.validate(&parameters) {
            Err(ValidationFailure::InvalidParameter { field, .. }) => assert_eq!(field, "bfr_parameters.right"),
            other => panic!("expected invalid BFR parameter, got {:?}", other),
        }

        let nan = BfrParameters {
            percentage_aop: Some(f64::NAN),
            ..Default::default()
        };
        parameters.bfr_parameters.left = Some(nan);
        parameters.bfr_parameters.right = None;
        match ParameterValidator.validate(&parameters) {
            Err(ValidationFailure::InvalidParameter { field, .. }) => assert_eq!(field, "bfr_parameters.left"),
            other => panic!("expected invalid BFR parameter, got {:?}", other),
        }

        parameters.bfr_parameters.left = Some(BfrParameters {
            percentage_aop: Some(50.0),
            ..Default::default()
        });
        assert!(ParameterValidator.validate(&parameters).is_ok());
    }

    #[test]
    fn test_unusable_bfr_side_fails_session() {
        let mut parameters = SessionParameters::default();
        parameters.bfr_parameters.right = Some(BfrParameters::new(-10.0, 100.0));
        let input = SessionInput::new(vec![channel("CH1", 2000, 1000.0)]).with_parameters(parameters);

        let err = SessionValidator::new(&AnalysisConfig::default()).validate(&input).unwrap_err();
        assert!(matches!(
            err.validation_failure(),
            Some(ValidationFailure::InvalidParameter { field, .. }) if field == "bfr_parameters.right"
        ));
    }

    #[test]
    fn test_malformed_override_rejected() {
        let parameters = SessionParameters {
            merge_threshold_ms: Some(-5.0),
            ..Default::default()
        };
        let config = parameters.apply_to(&AnalysisConfig::default());
        let input = SessionInput::new(vec![channel("CH1", 2000, 1000.0)]).with_parameters(parameters);

        let err = SessionValidator::new(&config).validate(&input).unwrap_err();
        assert!(matches!(err.validation_failure(), Some(ValidationFailure::MalformedConfig { .. })));
    }

    #[test]
    fn test_unknown_side_channel() {
        let mut parameters = SessionParameters::default();
        parameters.channel_sides.insert("CH9".to_string(), crate::types::Side::Left);
        let input = SessionInput::new(vec![channel("CH1", 2000, 1000.0)]).with_parameters(parameters);
        assert!(validate(&input).is_err());
    }
}
