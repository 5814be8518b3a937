// src/config/processing_config.rs
//! Signal processing configuration structures

use serde::{Deserialize, Serialize};

use crate::config::constants::{detection, filters, spectral};
use crate::error::ValidationFailure;

/// Conditioning stage configuration (filtering + envelope extraction)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConditioningConfig {
    pub highpass_cutoff_hz: f64,
    pub lowpass_cutoff_hz: f64,
    pub filter_order: usize,
    pub envelope_method: EnvelopeMethod,
    pub rms_window_ms: f64,
    /// Integer block-mean decimation of the envelope; `None` keeps full rate
    pub decimation_factor: Option<usize>,
    pub envelope_source: EnvelopeSource,
}

/// Smoothing stage applied after rectification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeMethod {
    /// Zero-phase Butterworth low-pass of the rectified signal
    LowPass,
    /// Centred moving-window RMS of the band-limited signal
    MovingRms,
}

/// Which sequence drives contraction detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeSource {
    /// Envelope computed from the raw samples
    Conditioned,
    /// Device-computed activation channel when the recording carries one
    PreActivated,
}

/// Contraction detection configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Onset threshold as a fraction of the MVC reference
    pub threshold_factor: f64,
    pub min_duration_ms: f64,
    pub merge_threshold_ms: f64,
    pub refractory_ms: f64,
}

/// Metrics calculator configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeatureConfig {
    pub welch_segment_samples: usize,
    pub welch_overlap: f64,
    pub window_type: WindowType,
    pub band_low_hz: f64,
    pub band_high_hz: f64,
    pub fatigue_window_s: f64,
    /// Compute RMS/MAV/MPF/MDF per contraction window
    pub temporal_statistics: bool,
}

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Rectangular,
    Hamming,
    Hann,
    Blackman,
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        Self {
            highpass_cutoff_hz: filters::DEFAULT_HIGHPASS_CUTOFF_HZ,
            lowpass_cutoff_hz: filters::DEFAULT_LOWPASS_CUTOFF_HZ,
            filter_order: filters::DEFAULT_FILTER_ORDER,
            envelope_method: EnvelopeMethod::LowPass,
            rms_window_ms: filters::DEFAULT_RMS_WINDOW_MS,
            decimation_factor: None,
            envelope_source: EnvelopeSource::Conditioned,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold_factor: detection::DEFAULT_THRESHOLD_FACTOR,
            min_duration_ms: detection::DEFAULT_MIN_DURATION_MS,
            merge_threshold_ms: detection::DEFAULT_MERGE_THRESHOLD_MS,
            refractory_ms: detection::DEFAULT_REFRACTORY_MS,
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            welch_segment_samples: spectral::DEFAULT_WELCH_SEGMENT,
            welch_overlap: spectral::DEFAULT_WELCH_OVERLAP,
            window_type: WindowType::Hann,
            band_low_hz: spectral::DEFAULT_BAND_LOW_HZ,
            band_high_hz: spectral::DEFAULT_BAND_HIGH_HZ,
            fatigue_window_s: spectral::DEFAULT_FATIGUE_WINDOW_S,
            temporal_statistics: cfg!(feature = "temporal_statistics"),
        }
    }
}

fn malformed(field: &str, reason: &str) -> ValidationFailure {
    ValidationFailure::MalformedConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl ConditioningConfig {
    /// Sampling-rate independent checks; Nyquist limits are checked per channel
    pub fn validate(&self) -> Vec<ValidationFailure> {
        let mut errors = Vec::new();

        if !(self.highpass_cutoff_hz > 0.0 && self.highpass_cutoff_hz.is_finite()) {
            errors.push(malformed("conditioning.highpass_cutoff_hz", "must be a positive frequency"));
        }
        if !(self.lowpass_cutoff_hz > 0.0 && self.lowpass_cutoff_hz.is_finite()) {
            errors.push(malformed("conditioning.lowpass_cutoff_hz", "must be a positive frequency"));
        }
        if self.filter_order < filters::MIN_FILTER_ORDER || self.filter_order > filters::MAX_FILTER_ORDER {
            errors.push(malformed("conditioning.filter_order", "must be between 1 and 8"));
        }
        if self.envelope_method == EnvelopeMethod::MovingRms && !(self.rms_window_ms > 0.0) {
            errors.push(malformed("conditioning.rms_window_ms", "must be positive"));
        }
        if self.decimation_factor == Some(0) {
            errors.push(malformed("conditioning.decimation_factor", "must be at least 1"));
        }

        errors
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Vec<ValidationFailure> {
        let mut errors = Vec::new();

        if !(self.threshold_factor > 0.0 && self.threshold_factor <= 1.0) {
            errors.push(malformed("detection.threshold_factor", "must be in (0, 1]"));
        }
        if !(self.min_duration_ms >= 0.0 && self.min_duration_ms.is_finite()) {
            errors.push(malformed("detection.min_duration_ms", "must be non-negative"));
        }
        if !(self.merge_threshold_ms >= 0.0 && self.merge_threshold_ms.is_finite()) {
            errors.push(malformed("detection.merge_threshold_ms", "must be non-negative"));
        }
        if !(self.refractory_ms >= 0.0 && self.refractory_ms.is_finite()) {
            errors.push(malformed("detection.refractory_ms", "must be non-negative"));
        }

        errors
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Vec<ValidationFailure> {
        let mut errors = Vec::new();

        if self.welch_segment_samples < spectral::MIN_SPECTRAL_SAMPLES {
            errors.push(malformed("features.welch_segment_samples", "must be at least 16"));
        }
        if !(self.welch_overlap >= 0.0 && self.welch_overlap < 1.0) {
            errors.push(malformed("features.welch_overlap", "must be in [0, 1)"));
        }
        if !(self.band_low_hz >= 0.0 && self.band_high_hz > self.band_low_hz) {
            errors.push(malformed("features.band_high_hz", "analysis band must satisfy 0 <= low < high"));
        }
        if !(self.fatigue_window_s > 0.0 && self.fatigue_window_s.is_finite()) {
            errors.push(malformed("features.fatigue_window_s", "must be positive"));
        }

        errors
    }
}
