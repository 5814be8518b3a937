// src/types.rs
//! Plain data types shared across the analytics stages

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One named EMG channel at a fixed sampling rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmgChannel {
    pub name: String,
    pub raw_samples: Vec<f64>,
    pub sampling_rate_hz: f64,
    /// Device-computed activation envelope, same rate as `raw_samples`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_samples: Option<Vec<f64>>,
}

impl EmgChannel {
    pub fn new(name: impl Into<String>, raw_samples: Vec<f64>, sampling_rate_hz: f64) -> Self {
        Self {
            name: name.into(),
            raw_samples,
            sampling_rate_hz,
            activated_samples: None,
        }
    }

    pub fn with_activated(mut self, activated: Vec<f64>) -> Self {
        self.activated_samples = Some(activated);
        self
    }

    pub fn duration_s(&self) -> f64 {
        if self.sampling_rate_hz > 0.0 {
            self.raw_samples.len() as f64 / self.sampling_rate_hz
        } else {
            0.0
        }
    }
}

/// Laterality of a channel for symmetry and BFR pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// A detected muscle contraction
///
/// `start_index..end_index` addresses the detection envelope (end exclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contraction {
    pub start_index: usize,
    pub end_index: usize,
    pub start_time_ms: f64,
    pub end_time_ms: f64,
    pub duration_ms: f64,
    pub peak_amplitude: f64,
    pub mean_amplitude: f64,
    pub meets_mvc: bool,
    pub meets_duration: bool,
    pub is_good: bool,
}

/// Least-squares slopes of per-window fatigue measures over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueTrend {
    pub window_count: usize,
    pub window_s: f64,
    /// Slope of FI_nsm5 per second, `None` when any window was degenerate
    pub fatigue_index_slope: Option<f64>,
    /// Slope of the mean power frequency in Hz per second
    pub mpf_slope_hz_per_s: Option<f64>,
}

/// Summary of one metric across contraction windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Coefficient of variation, `None` when the mean is zero
    pub cv: Option<f64>,
    pub count: usize,
}

/// Contraction-windowed statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalStats {
    pub rms: Option<SummaryStats>,
    pub mav: Option<SummaryStats>,
    pub mpf_hz: Option<SummaryStats>,
    pub mdf_hz: Option<SummaryStats>,
}

/// Overall signal quality levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

/// Whole-recording quality summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalQuality {
    /// Fraction of samples at or above 99.5 % of the absolute peak
    pub clipping_ratio: f64,
    /// Envelope power inside vs outside contractions; `None` without both
    pub snr_db: Option<f64>,
    pub level: QualityLevel,
}

/// Thresholds a channel was actually analysed with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelThresholds {
    pub mvc_value: f64,
    pub mvc_estimated: bool,
    pub detection_threshold: f64,
    pub intensity_threshold: f64,
    pub duration_threshold_ms: f64,
}

/// Complete analytics for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAnalytics {
    pub contraction_count: usize,
    pub good_contraction_count: usize,
    pub mvc_contraction_count: usize,
    pub duration_contraction_count: usize,

    pub avg_duration_ms: Option<f64>,
    pub min_duration_ms: Option<f64>,
    pub max_duration_ms: Option<f64>,
    pub total_time_under_tension_ms: f64,

    pub avg_amplitude: Option<f64>,
    pub max_amplitude: Option<f64>,
    pub rms: f64,
    pub mav: f64,

    pub mpf_hz: Option<f64>,
    pub mdf_hz: Option<f64>,
    pub fatigue_index_fi_nsm5: Option<f64>,
    pub fatigue_trend: Option<FatigueTrend>,
    pub temporal_stats: Option<TemporalStats>,
    pub signal_quality: SignalQuality,

    pub thresholds: ChannelThresholds,
    pub sampling_rate_hz: f64,
    pub envelope_rate_hz: f64,
    pub duration_s: f64,
    pub sample_count: usize,

    pub contractions: Vec<Contraction>,
}

/// Kind of a locally recovered condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// A metric had no meaningful value (zero power, flat signal, ...)
    NumericDegenerate,
    /// A scoring component could not be computed from the inputs given
    PartialScoring,
    /// A value was estimated from the data instead of supplied
    Estimated,
    /// The BFR safety gate decided the overall score
    SafetyGate,
}

/// Note attached to a result field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub message: String,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Annotations keyed by field path, e.g. `channels.CH1.fatigue_index`
pub type Annotations = BTreeMap<String, Annotation>;
