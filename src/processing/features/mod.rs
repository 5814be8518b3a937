//! Per-channel metrics
//!
//! This module turns a conditioned channel and its classified contractions
//! into [`ChannelAnalytics`]:
//! - Time domain features (RMS, MAV) over the whole raw signal
//! - Frequency domain features (MPF, MDF) from a Welch PSD
//! - Fatigue index FI_nsm5 and its trend over fixed windows
//! - Optional statistics per contraction window
//!
//! Metrics that have no meaningful value are reported as `None` together
//! with a [`AnnotationKind::NumericDegenerate`] annotation.

pub mod fatigue;
pub mod frequency;
pub mod temporal;
pub mod time_domain;

pub use fatigue::{fatigue_index_fi_nsm5, fatigue_trend, linear_slope};
pub use frequency::{PowerSpectrum, SpectralAnalyzer};
pub use temporal::temporal_statistics;
pub use time_domain::{mav, rms, summarize};

use tracing::warn;

use crate::config::processing_config::FeatureConfig;
use crate::processing::quality_monitor::QualityMonitor;
use crate::types::{Annotation, AnnotationKind, Annotations, ChannelAnalytics, ChannelThresholds, Contraction};

/// Inputs of the metrics stage for one channel
#[derive(Debug, Clone)]
pub struct MetricsInput<'a> {
    pub channel: &'a str,
    pub raw: &'a [f64],
    pub envelope: &'a [f64],
    pub envelope_rate_hz: f64,
    pub contractions: Vec<Contraction>,
    pub thresholds: ChannelThresholds,
}

/// Metrics calculator for one sampling rate
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    config: FeatureConfig,
    sample_rate: f64,
    analyzer: SpectralAnalyzer,
    quality: QualityMonitor,
}

impl MetricsCalculator {
    pub fn new(config: &FeatureConfig, sample_rate: f64) -> Self {
        Self {
            config: config.clone(),
            sample_rate,
            analyzer: SpectralAnalyzer::new(config, sample_rate),
            quality: QualityMonitor::default(),
        }
    }

    /// Compute all channel metrics, collecting annotations for degenerate values
    pub fn compute(&self, input: MetricsInput<'_>) -> (ChannelAnalytics, Annotations) {
        let channel = input.channel;
        let mut annotations = Annotations::new();
        let mut note = |field: &str, message: String| {
            let key = format!("channels.{}.{}", channel, field);
            warn!(field = %key, "{}", message);
            annotations.insert(key, Annotation::new(AnnotationKind::NumericDegenerate, message));
        };

        let contractions = input.contractions;
        let raw = input.raw;

        let spectrum = self.analyzer.band_spectrum(raw);
        let mpf_hz = spectrum.as_ref().and_then(PowerSpectrum::mean_frequency);
        let mdf_hz = spectrum.as_ref().and_then(PowerSpectrum::median_frequency);
        if mpf_hz.is_none() {
            note("mpf_hz", "no spectral power in the analysis band".to_string());
        }
        if mdf_hz.is_none() {
            note("mdf_hz", "no spectral power in the analysis band".to_string());
        }

        let fatigue_index = spectrum.as_ref().and_then(fatigue_index_fi_nsm5);
        if fatigue_index.is_none() {
            note("fatigue_index", "fifth spectral moment is zero or not finite".to_string());
        }

        let trend = fatigue_trend(&self.analyzer, raw, self.config.fatigue_window_s);
        match &trend {
            None => note(
                "fatigue_trend",
                format!("fewer than two {} s windows available", self.config.fatigue_window_s),
            ),
            Some(t) if t.fatigue_index_slope.is_none() => {
                note("fatigue_trend", "fatigue index undefined in at least one window".to_string())
            }
            Some(_) => {}
        }

        let raw_per_envelope = if input.envelope_rate_hz > 0.0 {
            self.sample_rate / input.envelope_rate_hz
        } else {
            1.0
        };
        let temporal_stats = self
            .config
            .temporal_statistics
            .then(|| temporal_statistics(&self.analyzer, raw, &contractions, raw_per_envelope));

        let signal_quality = self.quality.assess(raw, input.envelope, &contractions);

        let durations: Vec<f64> = contractions.iter().map(|c| c.duration_ms).collect();
        let amplitudes: Vec<f64> = contractions.iter().map(|c| c.peak_amplitude).collect();
        let duration_stats = summarize(&durations);
        let amplitude_stats = summarize(&amplitudes);

        let analytics = ChannelAnalytics {
            contraction_count: contractions.len(),
            good_contraction_count: contractions.iter().filter(|c| c.is_good).count(),
            mvc_contraction_count: contractions.iter().filter(|c| c.meets_mvc).count(),
            duration_contraction_count: contractions.iter().filter(|c| c.meets_duration).count(),

            avg_duration_ms: duration_stats.map(|s| s.mean),
            min_duration_ms: duration_stats.map(|s| s.min),
            max_duration_ms: duration_stats.map(|s| s.max),
            total_time_under_tension_ms: durations.iter().sum(),

            avg_amplitude: amplitude_stats.map(|s| s.mean),
            max_amplitude: amplitude_stats.map(|s| s.max),
            rms: rms(raw),
            mav: mav(raw),

            mpf_hz,
            mdf_hz,
            fatigue_index_fi_nsm5: fatigue_index,
            fatigue_trend: trend,
            temporal_stats,
            signal_quality,

            thresholds: input.thresholds,
            sampling_rate_hz: self.sample_rate,
            envelope_rate_hz: input.envelope_rate_hz,
            duration_s: raw.len() as f64 / self.sample_rate,
            sample_count: raw.len(),

            contractions,
        };

        (analytics, annotations)
    }
}
