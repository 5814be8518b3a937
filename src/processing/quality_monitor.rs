// src/processing/quality_monitor.rs
//! Signal quality assessment for a whole recording

use serde::{Deserialize, Serialize};

use crate::config::constants::quality;
use crate::processing::features::temporal::raw_range;
use crate::types::{Contraction, QualityLevel, SignalQuality};

/// Limits used to grade a recording
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Fraction of the absolute peak a flat top must reach
    pub clipping_level: f64,
    /// Shortest run of flat samples at the peak counted as clipping
    pub min_clipping_run: usize,
    /// Absolute ADC full scale; samples at or beyond it are always clipped
    pub saturation_level: Option<f64>,
    pub max_clipping_ratio: f64,
    pub excellent_snr_db: f64,
    pub good_snr_db: f64,
    pub fair_snr_db: f64,
    pub poor_snr_db: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            clipping_level: quality::CLIPPING_LEVEL,
            min_clipping_run: quality::MIN_CLIPPING_RUN,
            saturation_level: None,
            max_clipping_ratio: quality::MAX_CLIPPING_RATIO,
            excellent_snr_db: quality::EXCELLENT_SNR_DB,
            good_snr_db: quality::GOOD_SNR_DB,
            fair_snr_db: quality::FAIR_SNR_DB,
            poor_snr_db: quality::POOR_SNR_DB,
        }
    }
}

/// Signal quality monitor
#[derive(Debug, Clone, Default)]
pub struct QualityMonitor {
    thresholds: QualityThresholds,
}

impl QualityMonitor {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    /// Grade a recording from its raw samples and detection envelope
    pub fn assess(&self, raw: &[f64], envelope: &[f64], contractions: &[Contraction]) -> SignalQuality {
        let clipping_ratio = self.clipping_ratio(raw);
        let snr_db = Self::estimate_snr_db(envelope, contractions);
        let level = self.determine_level(clipping_ratio, snr_db);

        SignalQuality {
            clipping_ratio,
            snr_db,
            level,
        }
    }

    /// Fraction of samples that look saturated
    ///
    /// A sample is clipped when it sits in a flat-topped run at the absolute
    /// peak, or at or beyond the configured ADC full scale. Smooth waveforms
    /// passing through their peak do not count.
    pub fn clipping_ratio(&self, raw: &[f64]) -> f64 {
        let peak = raw.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        if raw.is_empty() || peak <= 0.0 {
            return 0.0;
        }

        let mut clipped: Vec<bool> = match self.thresholds.saturation_level {
            Some(full_scale) => raw.iter().map(|x| x.abs() >= full_scale).collect(),
            None => vec![false; raw.len()],
        };

        let level = peak * self.thresholds.clipping_level;
        let tolerance = peak * quality::FLAT_TOP_TOLERANCE;
        let min_run = self.thresholds.min_clipping_run.max(1);
        let mut run_start = 0;

        for i in 0..=raw.len() {
            let continues = i < raw.len()
                && raw[i].abs() >= level
                && (i == run_start || (raw[i] - raw[i - 1]).abs() <= tolerance);
            if continues {
                continue;
            }
            if i - run_start >= min_run {
                clipped[run_start..i].iter_mut().for_each(|flag| *flag = true);
            }
            run_start = if i < raw.len() && raw[i].abs() >= level { i } else { i + 1 };
        }

        clipped.iter().filter(|&&flag| flag).count() as f64 / raw.len() as f64
    }

    /// Envelope power inside contractions relative to outside, in dB
    pub fn estimate_snr_db(envelope: &[f64], contractions: &[Contraction]) -> Option<f64> {
        if contractions.is_empty() {
            return None;
        }

        let mut inside = vec![false; envelope.len()];
        for contraction in contractions {
            inside[raw_range(contraction, 1.0, envelope.len())]
                .iter_mut()
                .for_each(|flag| *flag = true);
        }

        let (mut signal_power, mut signal_count) = (0.0, 0usize);
        let (mut noise_power, mut noise_count) = (0.0, 0usize);
        for (value, is_inside) in envelope.iter().zip(&inside) {
            if *is_inside {
                signal_power += value * value;
                signal_count += 1;
            } else {
                noise_power += value * value;
                noise_count += 1;
            }
        }

        if signal_count == 0 || noise_count == 0 {
            return None;
        }
        let signal_power = signal_power / signal_count as f64;
        let noise_power = noise_power / noise_count as f64;
        if !(signal_power > 0.0 && noise_power > 0.0) {
            return None;
        }
        Some(10.0 * (signal_power / noise_power).log10())
    }

    fn determine_level(&self, clipping_ratio: f64, snr_db: Option<f64>) -> QualityLevel {
        if clipping_ratio > self.thresholds.max_clipping_ratio {
            return QualityLevel::Critical;
        }

        let Some(snr) = snr_db else {
            return QualityLevel::Fair;
        };

        if snr >= self.thresholds.excellent_snr_db {
            QualityLevel::Excellent
        } else if snr >= self.thresholds.good_snr_db {
            QualityLevel::Good
        } else if snr >= self.thresholds.fair_snr_db {
            QualityLevel::Fair
        } else if snr >= self.thresholds.poor_snr_db {
            QualityLevel::Poor
        } else {
            QualityLevel::Critical
        }
    }
}
