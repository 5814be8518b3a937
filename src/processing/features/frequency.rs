// src/processing/features/frequency.rs
//! Frequency domain features: Welch power spectral density, MPF and MDF

use rustfft::{num_complex::Complex64, FftPlanner};

use crate::config::constants::spectral::MIN_SPECTRAL_SAMPLES;
use crate::config::processing_config::{FeatureConfig, WindowType};
use crate::processing::windowing::{generate_window, segment_ranges, window_power};

/// One-sided power spectral density
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    pub frequencies: Vec<f64>,
    pub power: Vec<f64>,
}

impl PowerSpectrum {
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    pub fn total_power(&self) -> f64 {
        self.power.iter().sum()
    }

    /// Bins with `low <= f <= high`
    pub fn band(&self, low: f64, high: f64) -> PowerSpectrum {
        let (frequencies, power) = self
            .frequencies
            .iter()
            .zip(&self.power)
            .filter(|(f, _)| **f >= low && **f <= high)
            .map(|(f, p)| (*f, *p))
            .unzip();
        PowerSpectrum { frequencies, power }
    }

    /// Mean power frequency, `None` without spectral power
    pub fn mean_frequency(&self) -> Option<f64> {
        let total = self.total_power();
        if !(total > 0.0 && total.is_finite()) {
            return None;
        }
        let weighted: f64 = self.frequencies.iter().zip(&self.power).map(|(f, p)| f * p).sum();
        Some(weighted / total)
    }

    /// Frequency splitting the spectral power in two equal halves
    pub fn median_frequency(&self) -> Option<f64> {
        let total = self.total_power();
        if !(total > 0.0 && total.is_finite()) {
            return None;
        }

        let half = total / 2.0;
        let mut cumulative = 0.0;
        for (f, p) in self.frequencies.iter().zip(&self.power) {
            cumulative += p;
            if cumulative >= half {
                return Some(*f);
            }
        }
        self.frequencies.last().copied()
    }

    /// Spectral moment `M(k) = sum f^k P(f)` over strictly positive frequencies
    pub fn moment(&self, k: i32) -> f64 {
        self.frequencies
            .iter()
            .zip(&self.power)
            .filter(|(f, _)| **f > 0.0)
            .map(|(f, p)| f.powi(k) * p)
            .sum()
    }
}

/// Welch spectral estimator for one sampling rate
#[derive(Debug, Clone)]
pub struct SpectralAnalyzer {
    sample_rate: f64,
    segment_samples: usize,
    overlap: f64,
    window_type: WindowType,
    band_low_hz: f64,
    band_high_hz: f64,
}

impl SpectralAnalyzer {
    pub fn new(config: &FeatureConfig, sample_rate: f64) -> Self {
        Self {
            sample_rate,
            segment_samples: config.welch_segment_samples,
            overlap: config.welch_overlap,
            window_type: config.window_type,
            band_low_hz: config.band_low_hz,
            // Band is clipped to Nyquist
            band_high_hz: config.band_high_hz.min(sample_rate / 2.0),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Analysis band actually used, after Nyquist clipping
    pub fn band(&self) -> (f64, f64) {
        (self.band_low_hz, self.band_high_hz)
    }

    /// Welch PSD with per-segment mean removal
    ///
    /// Signals shorter than the configured segment use a single segment of
    /// their own length. Returns `None` below the minimum spectral length.
    pub fn welch(&self, signal: &[f64]) -> Option<PowerSpectrum> {
        let segment = self.segment_samples.min(signal.len());
        if segment < MIN_SPECTRAL_SAMPLES {
            return None;
        }

        let window = generate_window(self.window_type, segment);
        let scale = self.sample_rate * window_power(&window);
        if !(scale > 0.0) {
            return None;
        }

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(segment);
        let mut scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let mut buffer = vec![Complex64::new(0.0, 0.0); segment];

        let bins = segment / 2 + 1;
        let mut accumulated = vec![0.0; bins];
        let ranges = segment_ranges(signal.len(), segment, self.overlap);

        for range in &ranges {
            let data = &signal[range.clone()];
            let mean = data.iter().sum::<f64>() / segment as f64;
            for ((slot, &x), &w) in buffer.iter_mut().zip(data).zip(&window) {
                *slot = Complex64::new((x - mean) * w, 0.0);
            }
            fft.process_with_scratch(&mut buffer, &mut scratch);
            for (acc, value) in accumulated.iter_mut().zip(&buffer) {
                *acc += value.norm_sqr();
            }
        }

        let count = ranges.len() as f64;
        let nyquist_bin = (segment % 2 == 0).then_some(bins - 1);
        let power = accumulated
            .iter()
            .enumerate()
            .map(|(k, &acc)| {
                let one_sided = if k == 0 || Some(k) == nyquist_bin { 1.0 } else { 2.0 };
                one_sided * acc / (scale * count)
            })
            .collect();
        let frequencies = (0..bins)
            .map(|k| k as f64 * self.sample_rate / segment as f64)
            .collect();

        Some(PowerSpectrum { frequencies, power })
    }

    /// Welch PSD restricted to the analysis band
    pub fn band_spectrum(&self, signal: &[f64]) -> Option<PowerSpectrum> {
        let spectrum = self.welch(signal)?.band(self.band_low_hz, self.band_high_hz);
        (!spectrum.is_empty()).then_some(spectrum)
    }
}
