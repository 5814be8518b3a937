// src/processing/features/fatigue.rs
//! Spectral fatigue indicators
//!
//! FI_nsm5 (Dimitrov et al.) is the ratio of the order -1 and order 5
//! spectral moments. It rises as the spectrum compresses towards low
//! frequencies during sustained contraction.

use crate::config::constants::spectral::{MIN_FATIGUE_WINDOWS, MOMENT_EPSILON};
use crate::processing::features::frequency::{PowerSpectrum, SpectralAnalyzer};
use crate::processing::windowing::equal_windows;
use crate::types::FatigueTrend;

/// FI_nsm5 = M(-1) / M(5); `None` when M(5) is not usable
pub fn fatigue_index_fi_nsm5(spectrum: &PowerSpectrum) -> Option<f64> {
    let m5 = spectrum.moment(5);
    if !m5.is_finite() || m5 <= MOMENT_EPSILON {
        return None;
    }
    let ratio = spectrum.moment(-1) / m5;
    ratio.is_finite().then_some(ratio)
}

/// Least-squares slope of `ys` over `xs`
pub fn linear_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (sxy, sxx) = xs.iter().zip(ys).fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });

    if sxx <= 0.0 {
        return None;
    }
    Some(sxy / sxx)
}

/// Per-window FI_nsm5 and MPF slopes over equal non-overlapping windows
///
/// Returns `None` when fewer than two complete windows fit the signal.
pub fn fatigue_trend(analyzer: &SpectralAnalyzer, signal: &[f64], window_s: f64) -> Option<FatigueTrend> {
    let sample_rate = analyzer.sample_rate();
    let window = (window_s * sample_rate).round() as usize;
    let windows = equal_windows(signal.len(), window);
    if windows.len() < MIN_FATIGUE_WINDOWS {
        return None;
    }

    let mut centres = Vec::with_capacity(windows.len());
    let mut indices = Vec::with_capacity(windows.len());
    let mut mpfs = Vec::with_capacity(windows.len());

    for range in &windows {
        centres.push((range.start as f64 + window as f64 / 2.0) / sample_rate);
        let spectrum = analyzer.band_spectrum(&signal[range.clone()]);
        indices.push(spectrum.as_ref().and_then(fatigue_index_fi_nsm5));
        mpfs.push(spectrum.as_ref().and_then(PowerSpectrum::mean_frequency));
    }

    let slope_of = |values: &[Option<f64>]| -> Option<f64> {
        let values: Option<Vec<f64>> = values.iter().copied().collect();
        linear_slope(&centres, &values?)
    };

    Some(FatigueTrend {
        window_count: windows.len(),
        window_s,
        fatigue_index_slope: slope_of(&indices),
        mpf_slope_hz_per_s: slope_of(&mpfs),
    })
}
