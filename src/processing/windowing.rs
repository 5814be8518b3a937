// src/processing/windowing.rs
//! Windowing functions and signal segmentation

use std::ops::Range;

use crate::config::processing_config::WindowType;

/// Generate a periodic window of `size` points
///
/// Periodic (DFT-even) windows are used for spectral estimation, so the
/// denominator is `size` rather than `size - 1`.
pub fn generate_window(window_type: WindowType, size: usize) -> Vec<f64> {
    if size == 0 {
        return Vec::new();
    }
    let n = size as f64;
    let two_pi = 2.0 * std::f64::consts::PI;

    match window_type {
        WindowType::Rectangular => vec![1.0; size],
        WindowType::Hamming => (0..size)
            .map(|i| 0.54 - 0.46 * (two_pi * i as f64 / n).cos())
            .collect(),
        WindowType::Hann => (0..size)
            .map(|i| 0.5 * (1.0 - (two_pi * i as f64 / n).cos()))
            .collect(),
        WindowType::Blackman => (0..size)
            .map(|i| {
                let x = i as f64 / n;
                0.42 - 0.5 * (two_pi * x).cos() + 0.08 * (2.0 * two_pi * x).cos()
            })
            .collect(),
    }
}

/// Ranges of overlapping segments covering `len` samples
///
/// Only complete segments are produced; a trailing partial segment is dropped.
pub fn segment_ranges(len: usize, segment: usize, overlap: f64) -> Vec<Range<usize>> {
    if segment == 0 || len < segment {
        return Vec::new();
    }
    let overlap_samples = ((segment as f64) * overlap).floor() as usize;
    let hop = (segment - overlap_samples.min(segment - 1)).max(1);

    (0..=(len - segment))
        .step_by(hop)
        .map(|start| start..start + segment)
        .collect()
}

/// Split `len` samples into consecutive non-overlapping windows of `window` samples
pub fn equal_windows(len: usize, window: usize) -> Vec<Range<usize>> {
    if window == 0 {
        return Vec::new();
    }
    (0..len / window)
        .map(|i| i * window..(i + 1) * window)
        .collect()
}

/// Sum of squared window coefficients, used for PSD scaling
pub fn window_power(window: &[f64]) -> f64 {
    window.iter().map(|w| w * w).sum()
}
