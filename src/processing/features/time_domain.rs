// src/processing/features/time_domain.rs
//! Time domain features for EMG signals

use crate::types::SummaryStats;

/// Root Mean Square; zero for an empty slice
pub fn rms(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = data.iter().map(|&x| x * x).sum();
    (sum_squares / data.len() as f64).sqrt()
}

/// Mean Absolute Value; zero for an empty slice
pub fn mav(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().map(|&x| x.abs()).sum::<f64>() / data.len() as f64
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        None
    } else {
        Some(data.iter().sum::<f64>() / data.len() as f64)
    }
}

/// Population variance
pub fn variance(data: &[f64]) -> Option<f64> {
    let mean = mean(data)?;
    Some(data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / data.len() as f64)
}

/// Mean, population standard deviation, range and coefficient of variation
pub fn summarize(values: &[f64]) -> Option<SummaryStats> {
    let mean = mean(values)?;
    let std = variance(values)?.sqrt();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let cv = (mean.abs() > f64::EPSILON).then(|| std / mean.abs());

    Some(SummaryStats {
        mean,
        std,
        min,
        max,
        cv,
        count: values.len(),
    })
}
