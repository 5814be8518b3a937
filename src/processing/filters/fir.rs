// src/processing/filters/fir.rs
//! FIR (Finite Impulse Response) boxcar filters: moving RMS, moving average, decimation

use super::FilterError;

/// Centred boxcar window over a signal
///
/// Uses prefix sums so every output costs O(1) regardless of the window
/// length. Near the edges the window is truncated to the available samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingWindow {
    length: usize,
}

impl MovingWindow {
    pub fn new(length: usize) -> Result<Self, FilterError> {
        if length == 0 {
            return Err(FilterError::InvalidParameters("Window length must be at least 1".to_string()));
        }
        Ok(Self { length })
    }

    /// Window covering `window_ms` at `sample_rate`, at least one sample
    pub fn from_duration(window_ms: f64, sample_rate: f64) -> Result<Self, FilterError> {
        if !(window_ms > 0.0 && sample_rate > 0.0) {
            return Err(FilterError::InvalidParameters(format!(
                "Invalid window {} ms at {} Hz",
                window_ms, sample_rate
            )));
        }
        Self::new(((window_ms / 1000.0 * sample_rate).round() as usize).max(1))
    }

    /// Get window length
    pub fn length(&self) -> usize {
        self.length
    }

    /// Centred moving RMS, same length as the input
    pub fn rms(&self, input: &[f64]) -> Result<Vec<f64>, FilterError> {
        self.check_len(input)?;
        let squares: Vec<f64> = input.iter().map(|x| x * x).collect();
        Ok(self.centred_mean(&squares).into_iter().map(|m| m.max(0.0).sqrt()).collect())
    }

    /// Centred moving average, same length as the input
    pub fn average(&self, input: &[f64]) -> Result<Vec<f64>, FilterError> {
        self.check_len(input)?;
        Ok(self.centred_mean(input))
    }

    fn check_len(&self, input: &[f64]) -> Result<(), FilterError> {
        if input.len() < self.length {
            return Err(FilterError::SignalTooShort {
                required: self.length,
                actual: input.len(),
            });
        }
        Ok(())
    }

    fn centred_mean(&self, input: &[f64]) -> Vec<f64> {
        let n = input.len();
        let mut prefix = Vec::with_capacity(n + 1);
        prefix.push(0.0);
        let mut acc = 0.0;
        for &x in input {
            acc += x;
            prefix.push(acc);
        }

        let before = (self.length - 1) / 2;
        let after = self.length - 1 - before;

        (0..n)
            .map(|i| {
                let lo = i.saturating_sub(before);
                let hi = (i + after + 1).min(n);
                (prefix[hi] - prefix[lo]) / (hi - lo) as f64
            })
            .collect()
    }
}

/// Block-mean decimation by an integer factor
///
/// The output has `ceil(len / factor)` samples; a trailing partial block is
/// averaged over the samples it has.
pub fn decimate_mean(input: &[f64], factor: usize) -> Result<Vec<f64>, FilterError> {
    if factor == 0 {
        return Err(FilterError::InvalidParameters("Decimation factor must be at least 1".to_string()));
    }
    if factor == 1 {
        return Ok(input.to_vec());
    }
    Ok(input
        .chunks(factor)
        .map(|block| block.iter().sum::<f64>() / block.len() as f64)
        .collect())
}
