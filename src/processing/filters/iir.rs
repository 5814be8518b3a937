// src/processing/filters/iir.rs
//! IIR (Infinite Impulse Response) Butterworth filters as cascaded biquads

use std::f64::consts::PI;

use super::{BandType, Biquad, FilterError};
use crate::config::constants::filters::{FILTFILT_PAD_FACTOR, MAX_FILTER_ORDER, MIN_FILTER_ORDER};

/// Butterworth filter stored as second-order sections
///
/// Odd orders carry one first-order section (with `b[2] = a[2] = 0`).
#[derive(Debug, Clone)]
pub struct IirFilter {
    sections: Vec<Biquad>,
    order: usize,
    band_type: BandType,
}

impl IirFilter {
    /// Design a Butterworth filter via the bilinear transform with pre-warping
    pub fn butterworth(order: usize, cutoff: f64, sample_rate: f64, band_type: BandType) -> Result<Self, FilterError> {
        if !(MIN_FILTER_ORDER..=MAX_FILTER_ORDER).contains(&order) {
            return Err(FilterError::InvalidParameters(format!(
                "Order must be {}-{}, got {}",
                MIN_FILTER_ORDER, MAX_FILTER_ORDER, order
            )));
        }
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(FilterError::InvalidParameters(format!("Invalid sample rate {}", sample_rate)));
        }
        if !(cutoff > 0.0 && cutoff < sample_rate / 2.0) {
            return Err(FilterError::InvalidParameters(format!(
                "Cutoff {} Hz must lie in (0, {}) Hz",
                cutoff,
                sample_rate / 2.0
            )));
        }

        let w0 = 2.0 * PI * cutoff / sample_rate;
        let mut sections = Vec::with_capacity(order.div_ceil(2));

        for k in 0..order / 2 {
            let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
            let q = 1.0 / (2.0 * theta.cos());
            sections.push(Self::second_order_section(w0, q, band_type));
        }
        if order % 2 == 1 {
            sections.push(Self::first_order_section(cutoff, sample_rate, band_type));
        }

        Ok(Self {
            sections,
            order,
            band_type,
        })
    }

    fn second_order_section(w0: f64, q: f64, band_type: BandType) -> Biquad {
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        let (b0, b1, b2) = match band_type {
            BandType::Lowpass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            BandType::Highpass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
        };

        Biquad {
            b: [b0 / a0, b1 / a0, b2 / a0],
            a: [1.0, -2.0 * cos_w0 / a0, (1.0 - alpha) / a0],
        }
    }

    fn first_order_section(cutoff: f64, sample_rate: f64, band_type: BandType) -> Biquad {
        let k = (PI * cutoff / sample_rate).tan();
        let norm = 1.0 + k;
        let a1 = (k - 1.0) / norm;

        let b = match band_type {
            BandType::Lowpass => [k / norm, k / norm, 0.0],
            BandType::Highpass => [1.0 / norm, -1.0 / norm, 0.0],
        };

        Biquad { b, a: [1.0, a1, 0.0] }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn band_type(&self) -> BandType {
        self.band_type
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Number of samples reflected on each side by [`IirFilter::filtfilt`]
    pub fn padding_len(&self) -> usize {
        FILTFILT_PAD_FACTOR * (2 * self.sections.len() + 1)
    }

    /// Minimum input length accepted by [`IirFilter::filtfilt`]
    pub fn min_input_len(&self) -> usize {
        self.padding_len() + 1
    }

    /// Causal filtering with zero initial state
    pub fn filter(&self, input: &[f64]) -> Vec<f64> {
        let mut output = input.to_vec();
        for section in &self.sections {
            run_section(section, &mut output, [0.0, 0.0]);
        }
        output
    }

    /// Zero-phase forward-backward filtering
    ///
    /// The input is extended by odd reflection on both ends and every section
    /// starts from its steady state for the first sample, which keeps edge
    /// transients out of the returned span.
    pub fn filtfilt(&self, input: &[f64]) -> Result<Vec<f64>, FilterError> {
        if let Some(index) = input.iter().position(|x| !x.is_finite()) {
            return Err(FilterError::NonFinite(index));
        }
        let pad = self.padding_len();
        if input.len() <= pad {
            return Err(FilterError::SignalTooShort {
                required: pad,
                actual: input.len(),
            });
        }

        let mut extended = odd_extension(input, pad);

        self.run_with_steady_state(&mut extended);
        extended.reverse();
        self.run_with_steady_state(&mut extended);
        extended.reverse();

        Ok(extended[pad..pad + input.len()].to_vec())
    }

    fn run_with_steady_state(&self, data: &mut [f64]) {
        let Some(&first) = data.first() else {
            return;
        };

        let mut level = first;
        for section in &self.sections {
            let state = steady_state(section, level);
            level *= section.dc_gain();
            run_section(section, data, state);
        }
    }
}

/// Direct Form II transposed, in place
fn run_section(section: &Biquad, data: &mut [f64], initial: [f64; 2]) {
    let [b0, b1, b2] = section.b;
    let [_, a1, a2] = section.a;
    let [mut z1, mut z2] = initial;

    for sample in data.iter_mut() {
        let x = *sample;
        let y = b0 * x + z1;
        z1 = b1 * x - a1 * y + z2;
        z2 = b2 * x - a2 * y;
        *sample = y;
    }
}

/// Filter state that reproduces a constant input `level` without transient
fn steady_state(section: &Biquad, level: f64) -> [f64; 2] {
    let y = level * section.dc_gain();
    let z2 = section.b[2] * level - section.a[2] * y;
    let z1 = y - section.b[0] * level;
    [z1, z2]
}

fn odd_extension(input: &[f64], pad: usize) -> Vec<f64> {
    let n = input.len();
    let first = input[0];
    let last = input[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - input[i]));
    extended.extend_from_slice(input);
    extended.extend((1..=pad).map(|i| 2.0 * last - input[n - 1 - i]));
    extended
}
