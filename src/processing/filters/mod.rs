// src/processing/filters/mod.rs
//! Digital filters for EMG signal conditioning

pub mod fir;
pub mod iir;

pub use fir::*;
pub use iir::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandType {
    Lowpass,
    Highpass,
}

/// Second-order section with `a[0]` normalized to one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl Biquad {
    /// DC gain `H(z = 1)`
    pub fn dc_gain(&self) -> f64 {
        let den = self.a[0] + self.a[1] + self.a[2];
        if den.abs() < f64::EPSILON {
            0.0
        } else {
            (self.b[0] + self.b[1] + self.b[2]) / den
        }
    }
}

/// Common filter error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Signal too short for filtering: {actual} samples, need more than {required}")]
    SignalTooShort { required: usize, actual: usize },

    #[error("Non-finite value at index {0}")]
    NonFinite(usize),
}
