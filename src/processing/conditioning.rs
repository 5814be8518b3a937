// src/processing/conditioning.rs
//! Signal conditioning: band-limiting, rectification and envelope extraction

use tracing::debug;

use crate::config::processing_config::{ConditioningConfig, EnvelopeMethod};
use crate::processing::filters::{decimate_mean, BandType, FilterError, IirFilter, MovingWindow};

/// Output of the conditioning stage
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionedSignal {
    /// High-pass filtered signal, same length as the input
    pub filtered: Vec<f64>,
    /// Smoothed amplitude envelope, possibly decimated
    pub envelope: Vec<f64>,
    pub envelope_rate_hz: f64,
}

/// Signal conditioner for one sampling rate
///
/// Filters are designed once on construction and reused for every call.
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    sample_rate: f64,
    highpass: IirFilter,
    smoother: Smoother,
    decimation: usize,
}

#[derive(Debug, Clone)]
enum Smoother {
    LowPass(IirFilter),
    MovingRms(MovingWindow),
}

impl SignalConditioner {
    pub fn new(config: &ConditioningConfig, sample_rate: f64) -> Result<Self, FilterError> {
        let highpass = IirFilter::butterworth(
            config.filter_order,
            config.highpass_cutoff_hz,
            sample_rate,
            BandType::Highpass,
        )?;

        let smoother = match config.envelope_method {
            EnvelopeMethod::LowPass => Smoother::LowPass(IirFilter::butterworth(
                config.filter_order,
                config.lowpass_cutoff_hz,
                sample_rate,
                BandType::Lowpass,
            )?),
            EnvelopeMethod::MovingRms => {
                Smoother::MovingRms(MovingWindow::from_duration(config.rms_window_ms, sample_rate)?)
            }
        };

        let decimation = config.decimation_factor.unwrap_or(1);
        if decimation == 0 {
            return Err(FilterError::InvalidParameters("Decimation factor must be at least 1".to_string()));
        }

        Ok(Self {
            sample_rate,
            highpass,
            smoother,
            decimation,
        })
    }

    /// Fewest samples this conditioner accepts
    pub fn min_samples_required(&self) -> usize {
        let smoothing = match &self.smoother {
            Smoother::LowPass(filter) => filter.min_input_len(),
            Smoother::MovingRms(window) => window.length(),
        };
        self.highpass.min_input_len().max(smoothing)
    }

    pub fn envelope_rate_hz(&self) -> f64 {
        self.sample_rate / self.decimation as f64
    }

    /// Run the full conditioning chain on raw samples
    pub fn condition(&self, raw: &[f64]) -> Result<ConditionedSignal, FilterError> {
        let required = self.min_samples_required();
        if raw.len() < required {
            return Err(FilterError::SignalTooShort {
                required,
                actual: raw.len(),
            });
        }

        let filtered = self.highpass.filtfilt(raw)?;

        let envelope = match &self.smoother {
            Smoother::LowPass(filter) => {
                let rectified: Vec<f64> = filtered.iter().map(|x| x.abs()).collect();
                filter.filtfilt(&rectified)?
            }
            Smoother::MovingRms(window) => window.rms(&filtered)?,
        };

        let envelope = decimate_mean(&envelope, self.decimation)?;

        debug!(
            samples = raw.len(),
            envelope_samples = envelope.len(),
            envelope_rate_hz = self.envelope_rate_hz(),
            "signal conditioned"
        );

        Ok(ConditionedSignal {
            filtered,
            envelope,
            envelope_rate_hz: self.envelope_rate_hz(),
        })
    }

    /// Rectify and decimate a device-computed activation sequence
    pub fn prepare_activated(&self, activated: &[f64]) -> Result<Vec<f64>, FilterError> {
        if let Some(index) = activated.iter().position(|x| !x.is_finite()) {
            return Err(FilterError::NonFinite(index));
        }
        let rectified: Vec<f64> = activated.iter().map(|x| x.abs()).collect();
        decimate_mean(&rectified, self.decimation)
    }
}

/// Minimum sample count the conditioning chain needs at `sample_rate`
pub fn min_samples_required(config: &ConditioningConfig, sample_rate: f64) -> Result<usize, FilterError> {
    Ok(SignalConditioner::new(config, sample_rate)?.min_samples_required())
}
