// src/processing/features/temporal.rs
//! Contraction-windowed statistics on the raw signal

use std::ops::Range;

use crate::processing::features::frequency::SpectralAnalyzer;
use crate::processing::features::time_domain::{mav, rms, summarize};
use crate::types::{Contraction, TemporalStats};

/// Map an envelope index range onto raw sample indices
pub fn raw_range(contraction: &Contraction, raw_per_envelope: f64, raw_len: usize) -> Range<usize> {
    let start = ((contraction.start_index as f64 * raw_per_envelope).round() as usize).min(raw_len);
    let end = ((contraction.end_index as f64 * raw_per_envelope).round() as usize).clamp(start, raw_len);
    start..end
}

/// RMS, MAV, MPF and MDF per contraction window, summarized across windows
pub fn temporal_statistics(
    analyzer: &SpectralAnalyzer,
    raw: &[f64],
    contractions: &[Contraction],
    raw_per_envelope: f64,
) -> TemporalStats {
    let mut rms_values = Vec::with_capacity(contractions.len());
    let mut mav_values = Vec::with_capacity(contractions.len());
    let mut mpf_values = Vec::new();
    let mut mdf_values = Vec::new();

    for contraction in contractions {
        let window = &raw[raw_range(contraction, raw_per_envelope, raw.len())];
        if window.is_empty() {
            continue;
        }
        rms_values.push(rms(window));
        mav_values.push(mav(window));

        if let Some(spectrum) = analyzer.band_spectrum(window) {
            mpf_values.extend(spectrum.mean_frequency());
            mdf_values.extend(spectrum.median_frequency());
        }
    }

    TemporalStats {
        rms: summarize(&rms_values),
        mav: summarize(&mav_values),
        mpf_hz: summarize(&mpf_values),
        mdf_hz: summarize(&mdf_values),
    }
}
