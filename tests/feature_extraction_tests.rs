// tests/feature_extraction_tests.rs
//! Integration tests for conditioning and feature extraction

mod common;

use common::{noise, sine, FS};
use emg_analytics::config::{ConditioningConfig, FeatureConfig};
use emg_analytics::processing::conditioning::SignalConditioner;
use emg_analytics::processing::features::{
    fatigue_index_fi_nsm5, fatigue_trend, mav, rms, SpectralAnalyzer,
};
use emg_analytics::processing::filters::{BandType, IirFilter};

#[test]
fn test_time_domain_features_of_sine() {
    let signal = sine(50.0, 2.0, 2.0);
    assert!((rms(&signal) - 2.0 / 2f64.sqrt()).abs() < 1e-3);
    assert!((mav(&signal) - 4.0 / std::f64::consts::PI).abs() < 2e-2);
}

#[test]
fn test_mpf_and_mdf_track_tone_frequency() {
    let analyzer = SpectralAnalyzer::new(&FeatureConfig::default(), FS);

    for freq in [60.0, 120.0, 200.0] {
        let spectrum = analyzer.band_spectrum(&sine(freq, 2.0, 1.0)).expect("spectrum");
        let mpf = spectrum.mean_frequency().unwrap();
        let mdf = spectrum.median_frequency().unwrap();
        assert!((mpf - freq).abs() < 5.0, "mpf {} for {} Hz", mpf, freq);
        assert!((mdf - freq).abs() < 5.0, "mdf {} for {} Hz", mdf, freq);
    }
}

#[test]
fn test_lower_frequency_content_raises_fatigue_index() {
    let analyzer = SpectralAnalyzer::new(&FeatureConfig::default(), FS);
    let fresh = analyzer.band_spectrum(&sine(150.0, 2.0, 1.0)).unwrap();
    let fatigued = analyzer.band_spectrum(&sine(60.0, 2.0, 1.0)).unwrap();

    let fi_fresh = fatigue_index_fi_nsm5(&fresh).unwrap();
    let fi_fatigued = fatigue_index_fi_nsm5(&fatigued).unwrap();
    assert!(fi_fatigued > fi_fresh);
}

#[test]
fn test_fatigue_trend_of_stationary_sine_is_flat() {
    let analyzer = SpectralAnalyzer::new(&FeatureConfig::default(), FS);
    let signal = sine(100.0, 6.0, 1.0);

    let trend = fatigue_trend(&analyzer, &signal, 1.0).expect("six windows");
    assert_eq!(trend.window_count, 6);

    let fi_slope = trend.fatigue_index_slope.unwrap();
    let fi = fatigue_index_fi_nsm5(&analyzer.band_spectrum(&signal[..1000]).unwrap()).unwrap();
    assert!(fi_slope.abs() < fi * 1e-6, "slope {} vs index {}", fi_slope, fi);
    assert!(trend.mpf_slope_hz_per_s.unwrap().abs() < 1e-6);
}

#[test]
fn test_fatigue_trend_detects_frequency_drift() {
    let analyzer = SpectralAnalyzer::new(&FeatureConfig::default(), FS);
    let mut signal = Vec::new();
    for freq in [180.0, 150.0, 120.0, 90.0] {
        signal.extend(sine(freq, 1.0, 1.0));
    }

    let trend = fatigue_trend(&analyzer, &signal, 1.0).unwrap();
    assert!(trend.mpf_slope_hz_per_s.unwrap() < -20.0);
    assert!(trend.fatigue_index_slope.unwrap() > 0.0);
}

#[test]
fn test_conditioning_removes_low_frequency_drift() {
    let drift = sine(1.0, 4.0, 5.0);
    let tone = sine(100.0, 4.0, 0.5);
    let raw: Vec<f64> = drift.iter().zip(&tone).map(|(d, t)| d + t).collect();

    let conditioner = SignalConditioner::new(&ConditioningConfig::default(), FS).unwrap();
    let conditioned = conditioner.condition(&raw).unwrap();

    assert_eq!(conditioned.filtered.len(), raw.len());
    assert!((rms(&conditioned.filtered[500..3500]) - rms(&tone[500..3500])).abs() < 0.02);

    // Rectified 0.5 amplitude tone averages to 1 / PI
    let mid = &conditioned.envelope[1000..3000];
    let level = mid.iter().sum::<f64>() / mid.len() as f64;
    assert!((level - 1.0 / std::f64::consts::PI).abs() < 0.02, "level {}", level);
}

#[test]
fn test_filtfilt_is_zero_phase() {
    let filter = IirFilter::butterworth(4, 20.0, FS, BandType::Lowpass).unwrap();
    let slow = sine(2.0, 3.0, 1.0);
    let filtered = filter.filtfilt(&slow).unwrap();

    let (peak_in, _) = max_index(&slow[200..800]);
    let (peak_out, _) = max_index(&filtered[200..800]);
    assert_eq!(peak_in, peak_out);
}

#[test]
fn test_noise_spectrum_is_broadband() {
    let analyzer = SpectralAnalyzer::new(&FeatureConfig::default(), FS);
    let spectrum = analyzer.band_spectrum(&noise(11, 4000)).unwrap();
    let mpf = spectrum.mean_frequency().unwrap();
    // White noise in 10..500 Hz centres near the middle of the band
    assert!((mpf - 255.0).abs() < 25.0, "mpf {}", mpf);
}

fn max_index(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best })
}
