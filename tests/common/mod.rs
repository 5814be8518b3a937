// tests/common/mod.rs
//! Synthetic EMG sessions shared by the integration tests

#![allow(dead_code)]

use std::f64::consts::PI;

use emg_analytics::session::{SessionInput, SessionParameters};
use emg_analytics::types::EmgChannel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const FS: f64 = 1000.0;

/// Uniform broadband noise in [-1, 1) from a seeded generator
pub fn noise(seed: u64, n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Noise carrier whose amplitude is `active` inside the bursts and `rest` elsewhere
pub fn noisy_bursts(seed: u64, seconds: f64, bursts: &[(f64, f64)], active: f64, rest: f64) -> Vec<f64> {
    let n = (seconds * FS).round() as usize;
    noise(seed, n)
        .into_iter()
        .enumerate()
        .map(|(i, x)| {
            let t = i as f64 / FS;
            let on = bursts.iter().any(|&(start, end)| t >= start && t < end);
            x * if on { active } else { rest }
        })
        .collect()
}

pub fn sine(freq: f64, seconds: f64, amplitude: f64) -> Vec<f64> {
    let n = (seconds * FS).round() as usize;
    (0..n).map(|i| amplitude * (2.0 * PI * freq * i as f64 / FS).sin()).collect()
}

/// Evenly spaced bursts of `width` seconds every `period` seconds starting at 1 s
pub fn schedule(count: usize, width: f64, period: f64) -> Vec<(f64, f64)> {
    (0..count)
        .map(|k| {
            let start = 1.0 + k as f64 * period;
            (start, start + width)
        })
        .collect()
}

/// Two-channel session with `count` three-second contractions per channel
pub fn bilateral_session(count: usize) -> SessionInput {
    let bursts = schedule(count, 3.0, 5.0);
    let seconds = 2.0 + count as f64 * 5.0;

    let mut parameters = SessionParameters::default();
    for name in ["CH1", "CH2"] {
        parameters.mvc_values_by_channel.insert(name.to_string(), 0.5);
        parameters.expected_contractions_by_channel.insert(name.to_string(), count as u32);
    }
    parameters.post_session_rpe = Some(5);

    SessionInput::new(vec![
        EmgChannel::new("CH1", noisy_bursts(1, seconds, &bursts, 1.0, 0.01), FS),
        EmgChannel::new("CH2", noisy_bursts(2, seconds, &bursts, 1.0, 0.01), FS),
    ])
    .with_parameters(parameters)
}
