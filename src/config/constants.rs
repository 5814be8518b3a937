// src/config/constants.rs
//! System-wide configuration constants
//!
//! Default values for every tunable of the engine live here so that config
//! structs, validation and tests agree on the same numbers.

/// Signal acceptance limits
pub mod signal {
    pub const MIN_SAMPLING_RATE_HZ: f64 = 200.0;
    pub const MAX_SAMPLING_RATE_HZ: f64 = 20_000.0;
    pub const MIN_DURATION_S: f64 = 1.0;
    pub const MAX_DURATION_S: f64 = 3600.0;
    pub const MAX_CHANNEL_COUNT: usize = 64;
}

/// Signal conditioning constants
pub mod filters {
    pub const DEFAULT_HIGHPASS_CUTOFF_HZ: f64 = 20.0;
    pub const DEFAULT_LOWPASS_CUTOFF_HZ: f64 = 10.0;
    pub const DEFAULT_FILTER_ORDER: usize = 4;
    pub const MIN_FILTER_ORDER: usize = 1;
    pub const MAX_FILTER_ORDER: usize = 8;
    pub const DEFAULT_RMS_WINDOW_MS: f64 = 50.0;
    /// Padding multiplier applied to the number of filter coefficients
    pub const FILTFILT_PAD_FACTOR: usize = 3;
}

/// Contraction detection constants
pub mod detection {
    /// Fraction of the MVC reference used as the onset threshold
    pub const DEFAULT_THRESHOLD_FACTOR: f64 = 0.10;
    pub const DEFAULT_MIN_DURATION_MS: f64 = 100.0;
    pub const DEFAULT_MERGE_THRESHOLD_MS: f64 = 200.0;
    pub const DEFAULT_REFRACTORY_MS: f64 = 50.0;
}

/// Spectral and fatigue analysis constants
pub mod spectral {
    pub const DEFAULT_WELCH_SEGMENT: usize = 256;
    pub const DEFAULT_WELCH_OVERLAP: f64 = 0.5;
    pub const DEFAULT_BAND_LOW_HZ: f64 = 10.0;
    pub const DEFAULT_BAND_HIGH_HZ: f64 = 500.0;
    pub const DEFAULT_FATIGUE_WINDOW_S: f64 = 1.0;
    pub const MIN_FATIGUE_WINDOWS: usize = 2;
    /// Below this value a spectral moment is treated as zero
    pub const MOMENT_EPSILON: f64 = 1e-12;
    pub const MIN_SPECTRAL_SAMPLES: usize = 16;
}

/// Signal quality constants
pub mod quality {
    /// Fraction of the absolute peak at which a sample counts as clipped
    pub const CLIPPING_LEVEL: f64 = 0.995;
    pub const EXCELLENT_SNR_DB: f64 = 20.0;
    pub const GOOD_SNR_DB: f64 = 12.0;
    pub const FAIR_SNR_DB: f64 = 6.0;
    pub const POOR_SNR_DB: f64 = 3.0;
    pub const MAX_CLIPPING_RATIO: f64 = 0.01;
    /// Consecutive flat samples at the peak that mark a saturated stretch
    pub const MIN_CLIPPING_RUN: usize = 3;
    /// Largest step between neighbours, relative to the peak, still counted as flat
    pub const FLAT_TOP_TOLERANCE: f64 = 1e-9;
}

/// Performance scoring constants
pub mod scoring {
    pub const DEFAULT_CONFIG_NAME: &str = "default";
    pub const DEFAULT_CONFIG_VERSION: &str = "1.0.0";

    pub const DEFAULT_COMPLIANCE_WEIGHT: f64 = 0.40;
    pub const DEFAULT_SYMMETRY_WEIGHT: f64 = 0.25;
    pub const DEFAULT_EFFORT_WEIGHT: f64 = 0.20;
    pub const DEFAULT_GAME_WEIGHT: f64 = 0.15;

    pub const DEFAULT_COMPLETION_WEIGHT: f64 = 1.0 / 3.0;
    pub const DEFAULT_INTENSITY_WEIGHT: f64 = 1.0 / 3.0;
    pub const DEFAULT_DURATION_WEIGHT: f64 = 1.0 / 3.0;

    pub const DEFAULT_MVC_THRESHOLD_PERCENTAGE: f64 = 75.0;
    pub const DEFAULT_DURATION_THRESHOLD_MS: f64 = 2000.0;

    /// Tolerance used when checking that weights sum to one
    pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;
}

/// Blood flow restriction safety constants
pub mod bfr {
    pub const DEFAULT_SAFE_MIN_PERCENT: f64 = 45.0;
    pub const DEFAULT_SAFE_MAX_PERCENT: f64 = 55.0;
}

/// Perceived exertion (Borg CR10) mapping
pub mod effort {
    pub const MAX_RPE: u8 = 10;
    pub const OPTIMAL_SCORE: f64 = 100.0;
    pub const NEAR_OPTIMAL_SCORE: f64 = 80.0;
    pub const SUBOPTIMAL_SCORE: f64 = 60.0;
    pub const EXTREME_SCORE: f64 = 20.0;
}

/// Configuration file locations
pub mod paths {
    pub const CONFIG_FILE_NAME: &str = "emg_analytics.toml";
    pub const SYSTEM_CONFIG_DIR: &str = "/etc/emg-analytics";
    pub const USER_CONFIG_DIR: &str = ".config/emg-analytics";
    pub const ENV_PREFIX: &str = "EMG_ANALYTICS";
    pub const ENV_SEPARATOR: &str = "__";
}
