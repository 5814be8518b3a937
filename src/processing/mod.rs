// src/processing/mod.rs
//! Per-channel signal processing stages for EMG session data

pub mod conditioning;
pub mod detection;
pub mod features;
pub mod filters;
pub mod quality_monitor;
pub mod windowing;

pub use conditioning::{ConditionedSignal, SignalConditioner};
pub use detection::{classify, ContractionDetector, DurationThresholdPolicy};
pub use features::{MetricsCalculator, MetricsInput, PowerSpectrum, SpectralAnalyzer};
pub use filters::{BandType, FilterError, IirFilter, MovingWindow};
pub use quality_monitor::{QualityMonitor, QualityThresholds};
pub use windowing::generate_window;
