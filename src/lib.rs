//! EMG-Analytics: EMG session analysis and clinical performance scoring
//!
//! This library turns recorded multi-channel electromyography (EMG) sessions
//! into detected muscle contractions, clinical metrics and a composite
//! therapy-performance score. It features:
//!
//! - Zero-phase Butterworth conditioning and envelope extraction
//! - Threshold-based contraction detection with merge and refractory rules
//! - Time, frequency and fatigue metrics (RMS, MAV, MPF, MDF, FI_nsm5)
//! - Versioned, weighted scoring with a BFR safety gate
//! - Parallel per-channel processing
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use emg_analytics::config::AnalysisConfig;
//! use emg_analytics::session::{SessionAggregator, SessionInput};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let json = std::fs::read_to_string("session.json")?;
//!     let input = SessionInput::from_json(&json)?;
//!
//!     let aggregator = SessionAggregator::new(AnalysisConfig::default());
//!     let result = aggregator.analyze(&input)?;
//!
//!     println!("Overall score: {:.1}", result.scores.overall_score);
//!     println!("{}", result.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod processing;
pub mod scoring;
pub mod session;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{AnalysisConfig, ConfigLoader, ScoringConfig};
pub use error::{AnalyticsError, AnalyticsResult, ValidationFailure};
pub use scoring::{PerformanceScorer, PerformanceScores};
pub use session::{SessionAggregator, SessionInput, SessionParameters, SessionResult};
pub use types::{Annotation, AnnotationKind, ChannelAnalytics, Contraction, EmgChannel, Side};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "EMG session analysis and clinical performance scoring".to_string(),
        features: vec![
            "Signal conditioning".to_string(),
            "Contraction detection".to_string(),
            "Clinical metrics".to_string(),
            "Performance scoring".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}

/// Analyse one session with the default configuration
pub fn analyze_session(input: &SessionInput) -> AnalyticsResult<SessionResult> {
    SessionAggregator::default().analyze(input)
}
