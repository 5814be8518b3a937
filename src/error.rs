// src/error.rs
//! Unified error handling for the analytics engine
//!
//! Errors are split by how the caller has to react to them:
//!
//! - [`AnalyticsError::Validation`] is raised before any channel is processed
//!   and carries a structured [`ValidationFailure`] so the caller can build a
//!   user-facing message (duration found vs. required, channel names, ...).
//! - [`AnalyticsError::Processing`] reports an internal stage failure.
//! - [`AnalyticsError::Configuration`] covers loading configuration files.
//!
//! Degenerate metrics and missing optional scoring inputs are *not* errors;
//! they are recorded as [`Annotation`](crate::types::Annotation)s on the
//! result.

use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use serde::Serialize;
use thiserror::Error;

/// Unified error type for the analytics engine
#[derive(Debug, Clone, Error)]
pub enum AnalyticsError {
    /// Structural precondition not met; raised before processing starts
    #[error("[VALIDATION] {failure} ({})", .context.operation)]
    Validation {
        failure: ValidationFailure,
        context: ErrorContext,
    },

    /// A processing stage failed on input that passed validation
    #[error("[PROCESSING] {stage} stage error: {reason} ({})", .context.operation)]
    Processing {
        stage: ProcessingStage,
        reason: String,
        context: ErrorContext,
    },

    /// Configuration file could not be read or parsed
    #[error("[CONFIG] Configuration error in {source_name}: {reason}")]
    Configuration {
        source_name: String,
        reason: String,
    },
}

/// Classified validation failures
///
/// Every variant carries enough context for a precise clinical message.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    #[error("no EMG channels supplied")]
    NoChannels,

    #[error("channel '{channel}' appears more than once")]
    DuplicateChannel { channel: String },

    #[error("channel '{channel}' is too short: {found_samples} samples ({found_ms:.1} ms), need at least {required_samples} samples ({required_ms:.1} ms)")]
    SignalTooShort {
        channel: String,
        found_samples: usize,
        required_samples: usize,
        found_ms: f64,
        required_ms: f64,
    },

    #[error("channel '{channel}' is too long: {found_ms:.1} ms exceeds the {max_ms:.1} ms limit")]
    SignalTooLong {
        channel: String,
        found_samples: usize,
        found_ms: f64,
        max_ms: f64,
    },

    #[error("channel '{channel}' sampling rate {found_hz} Hz outside supported range [{min_hz}, {max_hz}] Hz")]
    SamplingRateOutOfRange {
        channel: String,
        found_hz: f64,
        min_hz: f64,
        max_hz: f64,
    },

    #[error("channel '{channel}' has a non-finite sample at index {index}")]
    NonFiniteSample { channel: String, index: usize },

    #[error("parameter '{field}' = {value} is invalid: {reason}")]
    InvalidParameter {
        field: String,
        value: String,
        reason: String,
    },

    #[error("configuration field '{field}' is malformed: {reason}")]
    MalformedConfig { field: String, reason: String },
}

/// Processing stages for error tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessingStage {
    Conditioning,
    Detection,
    FeatureExtraction,
    Scoring,
    Aggregation,
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessingStage::Conditioning => "CONDITIONING",
            ProcessingStage::Detection => "DETECTION",
            ProcessingStage::FeatureExtraction => "FEATURES",
            ProcessingStage::Scoring => "SCORING",
            ProcessingStage::Aggregation => "AGGREGATION",
        };
        f.write_str(name)
    }
}

/// Error context for debugging and analysis
#[derive(Debug, Clone, Serialize)]
pub struct ErrorContext {
    pub timestamp: SystemTime,
    pub thread_id: Option<String>,
    pub component: String,
    pub operation: String,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub additional_info: BTreeMap<String, String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            thread_id: std::thread::current().name().map(|s| s.to_string()),
            component: component.to_string(),
            operation: operation.to_string(),
            file: None,
            line: None,
            additional_info: BTreeMap::new(),
        }
    }

    /// Create error context with file and line information
    pub fn with_location(component: &str, operation: &str, file: &'static str, line: u32) -> Self {
        let mut context = Self::new(component, operation);
        context.file = Some(file);
        context.line = Some(line);
        context
    }

    /// Add additional information to the context
    pub fn add_info<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional_info.insert(key.into(), value.into());
        self
    }
}

/// Macro for creating error context with file and line info
#[macro_export]
macro_rules! error_context {
    ($component:expr, $operation:expr) => {
        $crate::error::ErrorContext::with_location($component, $operation, file!(), line!())
    };
}

/// Result type alias for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl AnalyticsError {
    /// Wrap a validation failure with context
    pub fn validation(failure: ValidationFailure, context: ErrorContext) -> Self {
        AnalyticsError::Validation { failure, context }
    }

    /// The validation failure, if this is a validation error
    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            AnalyticsError::Validation { failure, .. } => Some(failure),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AnalyticsError::Validation { .. })
    }
}

/// Error builder for convenient error construction
pub struct AnalyticsErrorBuilder {
    component: String,
    operation: String,
}

impl AnalyticsErrorBuilder {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
        }
    }

    fn context(&self) -> ErrorContext {
        ErrorContext::new(&self.component, &self.operation)
    }

    pub fn validation(self, failure: ValidationFailure) -> AnalyticsError {
        AnalyticsError::Validation {
            context: self.context(),
            failure,
        }
    }

    pub fn malformed_config(self, field: &str, reason: &str) -> AnalyticsError {
        self.validation(ValidationFailure::MalformedConfig {
            field: field.to_string(),
            reason: reason.to_string(),
        })
    }

    pub fn invalid_parameter(self, field: &str, value: impl fmt::Display, reason: &str) -> AnalyticsError {
        self.validation(ValidationFailure::InvalidParameter {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        })
    }

    pub fn processing(self, stage: ProcessingStage, reason: &str) -> AnalyticsError {
        AnalyticsError::Processing {
            context: self.context(),
            stage,
            reason: reason.to_string(),
        }
    }
}
