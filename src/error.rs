//! Error types for Sentinel.

use thiserror::Error;

/// Why a prediction could not be obtained.
///
/// The detail view treats every variant the same way (a failed screen with a
/// retry control); the split exists for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    /// The request never produced a response (DNS, refused connection, reset).
    #[error("prediction service unreachable: {0}")]
    Network(String),

    /// No response arrived within the configured bound.
    #[error("prediction service timed out after {0} ms")]
    Timeout(u64),

    /// The service answered with a non-success status.
    #[error("prediction service returned {code} {status_text}")]
    Status { code: u16, status_text: String },

    /// The body of a successful response was not a prediction payload.
    #[error("malformed prediction payload: {0}")]
    Decode(String),

    /// Caller passed an empty hospital identifier.
    #[error("hospital identifier must not be empty")]
    EmptyHospitalId,
}

/// Errors raised by the view-state container and the console API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("unknown hospital '{0}'")]
    UnknownHospital(String),

    #[error("retry is only available after a failed prediction")]
    NotRetryable,

    #[error("map layers can only be changed while the map is showing")]
    MapNotShowing,

    #[error("unknown map layer '{0}'")]
    UnknownLayer(String),

    #[error("unsupported language '{0}'")]
    UnknownLanguage(String),
}
