//! Error hierarchy for the charting engine.
//!
//! Layer errors lift into [`ChartError`] through `From`, so `?` works across
//! the domain, application and infrastructure boundaries.

use crate::domain::market_data::SeriesId;
use derive_more::{Display, From};

/// Input rejected before any fetch is issued.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ValidationError {
    #[display(fmt = "window of {} hours is outside [1, 24]", _0)]
    WindowOutOfRange(i64),
    #[display(fmt = "unknown series {}", _0)]
    UnknownSeries(SeriesId),
    #[display(fmt = "select at least one series")]
    EmptySelection,
    #[display(fmt = "invalid chart dimensions: {}", _0)]
    InvalidDimensions(String),
}

/// Transport or service-level failure for one request.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum NetworkError {
    #[display(fmt = "request failed: {}", _0)]
    HttpRequestFailed(String),
    #[display(fmt = "HTTP {} {}", status, status_text)]
    HttpStatus { status: u16, status_text: String },
    #[display(fmt = "service reported '{}': {}", status, message)]
    ServiceStatus { status: String, message: String },
    #[display(fmt = "malformed response: {}", _0)]
    Decode(String),
    #[display(fmt = "all {} series requests failed", failed)]
    AllRequestsFailed { failed: usize },
}

/// Why a trend line could not be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RegressionError {
    #[display(fmt = "insufficient data: {} point(s), need at least 2", count)]
    InsufficientData { count: usize },
    #[display(fmt = "degenerate input: independent variable has zero variance")]
    DegenerateInput,
}

impl RegressionError {
    /// Short message for the chart surface.
    pub fn user_message(&self) -> &'static str {
        match self {
            RegressionError::InsufficientData { .. } => "Not enough data",
            RegressionError::DegenerateInput => "The data has no spread",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum ConfigurationError {
    #[display(fmt = "invalid parameter {}: {}", name, reason)]
    InvalidParameter { name: &'static str, reason: String },
    #[display(fmt = "cannot parse configuration: {}", _0)]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum RenderingError {
    #[display(fmt = "canvas '{}' not found", _0)]
    CanvasNotFound(String),
    #[display(fmt = "2D context unavailable: {}", _0)]
    ContextUnavailable(String),
    #[display(fmt = "draw call failed: {}", _0)]
    DrawFailed(String),
}

/// Root error type for the crate.
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum ChartError {
    #[display(fmt = "Validation Error: {}", _0)]
    Validation(ValidationError),
    #[display(fmt = "Network Error: {}", _0)]
    Network(NetworkError),
    #[display(fmt = "Regression Error: {}", _0)]
    Regression(RegressionError),
    #[display(fmt = "Configuration Error: {}", _0)]
    Configuration(ConfigurationError),
    #[display(fmt = "Rendering Error: {}", _0)]
    Rendering(RenderingError),
    /// Superseded response; expected control flow, never shown to the user.
    #[display(fmt = "stale response #{} (latest #{})", sequence, latest)]
    #[from(ignore)]
    StaleResponse { sequence: u64, latest: u64 },
}

impl ChartError {
    pub fn is_stale(&self) -> bool {
        matches!(self, ChartError::StaleResponse { .. })
    }
}

impl std::error::Error for ValidationError {}
impl std::error::Error for NetworkError {}
impl std::error::Error for RegressionError {}
impl std::error::Error for ConfigurationError {}
impl std::error::Error for RenderingError {}
impl std::error::Error for ChartError {}

pub type ChartResult<T> = Result<T, ChartError>;
pub type NetworkResult<T> = Result<T, NetworkError>;
