use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NasMetricsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Deadline of {0:?} exceeded")]
    Timeout(Duration),

    #[error("Fetched no datapoints for {metric}")]
    EmptySeries { metric: String },

    #[error("Sample count is zero for {metric}")]
    DivideByZero { metric: String },

    #[error("Malformed value {value:?} for {metric}")]
    MalformedValue { metric: String, value: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NasMetricsError {
    /// Stable label for counters and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            NasMetricsError::Configuration(_) => "configuration",
            NasMetricsError::Transport(_) => "transport",
            NasMetricsError::Signing(_) => "signing",
            NasMetricsError::Decode(_) => "decode",
            NasMetricsError::Timeout(_) => "timeout",
            NasMetricsError::EmptySeries { .. } => "empty_series",
            NasMetricsError::DivideByZero { .. } => "divide_by_zero",
            NasMetricsError::MalformedValue { .. } => "malformed_value",
            NasMetricsError::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for NasMetricsError {
    fn from(err: reqwest::Error) -> Self {
        NasMetricsError::Transport(err.to_string())
    }
}

impl From<quick_xml::DeError> for NasMetricsError {
    fn from(err: quick_xml::DeError) -> Self {
        NasMetricsError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for NasMetricsError {
    fn from(err: url::ParseError) -> Self {
        NasMetricsError::Configuration(format!("invalid endpoint: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, NasMetricsError>;
