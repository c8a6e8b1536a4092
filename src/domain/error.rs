//! Domain error types.
//!
//! Insufficient history is not an error: simulations return `None` and the
//! walk-forward loop skips the window. These variants cover configuration
//! and loading failures that should stop the program.

use chrono::NaiveDate;

/// Top-level error type for trendwalk.
#[derive(Debug, thiserror::Error)]
pub enum TrendwalkError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data load error: {reason}")]
    DataLoad { reason: String },

    #[error("stale data: newest observation {newest} is more than {max_days} days before {as_of}")]
    StaleData {
        newest: NaiveDate,
        as_of: NaiveDate,
        max_days: i64,
    },

    #[error("no usable price data in {source_name}")]
    NoData { source_name: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendwalkError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TrendwalkError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TrendwalkError> for std::process::ExitCode {
    fn from(err: &TrendwalkError) -> Self {
        let code: u8 = match err {
            TrendwalkError::Io(_) => 1,
            TrendwalkError::ConfigParse { .. }
            | TrendwalkError::ConfigMissing { .. }
            | TrendwalkError::ConfigInvalid { .. } => 2,
            TrendwalkError::DataLoad { .. } | TrendwalkError::StaleData { .. } => 3,
            TrendwalkError::NoData { .. } | TrendwalkError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
