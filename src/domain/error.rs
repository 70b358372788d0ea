//! Domain error types.
//!
//! `EodError` covers faults that abort a run. Expected non-trade outcomes are
//! values (see [`crate::domain::trade_plan::NoTradeReason`]) and never appear here.

/// Top-level error type for eodtrader.
#[derive(Debug, thiserror::Error)]
pub enum EodError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

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

    #[error("missing {series} value at bar {index}")]
    MissingIndicator { series: String, index: usize },

    #[error("execution rejected: {reason}")]
    Execution { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EodError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        EodError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&EodError> for std::process::ExitCode {
    fn from(err: &EodError) -> Self {
        let code: u8 = match err {
            EodError::Io(_) | EodError::Execution { .. } => 1,
            EodError::ConfigParse { .. }
            | EodError::ConfigMissing { .. }
            | EodError::ConfigInvalid { .. } => 2,
            EodError::Data { .. } | EodError::NoData { .. } => 3,
            EodError::MissingIndicator { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
