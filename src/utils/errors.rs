use thiserror::Error;

use crate::models::ArimaOrder;

/// Failures of the data source stage. Either one halts the request before
/// any chart is drawn.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("No data found for the given date range. Please try a different range. ({provider}: {instrument})")]
    EmptyResult {
        provider: &'static str,
        instrument: String,
    },
    #[error("Failed to retrieve data from {provider}: {reason}")]
    RetrievalError {
        provider: &'static str,
        reason: String,
    },
}

/// Failures of the forecast stage. Only the forecast is skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelFailure {
    #[error("insufficient observations for ARIMA{order}: need at least {required}, got {available}")]
    InsufficientData {
        order: ArimaOrder,
        required: usize,
        available: usize,
    },
    #[error("ARIMA{order} is not supported: moving-average terms (q > 0) cannot be fitted")]
    UnsupportedOrder { order: ArimaOrder },
    #[error("singular design matrix while fitting ARIMA{order}")]
    SingularSystem { order: ArimaOrder },
    #[error("forecast became non-finite at step {step}")]
    NumericalOverflow { step: usize },
}

/// Failures of the presentation stage
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No data available for plotting.")]
    NoData,
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to prepare output directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid settings in the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Strip a leading emoji marker so messages can be re-wrapped by the shell
///
/// "❌ Unknown data source" -> "Unknown data source"
pub fn extract_clean_error(error_msg: &str) -> String {
    let trimmed = error_msg.trim();
    trimmed
        .strip_prefix("❌")
        .or_else(|| trimmed.strip_prefix("⚠️"))
        .map(|rest| rest.trim().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
