use thiserror::Error;

/// Failures that can cross a component boundary.
///
/// A missing individual metric is not an error: the scoring engine resolves it
/// locally to a neutral default and never reports it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The symbol is unknown upstream or lacks a current trading price.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Price history lookup failed. Only the momentum factor consumes this.
    #[error("Price history unavailable: {0}")]
    HistoryUnavailable(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AnalysisError {
    /// True when the failure is the caller's fault rather than upstream's.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidSymbol(_) | AnalysisError::DataUnavailable(_)
        )
    }
}
