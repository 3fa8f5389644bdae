use async_trait::async_trait;
use crate::{AnalysisError, Bar, MetricsInput};

/// Source of fundamentals and price history for a single symbol.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Fetch the metrics bag for `symbol`.
    ///
    /// Must fail with [`AnalysisError::DataUnavailable`] when the symbol is unknown
    /// or no current trading price is available.
    async fn fetch_metrics(&self, symbol: &str) -> Result<MetricsInput, AnalysisError>;

    /// Fetch roughly one year of daily bars, oldest first.
    async fn fetch_daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, AnalysisError>;
}
