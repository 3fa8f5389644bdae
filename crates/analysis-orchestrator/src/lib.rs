use analysis_core::{AnalysisError, MetricsInput, MetricsProvider, StockReport};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use scoring_engine::{commentary, factor_grades, trailing_return_from_bars, ScoringConfig, ScoringEngine};
use std::sync::Arc;
use yahoo_client::YahooFinanceClient;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

const DEFAULT_CACHE_TTL_SECS: i64 = 300;

/// Fetches a symbol's fundamentals and price history, scores it, and assembles the
/// report handed to the presentation layer.
pub struct AnalysisOrchestrator {
    provider: Arc<dyn MetricsProvider>,
    engine: ScoringEngine,
    /// Fundamentals snapshot per symbol, without momentum.
    metrics_cache: DashMap<String, CacheEntry<MetricsInput>>,
    cache_ttl_secs: i64,
}

impl AnalysisOrchestrator {
    pub fn new(provider: Arc<dyn MetricsProvider>, engine: ScoringEngine) -> Self {
        Self {
            provider,
            engine,
            metrics_cache: DashMap::new(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }

    /// Yahoo-backed orchestrator configured from the environment
    /// (`SCORING_*`, `YAHOO_*`, `METRICS_CACHE_TTL_SECS`).
    pub fn from_env() -> Result<Self, AnalysisError> {
        let config = ScoringConfig::from_env()?;
        config
            .validate()
            .map_err(|errors| AnalysisError::ConfigError(errors.join("; ")))?;

        let ttl = std::env::var("METRICS_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);

        Ok(Self::new(Arc::new(YahooFinanceClient::new()), ScoringEngine::with_config(config)).with_cache_ttl(ttl))
    }

    /// Zero or negative disables the metrics cache.
    pub fn with_cache_ttl(mut self, secs: i64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Analyze with the orchestrator's own scoring configuration.
    pub async fn analyze(&self, symbol: &str) -> Result<StockReport, AnalysisError> {
        self.run(symbol, &self.engine).await
    }

    /// Analyze with a one-off scoring configuration (e.g. from request parameters).
    pub async fn analyze_with(&self, symbol: &str, config: ScoringConfig) -> Result<StockReport, AnalysisError> {
        config
            .validate()
            .map_err(|errors| AnalysisError::ConfigError(errors.join("; ")))?;
        self.run(symbol, &ScoringEngine::with_config(config)).await
    }

    async fn run(&self, symbol: &str, engine: &ScoringEngine) -> Result<StockReport, AnalysisError> {
        let symbol = normalize_symbol(symbol)?;
        tracing::info!("Starting analysis for {}", symbol);

        let (metrics_result, bars_result) = tokio::join!(
            self.get_metrics(&symbol),
            self.provider.fetch_daily_bars(&symbol),
        );

        let mut metrics = metrics_result?;

        metrics.momentum_1y = match bars_result {
            Ok(bars) => {
                let ret = trailing_return_from_bars(&bars);
                if ret.is_none() {
                    tracing::warn!("Unusable price history for {} ({} bars), momentum neutral", symbol, bars.len());
                }
                ret
            }
            Err(e) => {
                tracing::warn!("Price history unavailable for {}: {}", symbol, e);
                None
            }
        };

        let result = engine.score(&metrics);
        tracing::info!(
            "{} scored {}/100 ({}, {})",
            symbol,
            result.score,
            result.grade,
            result.recommendation.to_label()
        );

        Ok(StockReport {
            name: metrics.short_name.clone(),
            timestamp: Utc::now(),
            current_price: metrics.current_price,
            target_price: metrics.target_mean_price,
            upside_pct: upside_pct(metrics.current_price, metrics.target_mean_price),
            market_cap: metrics.market_cap,
            sector: metrics.sector.clone(),
            industry: metrics.industry.clone(),
            factor_grades: factor_grades(&metrics),
            commentary: commentary(&result),
            result,
            symbol,
        })
    }

    /// Fundamentals for `symbol` (cached, 5-min TTL by default)
    async fn get_metrics(&self, symbol: &str) -> Result<MetricsInput, AnalysisError> {
        let cached = self
            .metrics_cache
            .get(symbol)
            .map(|entry| ((Utc::now() - entry.cached_at).num_seconds(), entry.data.clone()));
        match cached {
            Some((age, data)) if age < self.cache_ttl_secs => {
                tracing::debug!("Metrics cache hit for {} ({}s old)", symbol, age);
                return Ok(data);
            }
            // Stale; the read guard is already dropped here.
            Some(_) => {
                self.metrics_cache.remove(symbol);
            }
            None => {}
        }

        let metrics = self.provider.fetch_metrics(symbol).await?;

        if self.cache_ttl_secs > 0 {
            self.metrics_cache.insert(
                symbol.to_string(),
                CacheEntry {
                    data: metrics.clone(),
                    cached_at: Utc::now(),
                },
            );
        }

        Ok(metrics)
    }
}

/// Trim and upper-case a ticker. Rejects empty input and characters that never
/// appear in Yahoo symbols.
pub fn normalize_symbol(symbol: &str) -> Result<String, AnalysisError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AnalysisError::InvalidSymbol("symbol is empty".to_string()));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(AnalysisError::InvalidSymbol(symbol));
    }
    Ok(symbol)
}

fn upside_pct(current: Option<f64>, target: Option<f64>) -> Option<f64> {
    match (current, target) {
        (Some(c), Some(t)) if c > 0.0 && t.is_finite() => Some((t - c) / c * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Bar, FactorKind, Grade, Metric, Recommendation};
    use async_trait::async_trait;
    use chrono::Duration;
    use scoring_engine::WeightScheme;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        metrics: Result<MetricsInput, AnalysisError>,
        closes: Result<Vec<f64>, AnalysisError>,
        metrics_calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(metrics: Result<MetricsInput, AnalysisError>, closes: Result<Vec<f64>, AnalysisError>) -> Self {
            Self {
                metrics,
                closes,
                metrics_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MetricsProvider for MockProvider {
        async fn fetch_metrics(&self, _symbol: &str) -> Result<MetricsInput, AnalysisError> {
            self.metrics_calls.fetch_add(1, Ordering::SeqCst);
            self.metrics.clone()
        }

        async fn fetch_daily_bars(&self, _symbol: &str) -> Result<Vec<Bar>, AnalysisError> {
            let closes = self.closes.clone()?;
            let start = Utc::now() - Duration::days(closes.len() as i64);
            Ok(closes
                .iter()
                .enumerate()
                .map(|(i, c)| Bar {
                    timestamp: start + Duration::days(i as i64),
                    open: *c,
                    high: *c,
                    low: *c,
                    close: *c,
                    volume: 0.0,
                })
                .collect())
        }
    }

    fn strong_metrics() -> MetricsInput {
        let mut m = MetricsInput::default()
            .with(Metric::Peg, 0.8)
            .with(Metric::GrossMargin, 0.5)
            .with(Metric::RevenueGrowth, 0.2)
            .with(Metric::DebtToEquity, 50.0);
        m.short_name = Some("Acme Corp".to_string());
        m.current_price = Some(100.0);
        m.target_mean_price = Some(125.0);
        m
    }

    fn orchestrator(provider: MockProvider) -> (AnalysisOrchestrator, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        let orch = AnalysisOrchestrator::new(provider.clone(), ScoringEngine::new());
        (orch, provider)
    }

    #[tokio::test]
    async fn test_history_failure_degrades_momentum() {
        let (orch, _) = orchestrator(MockProvider::new(
            Ok(strong_metrics()),
            Err(AnalysisError::HistoryUnavailable("timeout".to_string())),
        ));

        let report = orch.analyze(" acme ").await.unwrap();
        assert_eq!(report.symbol, "ACME");
        assert_eq!(report.name.as_deref(), Some("Acme Corp"));
        assert_eq!(report.result.score, 89);
        assert_eq!(report.result.grade, Grade::A);
        assert_eq!(report.result.recommendation, Recommendation::StrongBuy);

        let momentum = report.result.factor(FactorKind::Momentum).unwrap();
        assert_eq!(momentum.score, 50.0);
        assert!(momentum.is_default());
    }

    #[tokio::test]
    async fn test_history_feeds_momentum() {
        let (orch, _) = orchestrator(MockProvider::new(Ok(strong_metrics()), Ok(vec![100.0, 110.0, 120.0])));

        let report = orch.analyze("ACME").await.unwrap();
        let momentum = report.result.factor(FactorKind::Momentum).unwrap();
        assert_eq!(momentum.score, 70.0);
        assert_eq!(momentum.detail, "1Y Return: 20.0%");
        assert!(report
            .factor_grades
            .iter()
            .any(|g| g.metric == Metric::Momentum1y && g.grade == Grade::B));
    }

    #[tokio::test]
    async fn test_report_fields() {
        let (orch, _) = orchestrator(MockProvider::new(Ok(strong_metrics()), Ok(vec![])));

        let report = orch.analyze("ACME").await.unwrap();
        assert_eq!(report.current_price, Some(100.0));
        assert_eq!(report.target_price, Some(125.0));
        assert_eq!(report.upside_pct, Some(25.0));
        assert_eq!(report.commentary.len(), report.result.factors.len() + 1);
        assert_eq!(report.factor_grades.len(), 4);
    }

    #[tokio::test]
    async fn test_data_unavailable_is_surfaced() {
        let (orch, _) = orchestrator(MockProvider::new(
            Err(AnalysisError::DataUnavailable("No current price for ZZZZ".to_string())),
            Ok(vec![1.0, 2.0]),
        ));

        let err = orch.analyze("ZZZZ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_invalid_symbols_rejected_before_fetch() {
        let (orch, provider) = orchestrator(MockProvider::new(Ok(strong_metrics()), Ok(vec![])));

        for bad in ["", "   ", "AA PL", "../etc"] {
            let err = orch.analyze(bad).await.unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidSymbol(_)), "{:?}", bad);
        }
        assert_eq!(provider.metrics_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_metrics_are_cached() {
        let (orch, provider) = orchestrator(MockProvider::new(Ok(strong_metrics()), Ok(vec![])));

        orch.analyze("ACME").await.unwrap();
        orch.analyze("acme").await.unwrap();
        assert_eq!(provider.metrics_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_disabled_with_zero_ttl() {
        let provider = Arc::new(MockProvider::new(Ok(strong_metrics()), Ok(vec![])));
        let orch = AnalysisOrchestrator::new(provider.clone(), ScoringEngine::new()).with_cache_ttl(0);

        orch.analyze("ACME").await.unwrap();
        orch.analyze("ACME").await.unwrap();
        assert_eq!(provider.metrics_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted() {
        let (orch, provider) = orchestrator(MockProvider::new(
            Err(AnalysisError::DataUnavailable("No data found for ZZZZ".to_string())),
            Ok(vec![]),
        ));
        orch.metrics_cache.insert(
            "ZZZZ".to_string(),
            CacheEntry {
                data: strong_metrics(),
                cached_at: Utc::now() - Duration::seconds(DEFAULT_CACHE_TTL_SECS + 60),
            },
        );

        let err = orch.analyze("ZZZZ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable(_)));
        assert_eq!(provider.metrics_calls.load(Ordering::SeqCst), 1);
        assert!(!orch.metrics_cache.contains_key("ZZZZ"));
    }

    #[tokio::test]
    async fn test_single_close_history_is_flat_momentum() {
        let (orch, _) = orchestrator(MockProvider::new(Ok(strong_metrics()), Ok(vec![150.0])));

        let report = orch.analyze("ACME").await.unwrap();
        let momentum = report.result.factor(FactorKind::Momentum).unwrap();
        assert_eq!(momentum.score, 40.0);
        assert_eq!(momentum.detail, "1Y Return: 0.0%");
        assert_eq!(report.result.score, 88);
    }

    #[tokio::test]
    async fn test_analyze_with_six_factor() {
        let (orch, _) = orchestrator(MockProvider::new(Ok(strong_metrics()), Ok(vec![])));

        let config = ScoringConfig {
            weights: WeightScheme::SixFactor,
            ..Default::default()
        };
        let report = orch.analyze_with("ACME", config).await.unwrap();
        assert_eq!(report.result.factors.len(), 6);
        assert!(report.result.factor(FactorKind::MarketQuality).unwrap().is_default());
    }

    #[test]
    fn test_upside() {
        assert_eq!(upside_pct(Some(50.0), Some(40.0)), Some(-20.0));
        assert_eq!(upside_pct(None, Some(40.0)), None);
        assert_eq!(upside_pct(Some(0.0), Some(40.0)), None);
    }
}
