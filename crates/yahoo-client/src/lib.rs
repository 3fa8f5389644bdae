//! Yahoo Finance client: fundamentals snapshot and one year of daily bars.

pub mod models;

use analysis_core::{AnalysisError, Bar, MetricsInput, MetricsProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub use models::{parse_chart, parse_quote_summary, QUOTE_SUMMARY_MODULES};

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const MAX_ATTEMPTS: u32 = 3;
const RETRY_WAIT_SECS: u64 = 5;

/// Wait before the next attempt after a 429, or `None` once attempts are spent.
fn retry_delay(attempt: u32) -> Option<Duration> {
    (attempt + 1 < MAX_ATTEMPTS).then(|| Duration::from_secs(RETRY_WAIT_SECS))
}

/// Sliding-window limiter: at most `max_requests` calls per `window`.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            let sleep_dur = match ts.front() {
                Some(&oldest) => (oldest + self.window).saturating_duration_since(now) + Duration::from_millis(50),
                None => Duration::from_millis(50),
            };
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for Yahoo slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooFinanceClient {
    /// Build a client from `YAHOO_BASE_URL` and `YAHOO_RATE_LIMIT` (requests per
    /// minute, default 60).
    pub fn new() -> Self {
        let base_url = std::env::var("YAHOO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let rate_limit: usize = std::env::var("YAHOO_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        Self::with_base_url(base_url, rate_limit)
    }

    pub fn with_base_url(base_url: impl Into<String>, rate_limit: usize) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AnalysisError> {
        let request = builder.build().map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        for attempt in 0..MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let Some(delay) = retry_delay(attempt) else { break };
            tracing::warn!(
                "Yahoo 429 rate limited on attempt {}/{}, waiting {}s",
                attempt + 1,
                MAX_ATTEMPTS,
                delay.as_secs()
            );
            tokio::time::sleep(delay).await;
        }

        Err(AnalysisError::ApiError(format!(
            "Rate limited by Yahoo after {} attempts",
            MAX_ATTEMPTS
        )))
    }

    /// GET `url` and decode the JSON body. A 404 means the symbol is unknown.
    async fn get_json(
        &self,
        symbol: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, AnalysisError> {
        let response = self.send_request(self.client.get(url).query(query)).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(AnalysisError::DataUnavailable(format!("Unknown symbol {}", symbol)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidData(e.to_string()))
    }

    /// Fundamentals snapshot from the quote-summary endpoint.
    pub async fn get_quote_summary(&self, symbol: &str) -> Result<MetricsInput, AnalysisError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let body = self
            .get_json(symbol, &url, &[("modules", QUOTE_SUMMARY_MODULES)])
            .await?;
        let metrics = parse_quote_summary(symbol, &body)?;
        tracing::debug!("Fetched {} metrics for {}", metrics.present_count(), symbol);
        Ok(metrics)
    }

    /// Daily bars over `range` (e.g. "1y"), oldest first.
    pub async fn get_daily_bars(&self, symbol: &str, range: &str) -> Result<Vec<Bar>, AnalysisError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let body = self
            .get_json(symbol, &url, &[("range", range), ("interval", "1d")])
            .await
            .map_err(|e| match e {
                AnalysisError::DataUnavailable(msg) => AnalysisError::HistoryUnavailable(msg),
                other => other,
            })?;
        parse_chart(symbol, &body)
    }
}

#[async_trait]
impl MetricsProvider for YahooFinanceClient {
    async fn fetch_metrics(&self, symbol: &str) -> Result<MetricsInput, AnalysisError> {
        self.get_quote_summary(symbol).await
    }

    async fn fetch_daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, AnalysisError> {
        self.get_daily_bars(symbol, "1y").await
    }
}
