//! Multi-factor quant scoring.
//!
//! Turns a [`MetricsInput`](analysis_core::MetricsInput) snapshot into a 0-100
//! composite score, per-factor sub-scores with letter grades, and a
//! recommendation tier. Scoring is a pure function of its input: missing metrics
//! fall back to a neutral 50 instead of failing.

pub mod benchmarks;
pub mod commentary;
pub mod config;
pub mod engine;
pub mod factors;
pub mod momentum;
pub mod valuation;

pub use benchmarks::{factor_grades, grade_metric, Direction, MetricBenchmark, BENCHMARKS};
pub use commentary::commentary;
pub use config::{FactorWeights, ScoringConfig, ScoringFamily, ValuationMode, WeightScheme};
pub use engine::ScoringEngine;
pub use momentum::{trailing_return_from_bars, trailing_return_pct};

/// Sub-score used whenever a factor has nothing to work with.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Floor and ceiling for the five core factor sub-scores.
pub const MIN_FACTOR_SCORE: f64 = 20.0;
pub const MAX_FACTOR_SCORE: f64 = 100.0;

/// Detail string for a factor that fell back to its default.
pub const NOT_AVAILABLE: &str = "N/A";

pub(crate) fn clamp_factor(value: f64) -> f64 {
    if value.is_nan() {
        return NEUTRAL_SCORE;
    }
    value.clamp(MIN_FACTOR_SCORE, MAX_FACTOR_SCORE)
}
