use analysis_core::{CompositeResult, FactorScore, Grade, MetricsInput, Recommendation};

use crate::config::ScoringConfig;
use crate::{factors, valuation, NEUTRAL_SCORE};

/// Guards truncation against binary rounding (89.0 computed as 88.99999999999999).
const TRUNCATION_EPSILON: f64 = 1e-9;

/// Multi-factor quant scoring engine.
///
/// Stateless apart from its configuration; `score` is a pure function of the input.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Compute every factor sub-score, in display order.
    pub fn factor_scores(&self, metrics: &MetricsInput) -> Vec<FactorScore> {
        let mut scores = vec![
            valuation::score(metrics, self.config.valuation),
            factors::profitability(metrics, self.config.family),
            factors::growth(metrics, self.config.family),
            factors::momentum(metrics),
            factors::safety(metrics),
        ];
        if self.config.weights.weights().includes_market_quality() {
            scores.push(factors::market_quality(metrics));
        }
        scores
    }

    /// Score a metrics snapshot.
    ///
    /// Never fails: absent metrics resolve to neutral sub-scores, so an empty input
    /// scores exactly 50.
    pub fn score(&self, metrics: &MetricsInput) -> CompositeResult {
        let factors = self.factor_scores(metrics);
        let weights = self.config.weights.weights();

        let total_weight: f64 = factors.iter().map(|f| weights.weight(f.factor)).sum();
        let weighted = if total_weight > 0.0 && total_weight.is_finite() {
            factors
                .iter()
                .map(|f| f.score * weights.weight(f.factor))
                .sum::<f64>()
                / total_weight
        } else {
            NEUTRAL_SCORE
        };

        let score = truncate_score(weighted);

        CompositeResult {
            score,
            grade: Grade::from_score(score as f64),
            recommendation: Recommendation::from_score(score),
            factors,
        }
    }
}

/// Truncate (not round) to an integer in [0, 100].
fn truncate_score(weighted: f64) -> u32 {
    if weighted.is_nan() {
        return NEUTRAL_SCORE as u32;
    }
    (weighted + TRUNCATION_EPSILON).clamp(0.0, 100.0).trunc() as u32
}
