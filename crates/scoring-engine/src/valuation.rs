use analysis_core::{FactorKind, FactorScore, Metric, MetricsInput};

use crate::config::ValuationMode;
use crate::{NEUTRAL_SCORE, NOT_AVAILABLE};

/// A valuation multiple and the reference value it is judged against.
#[derive(Debug, Clone, Copy)]
pub struct ValuationBenchmark {
    pub metric: Metric,
    pub benchmark: f64,
    /// Weight in blended mode.
    pub weight: f64,
    /// Decimal places in the detail string.
    pub precision: usize,
}

/// Fallback chain for first-available mode, most precise first.
pub const FALLBACK_CHAIN: [ValuationBenchmark; 3] = [
    ValuationBenchmark { metric: Metric::Peg, benchmark: 1.0, weight: 0.3, precision: 2 },
    ValuationBenchmark { metric: Metric::ForwardPe, benchmark: 20.0, weight: 0.3, precision: 1 },
    ValuationBenchmark { metric: Metric::PriceToSales, benchmark: 5.0, weight: 0.0, precision: 1 },
];

/// Inputs to blended mode.
pub const BLENDED: [ValuationBenchmark; 4] = [
    ValuationBenchmark { metric: Metric::Peg, benchmark: 1.0, weight: 0.3, precision: 2 },
    ValuationBenchmark { metric: Metric::ForwardPe, benchmark: 20.0, weight: 0.3, precision: 1 },
    ValuationBenchmark { metric: Metric::EvToEbitda, benchmark: 15.0, weight: 0.2, precision: 1 },
    ValuationBenchmark { metric: Metric::PriceToFcf, benchmark: 20.0, weight: 0.2, precision: 1 },
];

/// Map `value / benchmark` to a score: cheaper relative to the benchmark scores higher.
pub fn ratio_to_score(ratio: f64) -> f64 {
    match ratio {
        r if r <= 0.5 => 100.0,
        r if r <= 0.8 => 90.0,
        r if r <= 1.0 => 80.0,
        r if r <= 1.5 => 60.0,
        r if r <= 2.0 => 40.0,
        _ => 20.0,
    }
}

fn detail(bench: &ValuationBenchmark, value: f64) -> String {
    format!("{}: {:.*}", bench.metric.label(), bench.precision, value)
}

pub fn score(metrics: &MetricsInput, mode: ValuationMode) -> FactorScore {
    match mode {
        ValuationMode::FirstAvailable => score_first_available(metrics),
        ValuationMode::Blended => score_blended(metrics),
    }
}

/// Score the first ratio present in [`FALLBACK_CHAIN`].
pub fn score_first_available(metrics: &MetricsInput) -> FactorScore {
    FALLBACK_CHAIN
        .iter()
        .find_map(|bench| metrics.get(bench.metric).map(|value| (bench, value)))
        .map(|(bench, value)| {
            let sub = ratio_to_score(value / bench.benchmark);
            FactorScore::new(FactorKind::Valuation, sub, detail(bench, value), Some(value))
        })
        .unwrap_or_else(|| FactorScore::new(FactorKind::Valuation, NEUTRAL_SCORE, NOT_AVAILABLE, None))
}

/// Weighted average over every [`BLENDED`] ratio present, renormalized by the
/// weights actually used.
pub fn score_blended(metrics: &MetricsInput) -> FactorScore {
    let present: Vec<(&ValuationBenchmark, f64)> = BLENDED
        .iter()
        .filter_map(|bench| metrics.get(bench.metric).map(|value| (bench, value)))
        .collect();

    if present.is_empty() {
        return FactorScore::new(FactorKind::Valuation, NEUTRAL_SCORE, NOT_AVAILABLE, None);
    }

    let total_weight: f64 = present.iter().map(|(b, _)| b.weight).sum();
    let weighted: f64 = present
        .iter()
        .map(|(b, v)| ratio_to_score(v / b.benchmark) * b.weight)
        .sum();

    let details = present
        .iter()
        .map(|(b, v)| detail(b, *v))
        .collect::<Vec<_>>()
        .join(" · ");

    // The leading metric stands in as the raw value.
    FactorScore::new(FactorKind::Valuation, weighted / total_weight, details, Some(present[0].1))
}
