//! Profitability, growth, momentum, safety and market-quality factors.
//!
//! Valuation has its own module because of its fallback chain.

use analysis_core::{FactorKind, FactorScore, Metric, MetricsInput};

use crate::config::ScoringFamily;
use crate::{clamp_factor, NEUTRAL_SCORE, NOT_AVAILABLE};

/// Gross margin (percent) mapped linearly: 0% -> 20, 50% and above -> 100.
pub fn profitability_linear(gross_margin_pct: f64) -> f64 {
    clamp_factor((gross_margin_pct / 50.0) * 80.0 + 20.0)
}

/// Revenue growth (percent) mapped linearly: 0% -> 20, 20% and above -> 100.
pub fn growth_linear(revenue_growth_pct: f64) -> f64 {
    clamp_factor((revenue_growth_pct / 20.0) * 80.0 + 20.0)
}

/// Trailing one-year return (percent): -40% -> 20 (floor), 0% -> 40, 40% -> 100.
pub fn momentum_linear(return_pct: f64) -> f64 {
    clamp_factor((return_pct / 40.0) * 60.0 + 40.0)
}

/// Debt/equity (percent): 50% or less -> 100, 200% or more -> 20.
pub fn safety_linear(debt_to_equity_pct: f64) -> f64 {
    clamp_factor(100.0 - ((debt_to_equity_pct - 50.0) / 150.0 * 80.0))
}

/// Institutional ownership (percent) in fixed bands.
pub fn market_quality_banded(ownership_pct: f64) -> f64 {
    match ownership_pct {
        p if p >= 60.0 => 100.0,
        p if p >= 40.0 => 80.0,
        p if p >= 20.0 => 60.0,
        _ => 40.0,
    }
}

fn neutral(kind: FactorKind) -> FactorScore {
    FactorScore::new(kind, NEUTRAL_SCORE, NOT_AVAILABLE, None)
}

/// Start at the floor and add `points` for every metric clearing its threshold.
/// Returns `None` when none of the metrics are present.
fn banded(metrics: &MetricsInput, rules: &[(Metric, f64, f64, &str)]) -> Option<(f64, String, f64)> {
    let mut score = crate::MIN_FACTOR_SCORE;
    let mut parts = Vec::new();
    let mut first = None;

    for (metric, threshold_pct, points, label) in rules {
        if let Some(pct) = metrics.get_display(*metric) {
            first.get_or_insert(pct);
            if pct >= *threshold_pct {
                score += points;
            }
            parts.push(format!("{}: {:.1}%", label, pct));
        }
    }

    first.map(|raw| (clamp_factor(score), parts.join(" · "), raw))
}

pub fn profitability(metrics: &MetricsInput, family: ScoringFamily) -> FactorScore {
    let kind = FactorKind::Profitability;
    match family {
        ScoringFamily::Linear => match metrics.get_display(Metric::GrossMargin) {
            Some(gm) => FactorScore::new(kind, profitability_linear(gm), format!("Margin: {:.1}%", gm), Some(gm)),
            None => neutral(kind),
        },
        ScoringFamily::Banded => banded(
            metrics,
            &[
                (Metric::GrossMargin, 40.0, 40.0, "Margin"),
                (Metric::OperatingMargin, 15.0, 20.0, "Op Margin"),
                (Metric::ReturnOnEquity, 15.0, 20.0, "ROE"),
            ],
        )
        .map(|(score, detail, raw)| FactorScore::new(kind, score, detail, Some(raw)))
        .unwrap_or_else(|| neutral(kind)),
    }
}

pub fn growth(metrics: &MetricsInput, family: ScoringFamily) -> FactorScore {
    let kind = FactorKind::Growth;
    match family {
        ScoringFamily::Linear => match metrics.get_display(Metric::RevenueGrowth) {
            Some(rg) => FactorScore::new(kind, growth_linear(rg), format!("Rev Growth: {:.1}%", rg), Some(rg)),
            None => neutral(kind),
        },
        ScoringFamily::Banded => banded(
            metrics,
            &[
                (Metric::RevenueGrowth, 10.0, 40.0, "Rev Growth"),
                (Metric::EarningsGrowth, 10.0, 40.0, "EPS Growth"),
            ],
        )
        .map(|(score, detail, raw)| FactorScore::new(kind, score, detail, Some(raw)))
        .unwrap_or_else(|| neutral(kind)),
    }
}

/// Missing history means a 0% return with a neutral score.
pub fn momentum(metrics: &MetricsInput) -> FactorScore {
    match metrics.get(Metric::Momentum1y) {
        Some(ret) => FactorScore::new(
            FactorKind::Momentum,
            momentum_linear(ret),
            format!("1Y Return: {:.1}%", ret),
            Some(ret),
        ),
        None => FactorScore::new(FactorKind::Momentum, NEUTRAL_SCORE, "1Y Return: 0.0%", None),
    }
}

pub fn safety(metrics: &MetricsInput) -> FactorScore {
    match metrics.get(Metric::DebtToEquity) {
        Some(de) => FactorScore::new(FactorKind::Safety, safety_linear(de), format!("D/E: {:.1}%", de), Some(de)),
        None => neutral(FactorKind::Safety),
    }
}

pub fn market_quality(metrics: &MetricsInput) -> FactorScore {
    match metrics.get_display(Metric::InstitutionalOwnership) {
        Some(own) => FactorScore::new(
            FactorKind::MarketQuality,
            market_quality_banded(own),
            format!("Inst. Own: {:.1}%", own),
            Some(own),
        ),
        None => neutral(FactorKind::MarketQuality),
    }
}
