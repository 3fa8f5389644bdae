use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Metric;

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Letter grade shared by composite scores, factor scores and raw metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Band a 0-100 score: >=90 A+, >=80 A, >=70 B, >=60 C, >=40 D, else F.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Grade::APlus,
            s if s >= 80.0 => Grade::A,
            s if s >= 70.0 => Grade::B,
            s if s >= 60.0 => Grade::C,
            s if s >= 40.0 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation tier derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    /// >=80 Strong Buy, >=60 Buy, <=40 Sell; only 41..=59 is Hold.
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 80 => Recommendation::StrongBuy,
            s if s >= 60 => Recommendation::Buy,
            s if s <= 40 => Recommendation::Sell,
            _ => Recommendation::Hold,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
        }
    }

    /// One-line banner subtitle.
    pub fn description(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong buy candidate",
            Recommendation::Buy => "Worth considering a position",
            Recommendation::Hold => "Wait and watch",
            Recommendation::Sell => "Sell or reduce exposure",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}

/// Scoring factors, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorKind {
    Valuation,
    Profitability,
    Growth,
    Momentum,
    Safety,
    MarketQuality,
}

impl FactorKind {
    pub fn title(&self) -> &'static str {
        match self {
            FactorKind::Valuation => "Valuation",
            FactorKind::Profitability => "Profitability",
            FactorKind::Growth => "Growth",
            FactorKind::Momentum => "Momentum",
            FactorKind::Safety => "Safety",
            FactorKind::MarketQuality => "Market Quality",
        }
    }
}

/// One factor's contribution to the composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: FactorKind,
    pub score: f64,
    pub grade: Grade,
    /// Display string such as `"PEG: 0.85"`, or `"N/A"` when the factor defaulted.
    pub detail: String,
    /// The raw input the sub-score was derived from, if any.
    pub raw_value: Option<f64>,
}

impl FactorScore {
    pub fn new(factor: FactorKind, score: f64, detail: impl Into<String>, raw_value: Option<f64>) -> Self {
        Self {
            factor,
            score,
            grade: Grade::from_score(score),
            detail: detail.into(),
            raw_value,
        }
    }

    /// True when the factor fell back to its neutral default.
    pub fn is_default(&self) -> bool {
        self.raw_value.is_none()
    }
}

/// Weighted aggregate of all factor scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    /// Truncated weighted sum, 0-100.
    pub score: u32,
    pub grade: Grade,
    pub recommendation: Recommendation,
    pub factors: Vec<FactorScore>,
}

impl CompositeResult {
    pub fn factor(&self, kind: FactorKind) -> Option<&FactorScore> {
        self.factors.iter().find(|f| f.factor == kind)
    }
}

/// A raw metric graded against its benchmark thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricGrade {
    pub metric: Metric,
    pub label: String,
    pub value: f64,
    pub display: String,
    pub grade: Grade,
}

/// Everything the presentation layer needs for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReport {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub current_price: Option<f64>,
    pub target_price: Option<f64>,
    /// Percent distance from current price to the analyst mean target.
    pub upside_pct: Option<f64>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub result: CompositeResult,
    pub factor_grades: Vec<MetricGrade>,
    pub commentary: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_score(100.0), Grade::APlus);
        assert_eq!(Grade::from_score(90.0), Grade::APlus);
        assert_eq!(Grade::from_score(89.9), Grade::A);
        assert_eq!(Grade::from_score(70.0), Grade::B);
        assert_eq!(Grade::from_score(60.0), Grade::C);
        assert_eq!(Grade::from_score(59.0), Grade::D);
        assert_eq!(Grade::from_score(40.0), Grade::D);
        assert_eq!(Grade::from_score(39.99), Grade::F);
        assert_eq!(Grade::from_score(-5.0), Grade::F);
    }

    #[test]
    fn test_recommendation_tiers() {
        assert_eq!(Recommendation::from_score(80), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(79), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(60), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(59), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(41), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(40), Recommendation::Sell);
        assert_eq!(Recommendation::from_score(0), Recommendation::Sell);
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), "\"A+\"");
        assert_eq!(serde_json::to_string(&Grade::C).unwrap(), "\"C\"");
        let parsed: Grade = serde_json::from_str("\"A+\"").unwrap();
        assert_eq!(parsed, Grade::APlus);
    }

    #[test]
    fn test_factor_score_default_flag() {
        let defaulted = FactorScore::new(FactorKind::Safety, 50.0, "N/A", None);
        assert!(defaulted.is_default());
        assert_eq!(defaulted.grade, Grade::D);

        let scored = FactorScore::new(FactorKind::Safety, 100.0, "D/E: 50.0%", Some(50.0));
        assert!(!scored.is_default());
        assert_eq!(scored.grade, Grade::APlus);
    }
}
