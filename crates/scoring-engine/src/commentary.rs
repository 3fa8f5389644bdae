use analysis_core::{CompositeResult, FactorKind, FactorScore, Recommendation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Strong,
    Neutral,
    Weak,
}

fn band(score: f64) -> Band {
    if score >= 80.0 {
        Band::Strong
    } else if score >= 50.0 {
        Band::Neutral
    } else {
        Band::Weak
    }
}

fn factor_sentence(factor: &FactorScore) -> String {
    if factor.is_default() && factor.factor != FactorKind::Momentum {
        return format!("{}: not enough data, scored as neutral.", factor.factor.title());
    }

    let text = match (factor.factor, band(factor.score)) {
        (FactorKind::Valuation, Band::Strong) => "Shares look cheap relative to benchmark multiples",
        (FactorKind::Valuation, Band::Neutral) => "Valuation is roughly in line with benchmark multiples",
        (FactorKind::Valuation, Band::Weak) => "Shares trade at a premium; a lot of growth is already priced in",
        (FactorKind::Profitability, Band::Strong) => "Margins are excellent, pointing to real pricing power",
        (FactorKind::Profitability, Band::Neutral) => "Margins are adequate but not exceptional",
        (FactorKind::Profitability, Band::Weak) => "Thin margins leave little room for error",
        (FactorKind::Growth, Band::Strong) => "Revenue is growing fast",
        (FactorKind::Growth, Band::Neutral) => "Growth is moderate",
        (FactorKind::Growth, Band::Weak) => "Top-line growth has stalled or reversed",
        (FactorKind::Momentum, _) if factor.is_default() => "Price history was unavailable, momentum scored as neutral",
        (FactorKind::Momentum, Band::Strong) => "The stock has strong upward momentum over the past year",
        (FactorKind::Momentum, Band::Neutral) => "Price action over the past year has been unremarkable",
        (FactorKind::Momentum, Band::Weak) => "The stock has been trending down over the past year",
        (FactorKind::Safety, Band::Strong) => "The balance sheet carries little leverage",
        (FactorKind::Safety, Band::Neutral) => "Leverage is manageable",
        (FactorKind::Safety, Band::Weak) => "Debt levels are high relative to equity",
        (FactorKind::MarketQuality, Band::Strong) => "Institutions hold a large share of the float",
        (FactorKind::MarketQuality, Band::Neutral) => "Institutional ownership is moderate",
        (FactorKind::MarketQuality, Band::Weak) => "Institutional ownership is light",
    };

    format!("{}: {} ({}).", factor.factor.title(), text, factor.detail)
}

fn closing_sentence(result: &CompositeResult) -> String {
    let text = match result.recommendation {
        Recommendation::StrongBuy => "Most factors line up favorably",
        Recommendation::Buy => "The overall picture is positive with some soft spots",
        Recommendation::Hold => "Strengths and weaknesses roughly offset; waiting for a clearer signal is reasonable",
        Recommendation::Sell => "Weak factors dominate the picture",
    };
    format!(
        "Overall: {}/100 (grade {}), {}. {}.",
        result.score,
        result.grade,
        result.recommendation.to_label(),
        text
    )
}

/// Canned commentary: one sentence per factor plus a closing line.
pub fn commentary(result: &CompositeResult) -> Vec<String> {
    result
        .factors
        .iter()
        .map(factor_sentence)
        .chain(std::iter::once(closing_sentence(result)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Grade;

    fn result(factors: Vec<FactorScore>, score: u32) -> CompositeResult {
        CompositeResult {
            score,
            grade: Grade::from_score(score as f64),
            recommendation: Recommendation::from_score(score),
            factors,
        }
    }

    #[test]
    fn test_one_line_per_factor_plus_closing() {
        let r = result(
            vec![
                FactorScore::new(FactorKind::Valuation, 90.0, "PEG: 0.80", Some(0.8)),
                FactorScore::new(FactorKind::Safety, 30.0, "D/E: 180.0%", Some(180.0)),
            ],
            55,
        );
        let lines = commentary(&r);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Valuation: Shares look cheap"));
        assert!(lines[0].contains("(PEG: 0.80)"));
        assert!(lines[1].contains("Debt levels are high"));
        assert!(lines[2].contains("Hold"));
        assert!(lines[2].contains("55/100"));
    }

    #[test]
    fn test_defaulted_factors() {
        let r = result(
            vec![
                FactorScore::new(FactorKind::Growth, 50.0, "N/A", None),
                FactorScore::new(FactorKind::Momentum, 50.0, "1Y Return: 0.0%", None),
            ],
            50,
        );
        let lines = commentary(&r);
        assert_eq!(lines[0], "Growth: not enough data, scored as neutral.");
        assert!(lines[1].contains("Price history was unavailable"));
    }
}
