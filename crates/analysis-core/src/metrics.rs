use serde::{Deserialize, Serialize};

/// Every numeric field the scoring engine knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Peg,
    ForwardPe,
    PriceToSales,
    EvToEbitda,
    PriceToFcf,
    GrossMargin,
    OperatingMargin,
    NetMargin,
    ReturnOnEquity,
    RevenueGrowth,
    EarningsGrowth,
    Momentum1y,
    DebtToEquity,
    QuickRatio,
    InstitutionalOwnership,
}

/// How a metric's stored value is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Plain multiple, e.g. a P/E of 15.0.
    Ratio,
    /// Fraction of one, displayed as a percentage (0.42 -> 42%).
    Fraction,
    /// Already a percentage (debt/equity 80.0 -> 80%).
    Percent,
}

impl Metric {
    pub const ALL: [Metric; 15] = [
        Metric::Peg,
        Metric::ForwardPe,
        Metric::PriceToSales,
        Metric::EvToEbitda,
        Metric::PriceToFcf,
        Metric::GrossMargin,
        Metric::OperatingMargin,
        Metric::NetMargin,
        Metric::ReturnOnEquity,
        Metric::RevenueGrowth,
        Metric::EarningsGrowth,
        Metric::Momentum1y,
        Metric::DebtToEquity,
        Metric::QuickRatio,
        Metric::InstitutionalOwnership,
    ];

    /// Short display label used on cards.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Peg => "PEG",
            Metric::ForwardPe => "P/E",
            Metric::PriceToSales => "P/S",
            Metric::EvToEbitda => "EV/EBITDA",
            Metric::PriceToFcf => "P/FCF",
            Metric::GrossMargin => "Gross Margin",
            Metric::OperatingMargin => "Operating Margin",
            Metric::NetMargin => "Net Margin",
            Metric::ReturnOnEquity => "ROE",
            Metric::RevenueGrowth => "Revenue Growth",
            Metric::EarningsGrowth => "Earnings Growth",
            Metric::Momentum1y => "1Y Return",
            Metric::DebtToEquity => "Debt/Equity",
            Metric::QuickRatio => "Quick Ratio",
            Metric::InstitutionalOwnership => "Inst. Ownership",
        }
    }

    pub fn unit(&self) -> MetricUnit {
        match self {
            Metric::GrossMargin
            | Metric::OperatingMargin
            | Metric::NetMargin
            | Metric::ReturnOnEquity
            | Metric::RevenueGrowth
            | Metric::EarningsGrowth
            | Metric::InstitutionalOwnership => MetricUnit::Fraction,
            Metric::Momentum1y | Metric::DebtToEquity => MetricUnit::Percent,
            _ => MetricUnit::Ratio,
        }
    }

    /// Convert a stored value into the units thresholds and labels use
    /// (fractions become percentages, everything else passes through).
    pub fn to_display_units(&self, value: f64) -> f64 {
        match self.unit() {
            MetricUnit::Fraction => value * 100.0,
            MetricUnit::Ratio | MetricUnit::Percent => value,
        }
    }

    /// Format a stored value for a card, e.g. `"42.0%"` or `"1.25"`.
    pub fn format_value(&self, value: f64) -> String {
        match self.unit() {
            MetricUnit::Ratio => format!("{:.2}", value),
            MetricUnit::Fraction | MetricUnit::Percent => {
                format!("{:.1}%", self.to_display_units(value))
            }
        }
    }
}

/// Fundamentals snapshot for one instrument, as handed over by a data provider.
///
/// Field names follow the provider's camelCase keys so a quote-summary blob can be
/// deserialized directly. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsInput {
    pub short_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub current_price: Option<f64>,
    pub target_mean_price: Option<f64>,
    pub market_cap: Option<f64>,

    pub peg_ratio: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    #[serde(rename = "priceToSalesTrailing12Months")]
    pub price_to_sales: Option<f64>,
    #[serde(rename = "enterpriseToEbitda")]
    pub ev_to_ebitda: Option<f64>,
    #[serde(rename = "priceToFreeCashflow")]
    pub price_to_fcf: Option<f64>,

    pub gross_margins: Option<f64>,
    pub operating_margins: Option<f64>,
    pub profit_margins: Option<f64>,
    pub return_on_equity: Option<f64>,

    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,

    /// Trailing one-year price return in percent, filled in from price history.
    pub momentum_1y: Option<f64>,

    pub debt_to_equity: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub held_percent_institutions: Option<f64>,
}

impl MetricsInput {
    fn slot(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Peg => self.peg_ratio,
            Metric::ForwardPe => self.forward_pe,
            Metric::PriceToSales => self.price_to_sales,
            Metric::EvToEbitda => self.ev_to_ebitda,
            Metric::PriceToFcf => self.price_to_fcf,
            Metric::GrossMargin => self.gross_margins,
            Metric::OperatingMargin => self.operating_margins,
            Metric::NetMargin => self.profit_margins,
            Metric::ReturnOnEquity => self.return_on_equity,
            Metric::RevenueGrowth => self.revenue_growth,
            Metric::EarningsGrowth => self.earnings_growth,
            Metric::Momentum1y => self.momentum_1y,
            Metric::DebtToEquity => self.debt_to_equity,
            Metric::QuickRatio => self.quick_ratio,
            Metric::InstitutionalOwnership => self.held_percent_institutions,
        }
    }

    fn slot_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::Peg => &mut self.peg_ratio,
            Metric::ForwardPe => &mut self.forward_pe,
            Metric::PriceToSales => &mut self.price_to_sales,
            Metric::EvToEbitda => &mut self.ev_to_ebitda,
            Metric::PriceToFcf => &mut self.price_to_fcf,
            Metric::GrossMargin => &mut self.gross_margins,
            Metric::OperatingMargin => &mut self.operating_margins,
            Metric::NetMargin => &mut self.profit_margins,
            Metric::ReturnOnEquity => &mut self.return_on_equity,
            Metric::RevenueGrowth => &mut self.revenue_growth,
            Metric::EarningsGrowth => &mut self.earnings_growth,
            Metric::Momentum1y => &mut self.momentum_1y,
            Metric::DebtToEquity => &mut self.debt_to_equity,
            Metric::QuickRatio => &mut self.quick_ratio,
            Metric::InstitutionalOwnership => &mut self.held_percent_institutions,
        }
    }

    /// Read a metric. Non-finite values count as absent.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.slot(metric).filter(|v| v.is_finite())
    }

    /// Read a metric converted to display units (fractions become percentages).
    pub fn get_display(&self, metric: Metric) -> Option<f64> {
        self.get(metric).map(|v| metric.to_display_units(v))
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        *self.slot_mut(metric) = value;
    }

    /// Builder-style setter.
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, Some(value));
        self
    }

    /// Number of scoreable metrics present.
    pub fn present_count(&self) -> usize {
        Metric::ALL.iter().filter(|m| self.get(**m).is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_is_absent() {
        let metrics = MetricsInput::default()
            .with(Metric::Peg, f64::NAN)
            .with(Metric::ForwardPe, f64::INFINITY)
            .with(Metric::PriceToSales, 3.0);

        assert_eq!(metrics.get(Metric::Peg), None);
        assert_eq!(metrics.get(Metric::ForwardPe), None);
        assert_eq!(metrics.get(Metric::PriceToSales), Some(3.0));
        assert_eq!(metrics.present_count(), 1);
    }

    #[test]
    fn test_display_units() {
        let metrics = MetricsInput::default()
            .with(Metric::GrossMargin, 0.425)
            .with(Metric::DebtToEquity, 80.0);

        assert!((metrics.get_display(Metric::GrossMargin).unwrap() - 42.5).abs() < 1e-9);
        assert_eq!(metrics.get_display(Metric::DebtToEquity), Some(80.0));
        assert_eq!(Metric::GrossMargin.format_value(0.425), "42.5%");
        assert_eq!(Metric::Peg.format_value(0.8), "0.80");
    }

    #[test]
    fn test_deserialize_provider_keys() {
        let json = r#"{
            "shortName": "Apple Inc.",
            "currentPrice": 190.5,
            "pegRatio": 2.1,
            "forwardPE": 28.4,
            "priceToSalesTrailing12Months": 7.6,
            "grossMargins": 0.45,
            "debtToEquity": 145.0,
            "heldPercentInstitutions": 0.61
        }"#;
        let metrics: MetricsInput = serde_json::from_str(json).unwrap();

        assert_eq!(metrics.short_name.as_deref(), Some("Apple Inc."));
        assert_eq!(metrics.get(Metric::ForwardPe), Some(28.4));
        assert_eq!(metrics.get(Metric::PriceToSales), Some(7.6));
        assert_eq!(metrics.get(Metric::InstitutionalOwnership), Some(0.61));
        assert_eq!(metrics.get(Metric::RevenueGrowth), None);
    }

    #[test]
    fn test_every_metric_round_trips_through_set() {
        for (i, metric) in Metric::ALL.iter().enumerate() {
            let mut metrics = MetricsInput::default();
            metrics.set(*metric, Some(i as f64 + 0.5));
            assert_eq!(metrics.get(*metric), Some(i as f64 + 0.5));
            assert_eq!(metrics.present_count(), 1);
        }
    }
}
