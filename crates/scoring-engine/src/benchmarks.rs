//! Raw-metric grading against fixed benchmark thresholds.
//!
//! Unlike factor grades, which band an already-computed 0-100 score, these compare
//! the metric itself against four ordered thresholds. Used for the "Factor Grades"
//! card.

use analysis_core::{Grade, Metric, MetricGrade, MetricsInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricBenchmark {
    pub metric: Metric,
    /// A, B, C and D cut-offs, in display units (percentages for margins).
    pub thresholds: [f64; 4],
    pub direction: Direction,
}

use Direction::{HigherIsBetter, LowerIsBetter};

pub const BENCHMARKS: [MetricBenchmark; 15] = [
    MetricBenchmark { metric: Metric::Peg, thresholds: [0.8, 1.2, 1.8, 2.5], direction: LowerIsBetter },
    MetricBenchmark { metric: Metric::ForwardPe, thresholds: [15.0, 20.0, 25.0, 35.0], direction: LowerIsBetter },
    MetricBenchmark { metric: Metric::PriceToSales, thresholds: [2.0, 4.0, 6.0, 10.0], direction: LowerIsBetter },
    MetricBenchmark { metric: Metric::EvToEbitda, thresholds: [10.0, 14.0, 18.0, 25.0], direction: LowerIsBetter },
    MetricBenchmark { metric: Metric::PriceToFcf, thresholds: [15.0, 20.0, 30.0, 40.0], direction: LowerIsBetter },
    MetricBenchmark { metric: Metric::GrossMargin, thresholds: [50.0, 40.0, 30.0, 15.0], direction: HigherIsBetter },
    MetricBenchmark { metric: Metric::OperatingMargin, thresholds: [25.0, 15.0, 10.0, 5.0], direction: HigherIsBetter },
    MetricBenchmark { metric: Metric::NetMargin, thresholds: [20.0, 10.0, 5.0, 0.0], direction: HigherIsBetter },
    MetricBenchmark { metric: Metric::ReturnOnEquity, thresholds: [20.0, 15.0, 10.0, 5.0], direction: HigherIsBetter },
    MetricBenchmark { metric: Metric::RevenueGrowth, thresholds: [20.0, 10.0, 5.0, 0.0], direction: HigherIsBetter },
    MetricBenchmark { metric: Metric::EarningsGrowth, thresholds: [25.0, 15.0, 5.0, 0.0], direction: HigherIsBetter },
    MetricBenchmark { metric: Metric::Momentum1y, thresholds: [30.0, 15.0, 0.0, -10.0], direction: HigherIsBetter },
    MetricBenchmark { metric: Metric::DebtToEquity, thresholds: [50.0, 100.0, 150.0, 200.0], direction: LowerIsBetter },
    MetricBenchmark { metric: Metric::QuickRatio, thresholds: [1.5, 1.0, 0.8, 0.5], direction: HigherIsBetter },
    MetricBenchmark { metric: Metric::InstitutionalOwnership, thresholds: [60.0, 40.0, 20.0, 10.0], direction: HigherIsBetter },
];

impl MetricBenchmark {
    pub fn lookup(metric: Metric) -> Option<&'static MetricBenchmark> {
        BENCHMARKS.iter().find(|b| b.metric == metric)
    }

    /// Grade a value already in display units.
    pub fn grade(&self, value: f64) -> Grade {
        let passes = |threshold: f64| match self.direction {
            LowerIsBetter => value <= threshold,
            HigherIsBetter => value >= threshold,
        };

        const LADDER: [Grade; 4] = [Grade::A, Grade::B, Grade::C, Grade::D];
        self.thresholds
            .iter()
            .zip(LADDER)
            .find(|(t, _)| passes(**t))
            .map(|(_, g)| g)
            .unwrap_or(Grade::F)
    }
}

/// Grade a stored metric value (fractions are converted to percentages first).
pub fn grade_metric(metric: Metric, value: f64) -> Option<Grade> {
    if !value.is_finite() {
        return None;
    }
    MetricBenchmark::lookup(metric).map(|b| b.grade(metric.to_display_units(value)))
}

/// One graded entry per metric present, in table order.
pub fn factor_grades(metrics: &MetricsInput) -> Vec<MetricGrade> {
    BENCHMARKS
        .iter()
        .filter_map(|b| {
            metrics.get(b.metric).map(|value| MetricGrade {
                metric: b.metric,
                label: b.metric.label().to_string(),
                value,
                display: b.metric.format_value(value),
                grade: b.grade(b.metric.to_display_units(value)),
            })
        })
        .collect()
}
