//! Plain-text rendering of a [`StockReport`].

use analysis_core::{FactorScore, Grade, MetricGrade, Recommendation, StockReport};
use owo_colors::OwoColorize;
use std::io::IsTerminal;

type Rgb = (u8, u8, u8);

const GREEN: Rgb = (0x00, 0xC8, 0x53);
const LIGHT_GREEN: Rgb = (0x76, 0xFF, 0x03);
const LIME: Rgb = (0x64, 0xDD, 0x17);
const YELLOW: Rgb = (0xFF, 0xD6, 0x00);
const ORANGE: Rgb = (0xFF, 0x91, 0x00);
const RED: Rgb = (0xFF, 0x3D, 0x00);

const GAUGE_WIDTH: usize = 40;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

fn score_color(score: u32) -> Rgb {
    if score >= 80 {
        GREEN
    } else if score >= 60 {
        YELLOW
    } else {
        RED
    }
}

fn grade_color(grade: Grade) -> Rgb {
    match grade {
        Grade::APlus | Grade::A => GREEN,
        Grade::B => LIGHT_GREEN,
        Grade::C => YELLOW,
        Grade::D => ORANGE,
        Grade::F => RED,
    }
}

fn recommendation_color(rec: Recommendation) -> Rgb {
    match rec {
        Recommendation::StrongBuy => GREEN,
        Recommendation::Buy => LIME,
        Recommendation::Hold => YELLOW,
        Recommendation::Sell => RED,
    }
}

fn paint(text: &str, (r, g, b): Rgb, use_colors: bool) -> String {
    if use_colors {
        text.truecolor(r, g, b).bold().to_string()
    } else {
        text.to_string()
    }
}

/// `$2.90T`, `$512.30M`, `$48,200`; `N/A` when absent.
pub fn format_large_number(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };
    if v >= 1e12 {
        format!("${:.2}T", v / 1e12)
    } else if v >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("${:.2}M", v / 1e6)
    } else {
        format!("${}", group_thousands(v.round() as i64))
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

fn format_price(value: Option<f64>) -> String {
    match value {
        Some(p) if p.is_finite() => format!("${:.2}", p),
        _ => "N/A".to_string(),
    }
}

/// Horizontal gauge, e.g. `[██████████████████████████████████░░░░░░] 89/100`.
pub fn gauge(score: u32, use_colors: bool) -> String {
    let score = score.min(100);
    let filled = (score as usize * GAUGE_WIDTH) / 100;
    let bar = "█".repeat(filled);
    let rest = "░".repeat(GAUGE_WIDTH - filled);
    format!(
        "[{}{}] {}/100",
        paint(&bar, score_color(score), use_colors),
        rest,
        score
    )
}

/// Recommendation banner, e.g. `>> STRONG BUY: Strong buy candidate`.
pub fn banner(rec: Recommendation, use_colors: bool) -> String {
    let title = rec.to_label().to_uppercase();
    format!(
        ">> {}: {}",
        paint(&title, recommendation_color(rec), use_colors),
        rec.description()
    )
}

fn factor_card(factor: &FactorScore, use_colors: bool) -> String {
    let grade = Grade::from_score(factor.score);
    format!(
        "  {:<16} {} {:>5.1}   {}",
        factor.factor.title().to_uppercase(),
        paint(&format!("{:<3}", grade.as_str()), grade_color(grade), use_colors),
        factor.score,
        factor.detail
    )
}

fn metric_grade_row(entry: &MetricGrade, use_colors: bool) -> String {
    format!(
        "  {:<18} {:>10}   {}",
        entry.label,
        entry.display,
        paint(entry.grade.as_str(), grade_color(entry.grade), use_colors)
    )
}

/// Full terminal report.
pub fn render_report(report: &StockReport, use_colors: bool) -> String {
    let mut out = Vec::new();

    let name = report.name.as_deref().unwrap_or(&report.symbol);
    let heading = format!("{} ({})", name, report.symbol);
    out.push(if use_colors { heading.bold().to_string() } else { heading });

    let target = match (report.target_price, report.upside_pct) {
        (Some(_), Some(up)) => format!("{} ({:+.1}%)", format_price(report.target_price), up),
        _ => format_price(report.target_price),
    };
    out.push(format!(
        "Current Price: {}   Target Price: {}   Market Cap: {}   Sector: {}",
        format_price(report.current_price),
        target,
        format_large_number(report.market_cap),
        report.sector.as_deref().unwrap_or("N/A")
    ));
    out.push(String::new());

    let result = &report.result;
    out.push(format!(
        "Quant Score  {}  Grade {}",
        gauge(result.score, use_colors),
        paint(result.grade.as_str(), grade_color(result.grade), use_colors)
    ));
    out.push(banner(result.recommendation, use_colors));
    out.push(String::new());

    out.push("Factors".to_string());
    out.extend(result.factors.iter().map(|f| factor_card(f, use_colors)));

    if !report.factor_grades.is_empty() {
        out.push(String::new());
        out.push("Factor Grades".to_string());
        out.extend(report.factor_grades.iter().map(|g| metric_grade_row(g, use_colors)));
    }

    if !report.commentary.is_empty() {
        out.push(String::new());
        out.push("Commentary".to_string());
        out.extend(report.commentary.iter().map(|line| format!("  - {}", line)));
    }

    out.join("\n")
}
