use analysis_core::Bar;

/// Percent change from the first to the last close.
///
/// A single close is a 0% return. Returns `None` for an empty series, a
/// non-positive starting close, or a non-finite result.
pub fn trailing_return_pct(closes: &[f64]) -> Option<f64> {
    let (start, end) = match (closes.first(), closes.last()) {
        (Some(s), Some(e)) => (*s, *e),
        _ => return None,
    };

    if !(start.is_finite() && start > 0.0) {
        return None;
    }

    let ret = ((end - start) / start) * 100.0;
    ret.is_finite().then_some(ret)
}

/// [`trailing_return_pct`] over the closes of a bar series (oldest first).
pub fn trailing_return_from_bars(bars: &[Bar]) -> Option<f64> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    trailing_return_pct(&closes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc::now() - Duration::days(closes.len() as i64);
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: *c,
                high: *c,
                low: *c,
                close: *c,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn test_trailing_return() {
        let r = trailing_return_pct(&[100.0, 90.0, 130.0, 125.0]).unwrap();
        assert!((r - 25.0).abs() < 1e-9);

        let r = trailing_return_pct(&[200.0, 150.0]).unwrap();
        assert!((r + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_close_is_flat() {
        assert_eq!(trailing_return_pct(&[100.0]), Some(0.0));
        assert_eq!(trailing_return_from_bars(&bars(&[123.0])), Some(0.0));
        assert_eq!(trailing_return_pct(&[0.0]), None);
    }

    #[test]
    fn test_unusable_series() {
        assert_eq!(trailing_return_pct(&[]), None);
        assert_eq!(trailing_return_pct(&[0.0, 10.0]), None);
        assert_eq!(trailing_return_pct(&[-5.0, 10.0]), None);
        assert_eq!(trailing_return_pct(&[f64::NAN, 10.0]), None);
        assert_eq!(trailing_return_pct(&[10.0, f64::INFINITY]), None);
    }

    #[test]
    fn test_from_bars() {
        let r = trailing_return_from_bars(&bars(&[50.0, 55.0, 60.0])).unwrap();
        assert!((r - 20.0).abs() < 1e-9);
        assert_eq!(trailing_return_from_bars(&[]), None);
    }
}
