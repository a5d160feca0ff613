//! Volatility estimator: fractional returns and their rolling standard deviation

use crate::models::{PriceSeries, VolatilityRow, VolatilitySeries};

/// Trailing window length, in rows, for the rolling volatility
pub const VOLATILITY_WINDOW: usize = 20;

/// Derive `return` and `volatility` columns from a price series
pub fn calculate_volatility(series: &PriceSeries) -> VolatilitySeries {
    calculate_volatility_with_window(series, VOLATILITY_WINDOW)
}

pub fn calculate_volatility_with_window(series: &PriceSeries, window: usize) -> VolatilitySeries {
    let prices = series.prices();
    let returns = pct_change(&prices);
    let volatility = rolling_std(&returns, window);

    let rows = series
        .points()
        .iter()
        .zip(returns)
        .zip(volatility)
        .map(|((point, ret), volatility)| VolatilityRow {
            date: point.date,
            price: point.price,
            ret,
            volatility,
        })
        .collect();

    VolatilitySeries::new(rows, window)
}

/// Fractional change from the previous observation.
///
/// The first element is undefined, as is any change from a zero price.
pub fn pct_change(prices: &[f64]) -> Vec<Option<f64>> {
    let mut returns = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return returns;
    }

    returns.push(None);
    for w in prices.windows(2) {
        let ret = if w[0] == 0.0 { None } else { Some(w[1] / w[0] - 1.0) };
        returns.push(ret.filter(|r| r.is_finite()));
    }

    returns
}

/// Sample standard deviation over a trailing window of `window` rows.
///
/// Row `i` is defined once the window is full (`i >= window - 1`) and holds
/// at least `window - 1` defined values, so a leading undefined return does
/// not push the warm-up past `window - 1` rows.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }

    let min_periods = window - 1;

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }

            let defined: Vec<f64> = values[i + 1 - window..=i].iter().flatten().copied().collect();
            if defined.len() < min_periods {
                return None;
            }

            let n = defined.len() as f64;
            let mean = defined.iter().sum::<f64>() / n;
            let variance = defined.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(variance.sqrt())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::{Duration, TimeZone, Utc};

    fn series_from(prices: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PriceSeries::from_points(
            prices
                .iter()
                .enumerate()
                .map(|(i, &price)| PricePoint {
                    date: start + Duration::days(i as i64),
                    price,
                })
                .collect(),
        )
    }

    fn wavy(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + 10.0 * (i as f64 * 0.7).sin() + i as f64 * 0.3).collect()
    }

    #[test]
    fn test_warm_up_leaves_first_nineteen_undefined() {
        for len in [21, 25, 60] {
            let result = calculate_volatility(&series_from(&wavy(len)));
            let rows = result.rows();

            assert_eq!(rows.len(), len);
            assert!(rows[..19].iter().all(|r| r.volatility.is_none()));
            assert_eq!(rows.iter().filter(|r| r.volatility.is_some()).count(), len - 19);
        }
    }

    #[test]
    fn test_constant_prices_have_zero_return_and_volatility() {
        let result = calculate_volatility(&series_from(&[50.0; 30]));

        assert_eq!(result.rows()[0].ret, None);
        assert!(result.rows()[1..].iter().all(|r| r.ret == Some(0.0)));
        assert!(result
            .rows()
            .iter()
            .filter_map(|r| r.volatility)
            .all(|v| v == 0.0));
        assert!(result.has_volatility());
    }

    #[test]
    fn test_returns_are_fractional_changes() {
        let returns = pct_change(&[100.0, 110.0, 99.0, 0.0, 5.0]);
        assert_eq!(returns[0], None);
        assert!((returns[1].unwrap() - 0.10).abs() < 1e-12);
        assert!((returns[2].unwrap() + 0.10).abs() < 1e-12);
        assert_eq!(returns[3], Some(-1.0));
        assert_eq!(returns[4], None);
    }

    #[test]
    fn test_full_window_matches_sample_std() {
        let prices = wavy(40);
        let result = calculate_volatility(&series_from(&prices));
        let returns = pct_change(&prices);

        // Row 30 covers returns 11..=30, all defined
        let window: Vec<f64> = returns[11..=30].iter().map(|r| r.unwrap()).collect();
        let mean = window.iter().sum::<f64>() / 20.0;
        let expected = (window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 19.0).sqrt();

        assert!((result.rows()[30].volatility.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_propagates() {
        let result = calculate_volatility(&PriceSeries::default());
        assert!(result.is_empty());
        assert!(!result.has_volatility());
    }

    #[test]
    fn test_dropping_derived_columns_round_trips() {
        let original = series_from(&wavy(45));
        let restored = calculate_volatility(&original).to_price_series();
        assert_eq!(restored, original);
    }
}
