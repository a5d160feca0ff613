use crate::models::VolatilitySeries;
use crate::utils::{RenderError, Table};

/// Rows shown in the data preview
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Render the last `rows` rows of the working series as a text table
pub fn render_preview(series: &VolatilitySeries, rows: usize) -> Result<String, RenderError> {
    if series.is_empty() {
        return Err(RenderError::NoData);
    }

    let mut table = Table::new(vec!["date", "price", "return", "volatility"]);
    for row in series.tail(rows) {
        table.add_row(vec![
            row.date.format("%Y-%m-%d %H:%M").to_string(),
            format!("{:.4}", row.price),
            format_optional(row.ret),
            format_optional(row.volatility),
        ]);
    }

    Ok(table.render())
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_else(|| "NaN".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PricePoint, PriceSeries};
    use crate::services::volatility_service::calculate_volatility;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_preview_shows_last_rows() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = PriceSeries::from_points(
            (0..8)
                .map(|i| PricePoint {
                    date: start + Duration::days(i),
                    price: 100.0 + i as f64,
                })
                .collect(),
        );

        let preview = render_preview(&calculate_volatility(&series), DEFAULT_PREVIEW_ROWS).unwrap();
        let lines: Vec<&str> = preview.lines().collect();

        // Header, separator and five rows
        assert_eq!(lines.len(), 7);
        assert!(lines[2].starts_with("2024-01-04 00:00"));
        assert!(lines[6].starts_with("2024-01-08 00:00"));
        assert!(lines[6].contains("107.0000"));
        // Too few rows for the rolling window
        assert!(lines[6].ends_with("NaN"));
    }

    #[test]
    fn test_preview_of_short_series_marks_first_return_undefined() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = PriceSeries::from_points(vec![PricePoint { date: start, price: 1.5 }]);
        let preview = render_preview(&calculate_volatility(&series), 5).unwrap();
        let row = preview.lines().nth(2).unwrap();
        assert_eq!(row.matches("NaN").count(), 2);
    }

    #[test]
    fn test_empty_series_has_no_preview() {
        let empty = calculate_volatility(&PriceSeries::default());
        assert!(matches!(render_preview(&empty, 5), Err(RenderError::NoData)));
    }
}
