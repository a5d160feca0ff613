use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info, warn};

use crate::models::{ForecastResult, VolatilitySeries};
use crate::utils::{ChartFormat, RenderError};

pub const PRICE_CHART_TITLE: &str = "Price & Volatility Analysis";
/// Heading kept verbatim for the forecast chart, whatever the horizon
pub const FORECAST_CHART_TITLE: &str = "ARIMA Forecast for Next 30 Days";
const LABELED_HORIZON: usize = 30;

/// Where and how charts are written
#[derive(Debug, Clone)]
pub struct ChartSettings {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: ChartFormat,
}

pub const PRICE_CHART_FILE: &str = "price_volatility";
pub const FORECAST_CHART_FILE: &str = "forecast";

impl ChartSettings {
    /// Output path for a chart of `kind`; every fetch reuses the same file
    pub fn chart_path(&self, kind: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", kind, self.format.extension()))
    }
}

/// Remove a previously written chart; a missing file is not an error
pub fn remove_chart(path: &Path) -> Result<(), RenderError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale chart {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RenderError::Io(e)),
    }
}

/// Remove both dashboard charts so nothing from an earlier fetch stays on display
pub fn clear_charts(settings: &ChartSettings) -> Result<(), RenderError> {
    remove_chart(&settings.chart_path(PRICE_CHART_FILE))?;
    remove_chart(&settings.chart_path(FORECAST_CHART_FILE))
}

/// Padded value range for an axis, never degenerate
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let range = (max - min).max(max.abs() * 1e-6).max(1e-8);
    let padding = range * 0.1;
    Some((min - padding, max + padding))
}

/// Price axis bounds; log scale needs a strictly positive lower bound
pub fn price_axis_range(series: &VolatilitySeries, log_scale: bool) -> Option<(f64, f64)> {
    if log_scale {
        let (min, max) = series
            .rows()
            .iter()
            .map(|r| r.price)
            .filter(|p| *p > 0.0)
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some((min * 0.9, max * 1.1))
    } else {
        let (lo, hi) = padded_range(series.rows().iter().map(|r| r.price))?;
        Some((lo.max(0.0), hi))
    }
}

/// Date axis bounds; a single observation is widened to one day on each side
pub fn date_axis_range(series: &VolatilitySeries) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = series.rows().first()?.date;
    let last = series.rows().last()?.date;
    if first == last {
        Some((first - Duration::days(1), last + Duration::days(1)))
    } else {
        Some((first, last))
    }
}

/// Log (and return) a note when the forecast heading disagrees with the horizon
pub fn horizon_label_mismatch(steps: usize) -> Option<String> {
    if steps == LABELED_HORIZON {
        return None;
    }
    let note = format!(
        "Forecast is labeled as {} days but projects {} steps without calendar dates",
        LABELED_HORIZON, steps
    );
    warn!("{}", note);
    Some(note)
}

/// Render price (primary axis) and volatility (secondary axis) over the date domain
pub fn render_price_volatility(
    series: &VolatilitySeries,
    log_scale: bool,
    path: &Path,
    settings: &ChartSettings,
) -> Result<PathBuf, RenderError> {
    if series.is_empty() {
        return Err(RenderError::NoData);
    }
    prepare_parent(path)?;

    debug!("Drawing price/volatility chart to {}", path.display());
    match settings.format {
        ChartFormat::Png => {
            let root = BitMapBackend::new(path, (settings.width, settings.height)).into_drawing_area();
            draw_price_volatility(&root, series, log_scale)?;
        }
        ChartFormat::Svg => {
            let root = SVGBackend::new(path, (settings.width, settings.height)).into_drawing_area();
            draw_price_volatility(&root, series, log_scale)?;
        }
    }

    info!("✓ Price & volatility chart written to {}", path.display());
    Ok(path.to_path_buf())
}

/// Render forecast values as a line over forecast steps
pub fn render_forecast(
    forecast: &ForecastResult,
    path: &Path,
    settings: &ChartSettings,
) -> Result<PathBuf, RenderError> {
    if forecast.values.is_empty() {
        return Err(RenderError::NoData);
    }
    prepare_parent(path)?;

    debug!("Drawing forecast chart to {}", path.display());
    match settings.format {
        ChartFormat::Png => {
            let root = BitMapBackend::new(path, (settings.width, settings.height)).into_drawing_area();
            draw_forecast(&root, forecast)?;
        }
        ChartFormat::Svg => {
            let root = SVGBackend::new(path, (settings.width, settings.height)).into_drawing_area();
            draw_forecast(&root, forecast)?;
        }
    }

    info!("✓ Forecast chart written to {}", path.display());
    Ok(path.to_path_buf())
}

fn prepare_parent(path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn draw_price_volatility<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &VolatilitySeries,
    log_scale: bool,
) -> Result<(), RenderError> {
    root.fill(&WHITE)
        .map_err(|e| RenderError::Draw(format!("Failed to fill canvas: {}", e)))?;

    let (y_min, y_max) = price_axis_range(series, log_scale).ok_or(RenderError::NoData)?;

    if log_scale {
        draw_dual_axis(root, series, (y_min..y_max).log_scale(), "Price (Log Scale)")?;
    } else {
        draw_dual_axis(root, series, y_min..y_max, "Price")?;
    }

    root.present()
        .map_err(|e| RenderError::Draw(format!("Failed to render chart: {}", e)))
}

fn draw_dual_axis<DB, Y>(
    root: &DrawingArea<DB, Shift>,
    series: &VolatilitySeries,
    price_range: Y,
    price_desc: &str,
) -> Result<(), RenderError>
where
    DB: DrawingBackend,
    Y: AsRangedCoord<Value = f64>,
    Y::CoordDescType: ValueFormatter<f64>,
{
    let (x_min, x_max) = date_axis_range(series).ok_or(RenderError::NoData)?;
    let (v_min, v_max) = padded_range(series.rows().iter().filter_map(|r| r.volatility))
        .unwrap_or((0.0, 1.0));

    let mut chart = ChartBuilder::on(root)
        .caption(PRICE_CHART_TITLE, ("sans-serif", 32.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .right_y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, price_range)
        .map_err(|e| RenderError::Draw(format!("Failed to build chart: {}", e)))?
        .set_secondary_coord(x_min..x_max, v_min..v_max);

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(price_desc)
        .draw()
        .map_err(|e| RenderError::Draw(format!("Failed to draw mesh: {}", e)))?;

    chart
        .configure_secondary_axes()
        .y_desc("Volatility")
        .draw()
        .map_err(|e| RenderError::Draw(format!("Failed to draw secondary axis: {}", e)))?;

    chart
        .draw_series(LineSeries::new(
            series.rows().iter().map(|r| (r.date, r.price)),
            &BLUE,
        ))
        .map_err(|e| RenderError::Draw(format!("Failed to draw price line: {}", e)))?
        .label("Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    // Volatility stays off the chart until the warm-up window has filled
    if series.has_volatility() {
        chart
            .draw_secondary_series(LineSeries::new(
                series
                    .rows()
                    .iter()
                    .filter_map(|r| r.volatility.map(|v| (r.date, v))),
                &RED,
            ))
            .map_err(|e| RenderError::Draw(format!("Failed to draw volatility line: {}", e)))?
            .label("Volatility")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| RenderError::Draw(format!("Failed to draw legend: {}", e)))?;

    Ok(())
}

fn draw_forecast<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    forecast: &ForecastResult,
) -> Result<(), RenderError> {
    root.fill(&WHITE)
        .map_err(|e| RenderError::Draw(format!("Failed to fill canvas: {}", e)))?;

    let (y_min, y_max) = padded_range(forecast.values.iter().copied()).ok_or(RenderError::NoData)?;
    let x_max = forecast.steps().max(2) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(FORECAST_CHART_TITLE, ("sans-serif", 32.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(1.0..x_max, y_min..y_max)
        .map_err(|e| RenderError::Draw(format!("Failed to build chart: {}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Step")
        .y_desc(format!("Price ARIMA{}", forecast.order))
        .draw()
        .map_err(|e| RenderError::Draw(format!("Failed to draw mesh: {}", e)))?;

    chart
        .draw_series(LineSeries::new(
            forecast.indexed().map(|(step, value)| (step as f64, value)),
            &BLUE,
        ))
        .map_err(|e| RenderError::Draw(format!("Failed to draw forecast line: {}", e)))?;

    root.present()
        .map_err(|e| RenderError::Draw(format!("Failed to render chart: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArimaOrder, PricePoint, PriceSeries};
    use crate::services::volatility_service::calculate_volatility;
    use chrono::TimeZone;

    fn settings(dir: &Path) -> ChartSettings {
        ChartSettings {
            output_dir: dir.to_path_buf(),
            width: 640,
            height: 480,
            format: ChartFormat::Png,
        }
    }

    fn volatility_of(prices: &[f64]) -> VolatilitySeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        calculate_volatility(&PriceSeries::from_points(
            prices
                .iter()
                .enumerate()
                .map(|(i, &price)| PricePoint {
                    date: start + Duration::days(i as i64),
                    price,
                })
                .collect(),
        ))
    }

    #[test]
    fn test_empty_series_is_not_drawn() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = settings(dir.path());
        let path = settings.chart_path(PRICE_CHART_FILE);

        let empty = calculate_volatility(&PriceSeries::default());
        let err = render_price_volatility(&empty, false, &path, &settings).unwrap_err();

        assert!(matches!(err, RenderError::NoData));
        assert_eq!(err.to_string(), "No data available for plotting.");
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_forecast_is_not_drawn() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = settings(dir.path());
        let path = settings.chart_path(FORECAST_CHART_FILE);
        let forecast = ForecastResult {
            order: ArimaOrder::default(),
            values: Vec::new(),
        };

        assert!(matches!(
            render_forecast(&forecast, &path, &settings),
            Err(RenderError::NoData)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_chart_paths_are_fixed() {
        let settings = ChartSettings {
            output_dir: PathBuf::from("charts"),
            width: 1,
            height: 1,
            format: ChartFormat::Svg,
        };
        assert_eq!(
            settings.chart_path(FORECAST_CHART_FILE),
            PathBuf::from("charts/forecast.svg")
        );
        assert_eq!(
            settings.chart_path(PRICE_CHART_FILE),
            PathBuf::from("charts/price_volatility.svg")
        );
    }

    #[test]
    fn test_clear_charts_removes_existing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = settings(dir.path());
        std::fs::write(settings.chart_path(FORECAST_CHART_FILE), b"old").unwrap();

        clear_charts(&settings).unwrap();
        assert!(!settings.chart_path(FORECAST_CHART_FILE).exists());

        // Nothing left to remove
        clear_charts(&settings).unwrap();
    }

    #[test]
    fn test_axis_ranges() {
        let series = volatility_of(&[10.0, 20.0, 15.0]);

        let (lo, hi) = price_axis_range(&series, false).unwrap();
        assert!((lo - 9.0).abs() < 1e-9 && (hi - 21.0).abs() < 1e-9);

        let (lo, hi) = price_axis_range(&series, true).unwrap();
        assert!(lo > 0.0 && lo < 10.0 && hi > 20.0);

        let flat = padded_range([5.0, 5.0]).unwrap();
        assert!(flat.0 < 5.0 && flat.1 > 5.0);
        assert_eq!(padded_range(Vec::<f64>::new()), None);

        let single = volatility_of(&[1.0]);
        let (start, end) = date_axis_range(&single).unwrap();
        assert_eq!(end - start, Duration::days(2));
    }

    #[test]
    fn test_horizon_label_mismatch_is_flagged() {
        assert!(horizon_label_mismatch(30).is_none());
        let note = horizon_label_mismatch(50).expect("50 steps under a 30 day label");
        assert!(note.contains("30 days") && note.contains("50 steps"));
    }
}
