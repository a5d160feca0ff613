//! Presentation step: preview table and chart files for a pipeline report

use std::path::PathBuf;

use tracing::warn;

use crate::services::chart_service::{self, ChartSettings, FORECAST_CHART_FILE, PRICE_CHART_FILE};
use crate::services::pipeline_service::PipelineReport;
use crate::services::preview_service;
use crate::utils::RenderError;

/// What the forecast section of the dashboard shows
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastView {
    Chart {
        path: PathBuf,
        steps: usize,
        /// Set when the heading's horizon differs from the computed one
        label_note: Option<String>,
    },
    Failed(String),
}

/// Rendered output of one fetch action
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub preview: String,
    pub price_chart: PathBuf,
    pub forecast: ForecastView,
}

/// Render a report. Preview and price chart failures are fatal; a forecast
/// failure only replaces the forecast chart with its message.
///
/// Charts from an earlier fetch are removed first, so a skipped stage never
/// leaves a previous result on display.
pub fn present(
    report: &PipelineReport,
    charts: &ChartSettings,
    preview_rows: usize,
) -> Result<Dashboard, RenderError> {
    chart_service::clear_charts(charts)?;

    let preview = preview_service::render_preview(&report.volatility, preview_rows)?;

    let price_path = charts.chart_path(PRICE_CHART_FILE);
    let price_chart = chart_service::render_price_volatility(
        &report.volatility,
        report.params.log_scale,
        &price_path,
        charts,
    )?;

    let forecast = match &report.forecast {
        Ok(result) => {
            let path = charts.chart_path(FORECAST_CHART_FILE);
            match chart_service::render_forecast(result, &path, charts) {
                Ok(path) => ForecastView::Chart {
                    path,
                    steps: result.steps(),
                    label_note: chart_service::horizon_label_mismatch(result.steps()),
                },
                Err(e) => {
                    warn!("Forecast chart failed: {}", e);
                    if let Err(cleanup) = chart_service::remove_chart(&path) {
                        warn!("Failed to remove partial forecast chart: {}", cleanup);
                    }
                    ForecastView::Failed(e.to_string())
                }
            }
        }
        Err(e) => ForecastView::Failed(e.to_string()),
    };

    Ok(Dashboard {
        preview,
        price_chart,
        forecast,
    })
}
