use tracing::{error, info, warn};

use crate::models::RequestParameters;
use crate::services::chart_service::{self, ChartSettings, FORECAST_CHART_TITLE, PRICE_CHART_TITLE};
use crate::services::pipeline_service::{run_pipeline, ForecastSettings};
use crate::services::presentation_service::{present, Dashboard, ForecastView};
use crate::services::source_service::PriceSource;

/// Run one fetch action for a snapshot of the inputs
pub async fn execute<S: PriceSource>(
    source: &S,
    params: &RequestParameters,
    charts: &ChartSettings,
    forecast: &ForecastSettings,
    preview_rows: usize,
) -> Result<String, String> {
    info!(
        "Fetching {} from {}",
        params.request.instrument(),
        params.request.source()
    );

    let report = run_pipeline(source, params, forecast).await.map_err(|e| {
        error!("Data retrieval failed: {}", e);
        // A failed fetch shows no charts rather than the previous ones
        if let Err(cleanup) = chart_service::clear_charts(charts) {
            warn!("Failed to clear previous charts: {}", cleanup);
        }
        format!("❌ {}", e)
    })?;

    let dashboard = present(&report, charts, preview_rows).map_err(|e| {
        error!("Rendering failed: {}", e);
        format!("❌ {}", e)
    })?;

    Ok(format_dashboard(&dashboard))
}

pub fn format_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::from("### Data Preview\n");
    out.push_str(&dashboard.preview);
    out.push('\n');

    out.push_str(&format!("\n### {}\n", PRICE_CHART_TITLE));
    out.push_str(&format!("📈 {}\n", dashboard.price_chart.display()));

    match &dashboard.forecast {
        ForecastView::Chart {
            path,
            steps,
            label_note,
        } => {
            out.push_str(&format!("\n### {}\n", FORECAST_CHART_TITLE));
            out.push_str(&format!("🔮 {} ({} steps)\n", path.display(), steps));
            if let Some(note) = label_note {
                out.push_str(&format!("⚠️ {}\n", note));
            }
        }
        ForecastView::Failed(message) => {
            out.push_str(&format!("\n❌ ARIMA Forecasting Error: {}\n", message));
        }
    }

    out
}
