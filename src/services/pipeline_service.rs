//! One fetch action, end to end: source → volatility → forecast

use tracing::{info, warn};

use crate::models::{ArimaOrder, ForecastResult, RequestParameters, VolatilitySeries};
use crate::services::forecast_service::{forecast_arima, DEFAULT_FORECAST_STEPS};
use crate::services::source_service::PriceSource;
use crate::services::volatility_service::calculate_volatility;
use crate::utils::{DataError, ModelFailure};

/// Forecast horizon and model order for a run
#[derive(Debug, Clone, Copy)]
pub struct ForecastSettings {
    pub steps: usize,
    pub order: ArimaOrder,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            steps: DEFAULT_FORECAST_STEPS,
            order: ArimaOrder::default(),
        }
    }
}

/// Everything the presentation step needs from one run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub params: RequestParameters,
    pub volatility: VolatilitySeries,
    /// A failed forecast does not fail the run
    pub forecast: Result<ForecastResult, ModelFailure>,
}

/// Fetch, derive volatility and forecast for one request.
///
/// A data error halts the run before anything is derived. The forecast is
/// fitted on the raw price series, independently of the volatility columns.
pub async fn run_pipeline<S: PriceSource>(
    source: &S,
    params: &RequestParameters,
    settings: &ForecastSettings,
) -> Result<PipelineReport, DataError> {
    let prices = source.fetch(&params.request).await?;
    if let (Some(first), Some(last)) = (prices.first(), prices.last()) {
        info!(
            "Series for {} spans {} to {}",
            params.request.instrument(),
            first.date.format("%Y-%m-%d"),
            last.date.format("%Y-%m-%d")
        );
    }

    let volatility = calculate_volatility(&prices);
    info!(
        "📊 Derived returns and {}-row rolling volatility for {} rows",
        volatility.window(),
        volatility.len()
    );

    let forecast = forecast_arima(&prices, settings.steps, settings.order);
    if let Err(e) = &forecast {
        warn!("ARIMA Forecasting Error: {}", e);
    }

    Ok(PipelineReport {
        params: params.clone(),
        volatility,
        forecast,
    })
}
