use serde::Deserialize;

/// Body of the market chart endpoint.
///
/// Only `prices` is used; a body without it is treated as malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChartResponse {
    #[serde(default)]
    pub prices: Option<Vec<MarketChartPoint>>,
}

/// `[epoch_millis, price]` pair; either side may be null
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MarketChartPoint(pub Option<f64>, pub Option<f64>);
