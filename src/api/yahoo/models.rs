use serde::Deserialize;

/// Envelope of the v8 chart endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Bar open times in epoch seconds; absent when the range has no bars
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}
