use std::path::PathBuf;
use std::str::FromStr;

use super::errors::ConfigError;
use crate::api::{CoinGeckoClient, YahooClient};
use crate::services::forecast_service::DEFAULT_FORECAST_STEPS;
use crate::services::preview_service::DEFAULT_PREVIEW_ROWS;

/// Image format the chart service writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

impl FromStr for ChartFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ChartFormat::Png),
            "svg" => Ok(ChartFormat::Svg),
            other => Err(format!("expected png or svg, got {}", other)),
        }
    }
}

/// Process-level settings, read once at startup from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
    pub chart_format: ChartFormat,
    pub forecast_steps: usize,
    pub preview_rows: usize,
    pub yahoo_base_url: String,
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
            chart_width: 1024,
            chart_height: 768,
            chart_format: ChartFormat::Png,
            forecast_steps: DEFAULT_FORECAST_STEPS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            yahoo_base_url: YahooClient::DEFAULT_BASE_URL.to_string(),
            coingecko_base_url: CoinGeckoClient::DEFAULT_BASE_URL.to_string(),
            coingecko_api_key: None,
        }
    }
}

impl AppConfig {
    /// Load settings from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let chart_width = parse_or(&get, "VOLSCOPE_CHART_WIDTH", defaults.chart_width)?;
        let chart_height = parse_or(&get, "VOLSCOPE_CHART_HEIGHT", defaults.chart_height)?;
        let chart_format = parse_or(&get, "VOLSCOPE_CHART_FORMAT", defaults.chart_format)?;
        let forecast_steps = parse_or(&get, "VOLSCOPE_FORECAST_STEPS", defaults.forecast_steps)?;
        let preview_rows = parse_or(&get, "VOLSCOPE_PREVIEW_ROWS", defaults.preview_rows)?;

        if chart_width == 0 || chart_height == 0 {
            return Err(ConfigError::Invalid {
                key: "VOLSCOPE_CHART_WIDTH/VOLSCOPE_CHART_HEIGHT",
                value: format!("{}x{}", chart_width, chart_height),
                reason: "chart dimensions must be positive".to_string(),
            });
        }

        if forecast_steps == 0 {
            return Err(ConfigError::Invalid {
                key: "VOLSCOPE_FORECAST_STEPS",
                value: "0".to_string(),
                reason: "forecast horizon must be at least one step".to_string(),
            });
        }

        Ok(Self {
            output_dir: get("VOLSCOPE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            chart_width,
            chart_height,
            chart_format,
            forecast_steps,
            preview_rows,
            yahoo_base_url: get("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            coingecko_base_url: get("COINGECKO_BASE_URL").unwrap_or(defaults.coingecko_base_url),
            coingecko_api_key: get("COINGECKO_API_KEY"),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
