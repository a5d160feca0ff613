use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as HttpClient, Url};
use tracing::debug;

use super::models::MarketChartResponse;
use crate::api::error::{handle_error_response, ApiError};

/// CoinGecko API client for historical market charts
pub struct CoinGeckoClient {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl CoinGeckoClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com/api/v3";
    const VS_CURRENCY: &'static str = "usd";

    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Market chart endpoint for `coin_id`, escaped as a single path segment
    fn market_chart_url(&self, coin_id: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::RequestError(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::RequestError(format!("Base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["coins", coin_id, "market_chart"]);
        Ok(url)
    }

    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| ApiError::RequestError(format!("Invalid API key header: {}", e)))?;
            headers.insert("x-cg-demo-api-key", value);
        }

        Ok(headers)
    }

    /// GET /coins/{id}/market_chart
    ///
    /// Retrieves USD price points for `coin_id` over the trailing `days`.
    /// Granularity is chosen by the provider.
    pub async fn get_market_chart(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<MarketChartResponse, ApiError> {
        let url = self.market_chart_url(coin_id)?;
        let headers = self.create_headers()?;

        debug!("GET {} vs_currency={} days={}", url, Self::VS_CURRENCY, days);

        let response = self
            .http_client
            .get(url)
            .headers(headers)
            .query(&[("vs_currency", Self::VS_CURRENCY.to_string()), ("days", days.to_string())])
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(handle_error_response(response).await);
        }

        response
            .json::<MarketChartResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_id_is_one_path_segment() {
        let client = CoinGeckoClient::with_base_url(None, CoinGeckoClient::DEFAULT_BASE_URL.to_string());

        assert_eq!(
            client.market_chart_url("bitcoin").unwrap().as_str(),
            "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart"
        );
        assert_eq!(
            client.market_chart_url("x/../y?z").unwrap().path(),
            "/api/v3/coins/x%2F..%2Fy%3Fz/market_chart"
        );
    }

    #[test]
    fn test_api_key_header() {
        let client = CoinGeckoClient::with_base_url(Some("demo-key".to_string()), "http://localhost".to_string());
        let headers = client.create_headers().unwrap();
        assert_eq!(headers.get("x-cg-demo-api-key").unwrap(), "demo-key");

        let client = CoinGeckoClient::with_base_url(Some("bad\nkey".to_string()), "http://localhost".to_string());
        assert!(matches!(client.create_headers(), Err(ApiError::RequestError(_))));
    }
}
