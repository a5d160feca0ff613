use chrono::{NaiveDate, NaiveTime};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client as HttpClient, Url};
use tracing::debug;

use super::models::ChartResponse;
use crate::api::error::{handle_error_response, ApiError};

/// Yahoo Finance chart API client for daily price history
pub struct YahooClient {
    http_client: HttpClient,
    base_url: String,
}

impl YahooClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";
    // The chart endpoint rejects requests without a browser-like agent
    const USER_AGENT: &'static str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Chart endpoint for `symbol`; the symbol is a single escaped path segment
    fn chart_url(&self, symbol: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::RequestError(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::RequestError(format!("Base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(Self::USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// GET /v8/finance/chart/{symbol}
    ///
    /// Retrieves daily bars from `start` (inclusive) to `end` (exclusive),
    /// both taken at midnight UTC.
    pub async fn get_daily_chart(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ChartResponse, ApiError> {
        let url = self.chart_url(symbol)?;
        let period1 = start.and_time(NaiveTime::default()).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::default()).and_utc().timestamp();

        debug!("GET {} period1={} period2={}", url, period1, period2);

        let response = self
            .http_client
            .get(url)
            .headers(Self::create_headers())
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(handle_error_response(response).await);
        }

        response
            .json::<ChartResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_is_one_path_segment() {
        let client = YahooClient::with_base_url(YahooClient::DEFAULT_BASE_URL.to_string());

        assert_eq!(
            client.chart_url("BTC-USD").unwrap().as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/BTC-USD"
        );

        let url = client.chart_url("A/B?c#d").unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/A%2FB%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_trailing_slash_on_base_url() {
        let client = YahooClient::with_base_url("http://127.0.0.1:8080/".to_string());
        assert_eq!(
            client.chart_url("SPY").unwrap().as_str(),
            "http://127.0.0.1:8080/v8/finance/chart/SPY"
        );
    }

    #[test]
    fn test_invalid_base_url_is_request_error() {
        let client = YahooClient::with_base_url("not a url".to_string());
        assert!(matches!(client.chart_url("SPY"), Err(ApiError::RequestError(_))));
    }
}
