//! Data source adapter: turns provider responses into a uniform price series

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{debug, info, warn};

use crate::api::coingecko::{MarketChartPoint, MarketChartResponse};
use crate::api::yahoo::ChartResponse;
use crate::api::{ApiError, CoinGeckoClient, YahooClient};
use crate::models::{CryptoRequest, DataRequest, MarketDataRequest, PricePoint, PriceSeries};
use crate::utils::{AppConfig, DataError};

const YAHOO: &str = "Yahoo Finance";
const COINGECKO: &str = "CoinGecko";

/// Anything that can serve a `DataRequest` with a price series
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    async fn fetch(&self, request: &DataRequest) -> Result<PriceSeries, DataError>;
}

/// The two live providers behind a single fetch capability
pub struct ProviderClients {
    yahoo: YahooClient,
    coingecko: CoinGeckoClient,
}

impl ProviderClients {
    pub fn new(yahoo: YahooClient, coingecko: CoinGeckoClient) -> Self {
        Self { yahoo, coingecko }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            YahooClient::with_base_url(config.yahoo_base_url.clone()),
            CoinGeckoClient::with_base_url(
                config.coingecko_api_key.clone(),
                config.coingecko_base_url.clone(),
            ),
        )
    }

    async fn fetch_market(&self, request: &MarketDataRequest) -> Result<PriceSeries, DataError> {
        info!(
            "📥 Fetching {} daily closes for {} ({} to {})",
            YAHOO, request.symbol, request.start, request.end
        );

        let response = match self
            .yahoo
            .get_daily_chart(&request.symbol, request.start, request.end)
            .await
        {
            Ok(response) => response,
            // The provider answers an unknown symbol or an inverted range with 404/400
            Err(ApiError::NotFound(msg)) | Err(ApiError::BadRequest(msg)) => {
                debug!("{} returned no data for {}: {}", YAHOO, request.symbol, msg);
                return Err(DataError::EmptyResult {
                    provider: YAHOO,
                    instrument: request.symbol.clone(),
                });
            }
            Err(e) => {
                warn!("{} request for {} failed: {}", YAHOO, request.symbol, e);
                return Err(DataError::RetrievalError {
                    provider: YAHOO,
                    reason: e.to_string(),
                });
            }
        };

        let series = normalize_market_chart(response, &request.symbol)?;
        info!("✓ {} returned {} rows for {}", YAHOO, series.len(), request.symbol);
        Ok(series)
    }

    async fn fetch_crypto(&self, request: &CryptoRequest) -> Result<PriceSeries, DataError> {
        info!(
            "📥 Fetching {} market chart for {} over {} days",
            COINGECKO, request.coin_id, request.days
        );

        let response = self
            .coingecko
            .get_market_chart(&request.coin_id, request.days)
            .await
            .map_err(|e| {
                warn!("{} request for {} failed: {}", COINGECKO, request.coin_id, e);
                DataError::RetrievalError {
                    provider: COINGECKO,
                    reason: e.to_string(),
                }
            })?;

        let series = normalize_coin_chart(response, &request.coin_id)?;
        info!("✓ {} returned {} rows for {}", COINGECKO, series.len(), request.coin_id);
        Ok(series)
    }
}

impl PriceSource for ProviderClients {
    async fn fetch(&self, request: &DataRequest) -> Result<PriceSeries, DataError> {
        match request {
            DataRequest::Market(market) => self.fetch_market(market).await,
            DataRequest::Crypto(crypto) => self.fetch_crypto(crypto).await,
        }
    }
}

/// Keep the close of each daily bar as `price`, dated by the exchange-local day
pub fn normalize_market_chart(response: ChartResponse, symbol: &str) -> Result<PriceSeries, DataError> {
    let empty = || DataError::EmptyResult {
        provider: YAHOO,
        instrument: symbol.to_string(),
    };

    if let Some(err) = &response.chart.error {
        debug!("{} chart error for {}: {} {:?}", YAHOO, symbol, err.code, err.description);
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(empty)?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();
    let gmtoffset = result.meta.gmtoffset;
    debug!(
        "{} quotes for {} in {} (gmtoffset {}s)",
        YAHOO,
        result.meta.symbol.as_deref().unwrap_or(symbol),
        result.meta.currency.as_deref().unwrap_or("unknown currency"),
        gmtoffset
    );

    let points = timestamps
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            Some(PricePoint {
                date: exchange_date(ts, gmtoffset)?,
                price: close?,
            })
        })
        .collect();

    let series = PriceSeries::from_points(points);
    if series.is_empty() {
        return Err(empty());
    }

    Ok(series)
}

/// Convert `[millis, price]` pairs; a body without `prices` is malformed
pub fn normalize_coin_chart(response: MarketChartResponse, coin_id: &str) -> Result<PriceSeries, DataError> {
    let prices = response.prices.ok_or_else(|| DataError::RetrievalError {
        provider: COINGECKO,
        reason: "response has no 'prices' field".to_string(),
    })?;

    let points = prices
        .into_iter()
        .filter_map(|MarketChartPoint(millis, price)| {
            Some(PricePoint {
                date: DateTime::<Utc>::from_timestamp_millis(millis? as i64)?,
                price: price?,
            })
        })
        .collect();

    let series = PriceSeries::from_points(points);
    if series.is_empty() {
        return Err(DataError::EmptyResult {
            provider: COINGECKO,
            instrument: coin_id.to_string(),
        });
    }

    Ok(series)
}

/// Midnight UTC of the calendar day the bar opened on, in exchange time
fn exchange_date(timestamp: i64, gmtoffset: i64) -> Option<DateTime<Utc>> {
    let local = DateTime::<Utc>::from_timestamp(timestamp + gmtoffset, 0)?;
    Some(local.date_naive().and_time(NaiveTime::default()).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn yahoo_body(timestamps: &str, closes: &str) -> ChartResponse {
        let body = format!(
            r#"{{"chart":{{"result":[{{"meta":{{"symbol":"BTC-USD","currency":"USD","gmtoffset":-18000}},
                "timestamp":{},"indicators":{{"quote":[{{"close":{}}}]}}}}],"error":null}}}}"#,
            timestamps, closes
        );
        serde_json::from_str(&body).expect("valid chart body")
    }

    #[test]
    fn test_market_chart_keeps_close_as_price() {
        // 2024-01-02 14:30 UTC and 2024-01-03 14:30 UTC (NYSE open)
        let response = yahoo_body("[1704205800,1704292200,1704378600]", "[101.5,null,103.25]");
        let series = normalize_market_chart(response, "BTC-USD").expect("series");

        assert_eq!(series.prices(), vec![101.5, 103.25]);
        assert_eq!(
            series.first().map(|p| p.date),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_market_chart_without_rows_is_empty_result() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let err = normalize_market_chart(response, "AAPL").unwrap_err();
        assert!(matches!(err, DataError::EmptyResult { provider: "Yahoo Finance", .. }));

        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            normalize_market_chart(response, "NOPE"),
            Err(DataError::EmptyResult { .. })
        ));

        let response = yahoo_body("[1704205800]", "[null]");
        assert!(matches!(
            normalize_market_chart(response, "AAPL"),
            Err(DataError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_coin_chart_converts_millis() {
        let body = r#"{"prices":[[1704067200000,42280.23],[1704153600000,null],[1704240000000,44946.5]],
            "market_caps":[],"total_volumes":[]}"#;
        let response: MarketChartResponse = serde_json::from_str(body).unwrap();
        let series = normalize_coin_chart(response, "bitcoin").expect("series");

        assert_eq!(series.prices(), vec![42280.23, 44946.5]);
        assert_eq!(
            series.last().map(|p| p.date.date_naive()),
            NaiveDate::from_ymd_opt(2024, 1, 3)
        );
    }

    #[test]
    fn test_coin_chart_without_prices_is_retrieval_error() {
        let response: MarketChartResponse =
            serde_json::from_str(r#"{"error":"coin not found"}"#).unwrap();
        let err = normalize_coin_chart(response, "notacoin").unwrap_err();
        assert!(matches!(err, DataError::RetrievalError { provider: "CoinGecko", .. }));
    }

    #[test]
    fn test_coin_chart_with_empty_prices_is_empty_result() {
        let response: MarketChartResponse = serde_json::from_str(r#"{"prices":[]}"#).unwrap();
        assert!(matches!(
            normalize_coin_chart(response, "bitcoin"),
            Err(DataError::EmptyResult { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_retrieval_error() {
        let clients = ProviderClients::new(
            YahooClient::with_base_url("http://127.0.0.1:1".to_string()),
            CoinGeckoClient::with_base_url(None, "http://127.0.0.1:1".to_string()),
        );

        let request = DataRequest::Crypto(CryptoRequest {
            coin_id: "bitcoin".to_string(),
            days: 90,
        });
        let err = clients.fetch(&request).await.unwrap_err();
        assert!(matches!(err, DataError::RetrievalError { .. }));

        let request = DataRequest::Market(MarketDataRequest {
            symbol: "BTC-USD".to_string(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        });
        let err = clients.fetch(&request).await.unwrap_err();
        assert!(matches!(err, DataError::RetrievalError { .. }));
    }
}
