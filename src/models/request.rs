//! Request parameter models

use std::fmt;

use chrono::NaiveDate;

/// External provider a fetch is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Yahoo,
    CoinGecko,
}

impl DataSource {
    /// Parse a user-supplied provider name
    pub fn parse(input: &str) -> Result<Self, String> {
        match input.to_lowercase().as_str() {
            "yahoo" | "yf" | "yahoo-finance" => Ok(DataSource::Yahoo),
            "coingecko" | "cg" | "gecko" => Ok(DataSource::CoinGecko),
            _ => Err(format!(
                "❌ Unknown data source: '{}'. Supported: yahoo, coingecko",
                input
            )),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DataSource::Yahoo => "Yahoo Finance",
            DataSource::CoinGecko => "CoinGecko",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Daily bars for a market symbol between two dates (end exclusive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDataRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// USD price points for a coin over a trailing number of days
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoRequest {
    pub coin_id: String,
    pub days: u32,
}

/// What to fetch, tagged by provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRequest {
    Market(MarketDataRequest),
    Crypto(CryptoRequest),
}

impl DataRequest {
    pub fn source(&self) -> DataSource {
        match self {
            DataRequest::Market(_) => DataSource::Yahoo,
            DataRequest::Crypto(_) => DataSource::CoinGecko,
        }
    }

    /// Symbol or coin identifier of the instrument
    pub fn instrument(&self) -> &str {
        match self {
            DataRequest::Market(r) => &r.symbol,
            DataRequest::Crypto(r) => &r.coin_id,
        }
    }
}

/// Everything a single fetch action needs, built fresh per action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    pub request: DataRequest,
    pub log_scale: bool,
}
