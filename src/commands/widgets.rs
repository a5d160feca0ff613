//! Session inputs: the values a fetch is built from

use chrono::NaiveDate;

use crate::models::{CryptoRequest, DataRequest, DataSource, MarketDataRequest, RequestParameters};
use crate::utils::Table;

pub const MIN_DAYS: u32 = 30;
pub const MAX_DAYS: u32 = 365;
pub const DEFAULT_DAYS: u32 = 90;
pub const DEFAULT_SYMBOL: &str = "BTC-USD";
pub const DEFAULT_COIN_ID: &str = "bitcoin";

/// Current input values of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetState {
    pub source: DataSource,
    pub symbol: String,
    pub coin_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
    pub log_scale: bool,
}

impl WidgetState {
    /// Defaults; both date pickers start on `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            source: DataSource::Yahoo,
            symbol: DEFAULT_SYMBOL.to_string(),
            coin_id: DEFAULT_COIN_ID.to_string(),
            start: today,
            end: today,
            days: DEFAULT_DAYS,
            log_scale: false,
        }
    }

    /// Snapshot the inputs relevant to the selected source
    pub fn to_params(&self) -> RequestParameters {
        let request = match self.source {
            DataSource::Yahoo => DataRequest::Market(MarketDataRequest {
                symbol: self.symbol.clone(),
                start: self.start,
                end: self.end,
            }),
            DataSource::CoinGecko => DataRequest::Crypto(CryptoRequest {
                coin_id: self.coin_id.clone(),
                days: self.days,
            }),
        };

        RequestParameters {
            request,
            log_scale: self.log_scale,
        }
    }
}

pub fn set_source(state: &mut WidgetState, args: &[&str]) -> Result<String, String> {
    let name = args.first().ok_or("❌ Usage: `source <yahoo|coingecko>`")?;
    state.source = DataSource::parse(name)?;
    Ok(format!("✓ Data source: {}", state.source))
}

/// Set the identifier field of the active source
pub fn set_symbol(state: &mut WidgetState, args: &[&str]) -> Result<String, String> {
    let value = args.join(" ");
    let value = value.trim();
    if value.is_empty() {
        return Err("❌ Usage: `symbol <text>`".to_string());
    }

    match state.source {
        DataSource::Yahoo => {
            state.symbol = value.to_string();
            Ok(format!("✓ Yahoo Finance symbol: {}", state.symbol))
        }
        DataSource::CoinGecko => {
            state.coin_id = value.to_lowercase();
            Ok(format!("✓ CoinGecko id: {}", state.coin_id))
        }
    }
}

pub fn set_start(state: &mut WidgetState, args: &[&str]) -> Result<String, String> {
    let raw = args.first().ok_or("❌ Usage: `start <YYYY-MM-DD>`")?;
    state.start = parse_date(raw)?;
    Ok(format!("✓ Start date: {}", state.start))
}

pub fn set_end(state: &mut WidgetState, args: &[&str]) -> Result<String, String> {
    let raw = args.first().ok_or("❌ Usage: `end <YYYY-MM-DD>`")?;
    state.end = parse_date(raw)?;
    Ok(format!("✓ End date: {}", state.end))
}

pub fn set_days(state: &mut WidgetState, args: &[&str]) -> Result<String, String> {
    let raw = args.first().ok_or("❌ Usage: `days <30-365>`")?;
    state.days = parse_days(raw)?;
    Ok(format!("✓ Number of days: {}", state.days))
}

/// `log on|off`, or flip the flag with no argument
pub fn set_log_scale(state: &mut WidgetState, args: &[&str]) -> Result<String, String> {
    state.log_scale = match args.first().map(|a| a.to_lowercase()).as_deref() {
        None => !state.log_scale,
        Some("on" | "true" | "yes" | "1") => true,
        Some("off" | "false" | "no" | "0") => false,
        Some(other) => return Err(format!("❌ Unknown value '{}'. Use: `log on` or `log off`", other)),
    };
    Ok(format!(
        "✓ Log scale for price: {}",
        if state.log_scale { "on" } else { "off" }
    ))
}

pub fn show(state: &WidgetState) -> String {
    let mut table = Table::new(vec!["input", "value"]);
    table.add_row(vec!["source".to_string(), state.source.to_string()]);
    match state.source {
        DataSource::Yahoo => {
            table.add_row(vec!["symbol".to_string(), state.symbol.clone()]);
            table.add_row(vec!["start".to_string(), state.start.to_string()]);
            table.add_row(vec!["end".to_string(), state.end.to_string()]);
        }
        DataSource::CoinGecko => {
            table.add_row(vec!["coin id".to_string(), state.coin_id.clone()]);
            table.add_row(vec!["days".to_string(), state.days.to_string()]);
        }
    }
    table.add_row(vec![
        "log scale".to_string(),
        if state.log_scale { "on" } else { "off" }.to_string(),
    ]);
    table.render()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("❌ Invalid date '{}'. Use the format YYYY-MM-DD", raw))
}

pub fn parse_days(raw: &str) -> Result<u32, String> {
    let days: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("❌ Invalid number of days: '{}'", raw))?;

    if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
        return Err(format!(
            "❌ Number of days must be between {} and {}",
            MIN_DAYS, MAX_DAYS
        ));
    }

    Ok(days)
}
