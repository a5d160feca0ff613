//! Data models for the dashboard pipeline
//!
//! Each model is produced by one pipeline stage and consumed by the next.

pub mod series;
pub mod volatility;
pub mod forecast;
pub mod request;

// Re-export commonly used types for convenience
pub use series::{PricePoint, PriceSeries};
pub use volatility::{VolatilityRow, VolatilitySeries};
pub use forecast::{ArimaOrder, ForecastResult};
pub use request::{CryptoRequest, DataRequest, DataSource, MarketDataRequest, RequestParameters};
