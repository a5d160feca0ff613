pub mod error;
pub mod yahoo;
pub mod coingecko;

pub use error::ApiError;
pub use yahoo::YahooClient;
pub use coingecko::CoinGeckoClient;
