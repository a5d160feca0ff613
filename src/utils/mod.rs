pub mod table;
pub mod errors;
pub mod config;

pub use table::Table;
pub use errors::{extract_clean_error, DataError, ModelFailure, RenderError};
pub use config::{AppConfig, ChartFormat};
