pub mod source_service;
pub mod volatility_service;
pub mod forecast_service;
pub mod chart_service;
pub mod preview_service;
pub mod pipeline_service;
pub mod presentation_service;
