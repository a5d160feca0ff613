pub mod fetch;
pub mod help;
pub mod widgets;

use chrono::NaiveDate;
use tracing::{debug, error};

use crate::services::chart_service::ChartSettings;
use crate::services::pipeline_service::ForecastSettings;
use crate::services::source_service::PriceSource;
use crate::utils::{extract_clean_error, AppConfig};
use widgets::WidgetState;

/// What the shell should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    Silent,
    Quit,
}

/// One interactive session: current inputs plus the fixed run settings
pub struct Session<S> {
    pub widgets: WidgetState,
    pub source: S,
    pub charts: ChartSettings,
    pub forecast: ForecastSettings,
    pub preview_rows: usize,
}

impl<S: PriceSource> Session<S> {
    pub fn new(source: S, config: &AppConfig, today: NaiveDate) -> Self {
        Self {
            widgets: WidgetState::new(today),
            source,
            charts: ChartSettings {
                output_dir: config.output_dir.clone(),
                width: config.chart_width,
                height: config.chart_height,
                format: config.chart_format,
            },
            forecast: ForecastSettings {
                steps: config.forecast_steps,
                ..ForecastSettings::default()
            },
            preview_rows: config.preview_rows,
        }
    }
}

pub async fn handle_line<S: PriceSource>(session: &mut Session<S>, line: &str) -> Outcome {
    let mut parts = line.split_whitespace();
    let command = match parts.next() {
        Some(c) => c.to_lowercase(),
        None => return Outcome::Silent,
    };
    let args: Vec<&str> = parts.collect();

    debug!("Command: {} {:?}", command, args);

    let result = match command.as_str() {
        "source" => widgets::set_source(&mut session.widgets, &args),
        "symbol" | "coin" => widgets::set_symbol(&mut session.widgets, &args),
        "start" => widgets::set_start(&mut session.widgets, &args),
        "end" => widgets::set_end(&mut session.widgets, &args),
        "days" => widgets::set_days(&mut session.widgets, &args),
        "log" => widgets::set_log_scale(&mut session.widgets, &args),
        "show" => Ok(widgets::show(&session.widgets)),
        "fetch" => {
            let params = session.widgets.to_params();
            fetch::execute(
                &session.source,
                &params,
                &session.charts,
                &session.forecast,
                session.preview_rows,
            )
            .await
        }
        "help" => help::execute(),
        "quit" | "exit" => return Outcome::Quit,
        _ => Err(format!(
            "❌ Unknown command '{}'. Type `help` for the command list",
            command
        )),
    };

    match result {
        Ok(reply) => Outcome::Reply(reply),
        Err(e) => {
            error!("Error in {} command: {}", command, e);
            Outcome::Reply(format!("Command Error\n{}", extract_clean_error(&e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CryptoRequest, DataRequest};
    use crate::services::chart_service::{FORECAST_CHART_FILE, PRICE_CHART_FILE};
    use crate::services::pipeline_service::tests::{daily_series, StubSource};
    use crate::utils::DataError;

    fn session() -> Session<StubSource> {
        let source = StubSource::new(Err(DataError::EmptyResult {
            provider: "Yahoo Finance",
            instrument: "BTC-USD".to_string(),
        }));
        let config = AppConfig {
            output_dir: std::env::temp_dir().join("volscope-session-test"),
            ..AppConfig::default()
        };
        Session::new(source, &config, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    #[tokio::test]
    async fn test_blank_line_and_quit() {
        let mut s = session();
        assert_eq!(handle_line(&mut s, "   ").await, Outcome::Silent);
        assert_eq!(handle_line(&mut s, "EXIT").await, Outcome::Quit);
    }

    #[tokio::test]
    async fn test_widget_commands_update_state() {
        let mut s = session();
        handle_line(&mut s, "source coingecko").await;
        handle_line(&mut s, "symbol solana").await;
        handle_line(&mut s, "days 60").await;

        assert_eq!(
            s.widgets.to_params().request,
            DataRequest::Crypto(CryptoRequest {
                coin_id: "solana".to_string(),
                days: 60,
            })
        );
    }

    #[tokio::test]
    async fn test_errors_become_command_error_replies() {
        let mut s = session();

        let Outcome::Reply(text) = handle_line(&mut s, "days 10").await else {
            panic!("expected reply");
        };
        assert!(text.starts_with("Command Error\n"));
        assert!(!text.contains('❌'));

        let Outcome::Reply(text) = handle_line(&mut s, "fetch").await else {
            panic!("expected reply");
        };
        assert!(text.contains("BTC-USD"));
        assert_eq!(s.source.calls.get(), 1);
    }

    fn reply(outcome: Outcome) -> String {
        match outcome {
            Outcome::Reply(text) => text,
            other => panic!("expected reply, got {:?}", other),
        }
    }

    fn wavy_prices(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 200.0 + 15.0 * (i as f64 * 0.3).sin() + i as f64 * 0.5)
            .collect()
    }

    #[tokio::test]
    async fn test_failed_forecast_leaves_no_previous_forecast_chart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            output_dir: dir.path().to_path_buf(),
            chart_width: 640,
            chart_height: 480,
            ..AppConfig::default()
        };
        let source = StubSource::new(Ok(daily_series(&wavy_prices(120))));
        let mut s = Session::new(source, &config, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        let forecast_chart = s.charts.chart_path(FORECAST_CHART_FILE);
        let price_chart = s.charts.chart_path(PRICE_CHART_FILE);

        let text = reply(handle_line(&mut s, "fetch").await);
        assert!(text.contains("### ARIMA Forecast for Next 30 Days"), "{}", text);
        assert!(forecast_chart.exists());

        s.source = StubSource::new(Ok(daily_series(&wavy_prices(10))));
        let text = reply(handle_line(&mut s, "fetch").await);
        assert!(text.contains("❌ ARIMA Forecasting Error"), "{}", text);
        assert!(price_chart.exists());
        assert!(!forecast_chart.exists());

        // Another instrument replaces the files instead of adding to them
        s.source = StubSource::new(Ok(daily_series(&wavy_prices(120))));
        handle_line(&mut s, "source coingecko").await;
        handle_line(&mut s, "symbol ethereum").await;
        reply(handle_line(&mut s, "fetch").await);

        let mut files: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(files, vec!["forecast.png", "price_volatility.png"]);
    }
}
