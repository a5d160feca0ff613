use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod models;
mod services;
mod utils;

use commands::{handle_line, Outcome, Session};
use services::source_service::ProviderClients;
use utils::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    // Logs go to stderr so they never interleave with dashboard output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("volscope=info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("📈 Starting volscope v{}", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!(
        "Charts will be written to {} as {}",
        config.output_dir.display(),
        config.chart_format.extension()
    );

    let source = ProviderClients::from_config(&config);
    let today = chrono::Local::now().date_naive();
    let mut session = Session::new(source, &config, today);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Err(e) = write_out(&mut stdout, "Crypto Price, Volatility & Forecast Analysis\nType `help` for commands.\n").await {
        error!("Failed to write to stdout: {}", e);
        return;
    }

    loop {
        if let Err(e) = write_out(&mut stdout, "> ").await {
            error!("Failed to write to stdout: {}", e);
            break;
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        match handle_line(&mut session, &line).await {
            Outcome::Reply(text) => {
                if let Err(e) = write_out(&mut stdout, &format!("{}\n", text)).await {
                    error!("Failed to write to stdout: {}", e);
                    break;
                }
            }
            Outcome::Silent => {}
            Outcome::Quit => break,
        }
    }

    info!("👋 Session closed");
}

async fn write_out(stdout: &mut tokio::io::Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}
