mod config;
mod model;
mod poller;
mod provider;
mod sentiment;
mod ui;
mod utils;

use config::{AppConfig, Cli, api_key_from_env, load_config};
use model::AppError;
use poller::Poller;
use provider::FinnhubClient;

use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration problems are reported before logging exists.
    let config = match load_config(&cli.config)
        .and_then(|file| AppConfig::build(cli, file, api_key_from_env()?))
    {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ticker-pulse: {}", e);
            return ExitCode::from(2);
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("ticker-pulse: {}", e);
        return ExitCode::from(2);
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {}", e);
            eprintln!("ticker-pulse: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    info!(
        "Starting: {} tickers, polling every {:?}",
        config.tickers.len(),
        config.poll_interval
    );

    let client = Arc::new(FinnhubClient::new(&config.provider)?);
    let poller = Poller::new(client.clone(), config.poll_interval);

    if config.plain {
        ui::plain::run(&config, poller).await
    } else {
        ui::run(&config, client.as_ref(), poller).await
    }
}

/// Plain mode logs to stderr; the terminal UI owns the screen, so it logs
/// to a file instead.
fn init_logging(config: &AppConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if config.plain {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .map_err(|source| AppError::LogFile {
                path: config.log_file.clone(),
                source,
            })?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}
