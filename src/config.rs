use crate::model::Ticker;

use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_EXCHANGE: &str = "US";
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const API_KEY_VARS: [&str; 2] = ["FINNHUB_API_KEY", "api_key"];

/// Tickers offered for selection when the full symbol list is not requested.
pub const SHORTLIST: [&str; 5] = ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key found: set FINNHUB_API_KEY (or api_key) in the environment or a .env file")]
    MissingApiKey,
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to load .env file: {0}")]
    DotEnv(#[source] dotenvy::Error),
}

/// Live stock prices and insider sentiment from Finnhub.
#[derive(Debug, Default, Parser)]
#[command(name = "ticker-pulse", version)]
pub struct Cli {
    /// Tickers to watch, comma separated (e.g. AAPL,MSFT)
    #[arg(short, long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Seconds to wait between polling cycles
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// JSON config file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Offer every symbol of the exchange instead of the built-in shortlist
    #[arg(long)]
    pub all_symbols: bool,

    /// Exchange code used for the symbol list
    #[arg(long)]
    pub exchange: Option<String>,

    /// Print the table to stdout instead of starting the terminal UI
    #[arg(long)]
    pub plain: bool,

    /// Log file used while the terminal UI owns the screen
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub tickers: Vec<String>,
    pub poll_interval_seconds: Option<u64>,
    pub exchange: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub all_symbols: bool,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tickers: Vec<Ticker>,
    pub poll_interval: Duration,
    pub exchange: String,
    pub all_symbols: bool,
    pub plain: bool,
    pub log_file: PathBuf,
    pub provider: ProviderSettings,
}

/// Reads the JSON config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// API key from the process environment, after loading `.env` if present.
pub fn api_key_from_env() -> Result<Option<String>, ConfigError> {
    check_dotenv(dotenvy::dotenv().map(|_| ()))?;
    Ok(API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty()))
}

/// A missing `.env` is fine; a malformed one stops loading at the bad line.
fn check_dotenv(result: Result<(), dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Err(e) if !e.not_found() => Err(ConfigError::DotEnv(e)),
        _ => Ok(()),
    }
}

impl AppConfig {
    /// Merges CLI flags over the config file. CLI wins.
    pub fn build(cli: Cli, file: FileConfig, api_key: Option<String>) -> Result<Self, ConfigError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let raw_tickers = if cli.tickers.is_empty() {
            file.tickers
        } else {
            cli.tickers
        };
        let tickers = parse_tickers(&raw_tickers);

        let interval_secs = cli
            .interval
            .or(file.poll_interval_seconds)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS);
        if interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll interval must be at least one second".into(),
            ));
        }

        let timeout_secs = file
            .request_timeout_seconds
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request timeout must be at least one second".into(),
            ));
        }

        if cli.plain && tickers.is_empty() {
            return Err(ConfigError::Invalid(
                "plain mode needs at least one ticker (--tickers)".into(),
            ));
        }

        Ok(Self {
            tickers,
            poll_interval: Duration::from_secs(interval_secs),
            exchange: cli
                .exchange
                .or(file.exchange)
                .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string()),
            all_symbols: cli.all_symbols || file.all_symbols,
            plain: cli.plain,
            log_file: cli
                .log_file
                .or(file.log_file)
                .unwrap_or_else(|| PathBuf::from("ticker-pulse.log")),
            provider: ProviderSettings {
                api_key,
                base_url: file
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                request_timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

/// Normalizes tickers, dropping blanks and duplicates while keeping order.
pub fn parse_tickers(raw: &[String]) -> Vec<Ticker> {
    let mut tickers: Vec<Ticker> = Vec::new();
    for ticker in raw.iter().filter_map(|s| Ticker::parse(s)) {
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}
