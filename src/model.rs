// Core structs: Ticker, Quote, SentimentSample, Sentiment, DisplayRow
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Exchange symbol, always trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Option<Self> {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            None
        } else {
            Some(Self(symbol))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub ticker: Ticker,
    pub current_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSample {
    pub ticker: Ticker,
    pub year: i32,
    pub month: u32,
    pub mspr: f64,
}

/// Entry of the provider's symbol list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Symbol {
    pub symbol: String,
    #[serde(default)]
    pub description: String,
}

/// Insider sentiment for the current month.
#[derive(Debug, Clone, PartialEq)]
pub enum Sentiment {
    Available(f64),
    /// The provider has no samples for the period.
    Unavailable,
    Failed(String),
}

impl Sentiment {
    pub fn is_available(&self) -> bool {
        matches!(self, Sentiment::Available(_))
    }
}

pub const UNAVAILABLE_MARKER: &str = "N/A";
pub const FAILED_MARKER: &str = "ERR";

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub ticker: Ticker,
    /// `None` until the first successful quote.
    pub price: Option<f64>,
    pub sentiment: Sentiment,
}

impl DisplayRow {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            price: None,
            sentiment: Sentiment::Unavailable,
        }
    }

    pub fn sentiment_available(&self) -> bool {
        self.sentiment.is_available()
    }

    pub fn price_cell(&self) -> String {
        match self.price {
            Some(price) => format!("{:.2}", price),
            None => "-".to_string(),
        }
    }

    pub fn available_cell(&self) -> &'static str {
        if self.sentiment_available() { "Yes" } else { "No" }
    }

    pub fn mspr_cell(&self) -> String {
        match &self.sentiment {
            Sentiment::Available(mspr) => format!("{:.2}", mspr),
            Sentiment::Unavailable => UNAVAILABLE_MARKER.to_string(),
            Sentiment::Failed(_) => FAILED_MARKER.to_string(),
        }
    }

    /// Comma separated record: `TICKER,PRICE,Yes|No,MSPR`.
    pub fn to_record(&self) -> String {
        format!(
            "{},{},{},{}",
            self.ticker,
            self.price_cell(),
            self.available_cell(),
            self.mspr_cell()
        )
    }
}

/// What a single fetch step was doing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Quote,
    Sentiment,
    History,
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchKind::Quote => "price",
            FetchKind::Sentiment => "insider sentiment",
            FetchKind::History => "sentiment history",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub ticker: Ticker,
    pub kind: FetchKind,
    pub message: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error fetching {} for {}: {}", self.kind, self.ticker, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider rejected the API key (HTTP {0})")]
    Auth(u16),
    #[error("provider responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("unknown symbol {0}")]
    UnknownSymbol(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
