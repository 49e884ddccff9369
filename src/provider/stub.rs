// In-memory provider used by tests.
use crate::model::{ProviderError, Quote, SentimentSample, Symbol, Ticker};
use crate::provider::MarketData;

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Default)]
pub struct StubProvider {
    prices: HashMap<String, f64>,
    samples: HashMap<String, Vec<(i32, u32, f64)>>,
    failing_quotes: Mutex<HashSet<String>>,
    failing_sentiment: HashSet<String>,
    symbols: Vec<Symbol>,
    pub quote_calls: Mutex<Vec<(String, Instant)>>,
    pub sentiment_calls: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

pub fn ticker(symbol: &str) -> Ticker {
    Ticker::parse(symbol).unwrap()
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub fn with_sample(mut self, symbol: &str, year: i32, month: u32, mspr: f64) -> Self {
        self.samples
            .entry(symbol.to_string())
            .or_default()
            .push((year, month, mspr));
        self
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbols.push(Symbol {
            symbol: symbol.to_string(),
            description: String::new(),
        });
        self
    }

    pub fn failing_sentiment(mut self, symbol: &str) -> Self {
        self.failing_sentiment.insert(symbol.to_string());
        self
    }

    pub fn fail_quotes_for(&self, symbol: &str) {
        self.failing_quotes.lock().unwrap().insert(symbol.to_string());
    }

    pub fn heal_quotes_for(&self, symbol: &str) {
        self.failing_quotes.lock().unwrap().remove(symbol);
    }

    pub fn quote_times(&self, symbol: &str) -> Vec<Instant> {
        self.quote_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == symbol)
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait::async_trait]
impl MarketData for StubProvider {
    async fn quote(&self, ticker: &Ticker) -> Result<Quote, ProviderError> {
        let symbol = ticker.to_string();
        self.quote_calls
            .lock()
            .unwrap()
            .push((symbol.clone(), Instant::now()));

        if self.failing_quotes.lock().unwrap().contains(&symbol) {
            return Err(ProviderError::Status {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        self.prices
            .get(&symbol)
            .map(|&price| Quote {
                ticker: ticker.clone(),
                current_price: price,
            })
            .ok_or(ProviderError::UnknownSymbol(symbol))
    }

    async fn insider_sentiment(
        &self,
        ticker: &Ticker,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SentimentSample>, ProviderError> {
        let symbol = ticker.to_string();
        self.sentiment_calls
            .lock()
            .unwrap()
            .push((symbol.clone(), from, to));

        if self.failing_sentiment.contains(&symbol) {
            return Err(ProviderError::Auth(403));
        }
        Ok(self
            .samples
            .get(&symbol)
            .map(|entries| {
                entries
                    .iter()
                    .map(|&(year, month, mspr)| SentimentSample {
                        ticker: ticker.clone(),
                        year,
                        month,
                        mspr,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_symbols(&self, _exchange: &str) -> Result<Vec<Symbol>, ProviderError> {
        Ok(self.symbols.clone())
    }
}
