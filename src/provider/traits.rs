use crate::model::{ProviderError, Quote, SentimentSample, Symbol, Ticker};
use chrono::NaiveDate;

#[async_trait::async_trait]
pub trait MarketData: Send + Sync {
    async fn quote(&self, ticker: &Ticker) -> Result<Quote, ProviderError>;

    async fn insider_sentiment(
        &self,
        ticker: &Ticker,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SentimentSample>, ProviderError>;

    async fn list_symbols(&self, exchange: &str) -> Result<Vec<Symbol>, ProviderError>;
}
