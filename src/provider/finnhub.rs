use crate::config::ProviderSettings;
use crate::model::{ProviderError, Quote, SentimentSample, Symbol, Ticker};
use crate::provider::MarketData;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

const USER_AGENT: &str = concat!("ticker-pulse/", env!("CARGO_PKG_VERSION"));
const TOKEN_HEADER: &str = "X-Finnhub-Token";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price.
    c: Option<f64>,
    /// Timestamp of the last trade, 0 for symbols the provider does not know.
    #[serde(default)]
    t: i64,
}

#[derive(Debug, Deserialize)]
struct InsiderSentimentResponse {
    #[serde(default)]
    data: Vec<InsiderSentimentEntry>,
}

#[derive(Debug, Deserialize)]
struct InsiderSentimentEntry {
    year: i32,
    month: u32,
    mspr: f64,
}

pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_status(status, &body)?;

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

fn check_status(status: StatusCode, body: &str) -> Result<(), ProviderError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ProviderError::Auth(status.as_u16()));
    }
    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }
    Ok(())
}

fn into_quote(ticker: &Ticker, res: QuoteResponse) -> Result<Quote, ProviderError> {
    match res.c {
        Some(price) if !(price == 0.0 && res.t == 0) => Ok(Quote {
            ticker: ticker.clone(),
            current_price: price,
        }),
        _ => Err(ProviderError::UnknownSymbol(ticker.to_string())),
    }
}

fn into_samples(ticker: &Ticker, res: InsiderSentimentResponse) -> Vec<SentimentSample> {
    res.data
        .into_iter()
        .map(|entry| SentimentSample {
            ticker: ticker.clone(),
            year: entry.year,
            month: entry.month,
            mspr: entry.mspr,
        })
        .collect()
}

#[async_trait::async_trait]
impl MarketData for FinnhubClient {
    async fn quote(&self, ticker: &Ticker) -> Result<Quote, ProviderError> {
        let res: QuoteResponse = self
            .get_json("quote", &[("symbol", ticker.to_string())])
            .await?;
        into_quote(ticker, res)
    }

    async fn insider_sentiment(
        &self,
        ticker: &Ticker,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SentimentSample>, ProviderError> {
        let res: InsiderSentimentResponse = self
            .get_json(
                "stock/insider-sentiment",
                &[
                    ("symbol", ticker.to_string()),
                    ("from", from.format(DATE_FORMAT).to_string()),
                    ("to", to.format(DATE_FORMAT).to_string()),
                ],
            )
            .await?;
        Ok(into_samples(ticker, res))
    }

    async fn list_symbols(&self, exchange: &str) -> Result<Vec<Symbol>, ProviderError> {
        self.get_json("stock/symbol", &[("exchange", exchange.to_string())])
            .await
    }
}
