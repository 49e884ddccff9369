use crate::model::{ProviderError, SentimentSample, Ticker};
use crate::provider::MarketData;
use crate::utils::{round2, trailing_year};

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Rounded mspr values per month, oldest month first.
pub type SentimentHistory = BTreeMap<MonthKey, Vec<f64>>;

pub fn group_by_month(samples: &[SentimentSample]) -> SentimentHistory {
    let mut history = SentimentHistory::new();
    for sample in samples {
        let key = MonthKey {
            year: sample.year,
            month: sample.month,
        };
        history.entry(key).or_default().push(round2(sample.mspr));
    }
    history
}

/// Sentiment for the 365 days ending at `today`, grouped for charting.
pub async fn sentiment_history(
    provider: &dyn MarketData,
    ticker: &Ticker,
    today: NaiveDate,
) -> Result<SentimentHistory, ProviderError> {
    let (from, to) = trailing_year(today);
    let samples = provider.insider_sentiment(ticker, from, to).await?;
    let history = group_by_month(&samples);
    debug!("{}: {} months of sentiment history", ticker, history.len());
    Ok(history)
}
