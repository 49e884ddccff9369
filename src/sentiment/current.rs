use crate::model::{ProviderError, SentimentSample, Ticker};
use crate::provider::MarketData;
use crate::utils::month_bounds;

use chrono::NaiveDate;
use tracing::debug;

/// mspr of the chronologically last sample. Ties on (year, month) resolve
/// to the later entry in response order.
pub fn latest_mspr(samples: &[SentimentSample]) -> Option<f64> {
    samples
        .iter()
        .max_by_key(|s| (s.year, s.month))
        .map(|s| s.mspr)
}

/// Insider sentiment for the calendar month containing `today`.
/// `Ok(None)` means the provider has no data for the month.
pub async fn current_sentiment(
    provider: &dyn MarketData,
    ticker: &Ticker,
    today: NaiveDate,
) -> Result<Option<f64>, ProviderError> {
    let (first, last) = month_bounds(today);
    let samples = provider.insider_sentiment(ticker, first, last).await?;
    debug!("{}: {} sentiment samples for {}..{}", ticker, samples.len(), first, last);
    Ok(latest_mspr(&samples))
}
