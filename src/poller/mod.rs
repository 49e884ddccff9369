// Display loop: Setup once per selection, then Polling until cancelled.

pub mod scheduler;
pub mod table;

pub use scheduler::Scheduler;
pub use table::DisplayTable;

use crate::model::{DisplayRow, FetchFailure, FetchKind, Sentiment, Ticker};
use crate::provider::MarketData;
use crate::sentiment::{SentimentHistory, current_sentiment, sentiment_history};

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Setup finished: history for the chart and the initial table.
    Ready {
        session: u64,
        history: Vec<(Ticker, SentimentHistory)>,
        rows: Vec<DisplayRow>,
        failures: Vec<FetchFailure>,
    },
    /// One polling cycle finished.
    Table {
        session: u64,
        cycle: u64,
        rows: Vec<DisplayRow>,
        failures: Vec<FetchFailure>,
    },
}

impl DashboardEvent {
    pub fn session(&self) -> u64 {
        match self {
            DashboardEvent::Ready { session, .. } | DashboardEvent::Table { session, .. } => {
                *session
            }
        }
    }
}

pub struct SetupResult {
    pub table: DisplayTable,
    pub history: Vec<(Ticker, SentimentHistory)>,
    pub failures: Vec<FetchFailure>,
}

#[derive(Clone)]
pub struct Poller {
    provider: Arc<dyn MarketData>,
    interval: Duration,
}

impl Poller {
    pub fn new(provider: Arc<dyn MarketData>, interval: Duration) -> Self {
        Self { provider, interval }
    }

    /// Fetches history and current sentiment for every ticker. A failure on
    /// one ticker is recorded and the rest are still processed.
    pub async fn setup(&self, tickers: &[Ticker], today: NaiveDate) -> SetupResult {
        let mut table = DisplayTable::new(tickers);
        let mut history = Vec::new();
        let mut failures = Vec::new();

        for ticker in tickers {
            info!("Setting up {}", ticker);

            match sentiment_history(self.provider.as_ref(), ticker, today).await {
                Ok(months) => history.push((ticker.clone(), months)),
                Err(e) => {
                    warn!("History fetch failed for {}: {}", ticker, e);
                    failures.push(failure(ticker, FetchKind::History, e));
                }
            }

            let sentiment = match current_sentiment(self.provider.as_ref(), ticker, today).await {
                Ok(Some(mspr)) => Sentiment::Available(mspr),
                Ok(None) => Sentiment::Unavailable,
                Err(e) => {
                    warn!("Sentiment fetch failed for {}: {}", ticker, e);
                    let message = e.to_string();
                    failures.push(failure(ticker, FetchKind::Sentiment, e));
                    Sentiment::Failed(message)
                }
            };
            table.set_sentiment(ticker, sentiment);
        }

        SetupResult {
            table,
            history,
            failures,
        }
    }

    /// One pass over the table: fetch each quote in turn and update its
    /// price cell. Failed tickers keep their previous price.
    pub async fn poll_cycle(&self, table: &mut DisplayTable) -> Vec<FetchFailure> {
        let tickers: Vec<Ticker> = table.tickers().cloned().collect();
        let mut failures = Vec::new();

        for ticker in &tickers {
            match self.provider.quote(ticker).await {
                Ok(quote) => {
                    debug!("{} = {:.2}", ticker, quote.current_price);
                    table.set_price(&quote.ticker, quote.current_price);
                }
                Err(e) => {
                    warn!("Quote fetch failed for {}: {}", ticker, e);
                    failures.push(failure(ticker, FetchKind::Quote, e));
                }
            }
        }

        failures
    }

    /// Runs one session until `cancel` is notified or the receiver is gone.
    pub async fn run(
        &self,
        session: u64,
        tickers: Vec<Ticker>,
        today: NaiveDate,
        events: mpsc::Sender<DashboardEvent>,
        cancel: Arc<Notify>,
        refresh: Arc<Notify>,
    ) {
        let work = async {
            info!("Session {}: setup for {} tickers", session, tickers.len());
            let SetupResult {
                mut table,
                history,
                failures,
            } = self.setup(&tickers, today).await;

            let ready = DashboardEvent::Ready {
                session,
                history,
                rows: table.rows().to_vec(),
                failures,
            };
            if events.send(ready).await.is_err() {
                return;
            }

            let mut cycle = 0;
            loop {
                cycle += 1;
                let failures = self.poll_cycle(&mut table).await;
                let update = DashboardEvent::Table {
                    session,
                    cycle,
                    rows: table.rows().to_vec(),
                    failures,
                };
                if events.send(update).await.is_err() {
                    return;
                }

                debug!("Waiting for timer ({:?}) or manual refresh...", self.interval);
                // A refresh requested during setup or a cycle is stored and
                // skips this wait once.
                tokio::select! {
                    _ = sleep(self.interval) => {}
                    _ = refresh.notified() => {
                        info!("Manual refresh triggered.");
                    }
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancel.notified() => {
                info!("Session {} cancelled", session);
            }
            _ = work => {
                info!("Session {} stopped: display closed", session);
            }
        }
    }
}

fn failure(ticker: &Ticker, kind: FetchKind, error: impl ToString) -> FetchFailure {
    FetchFailure {
        ticker: ticker.clone(),
        kind,
        message: error.to_string(),
    }
}
