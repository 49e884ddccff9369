pub mod app;
pub mod plain;
pub mod terminal;
pub mod view;

use crate::config::{AppConfig, SHORTLIST};
use crate::model::{AppError, Ticker};
use crate::poller::{Poller, Scheduler};
use crate::provider::MarketData;
use app::{Action, App};
use terminal::TerminalGuard;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Tickers offered in the selection list: the exchange's full symbol list
/// when requested, otherwise the built-in shortlist.
pub async fn load_options(provider: &dyn MarketData, config: &AppConfig) -> Vec<Ticker> {
    let shortlist = || -> Vec<Ticker> {
        SHORTLIST.iter().filter_map(|s| Ticker::parse(s)).collect()
    };
    if !config.all_symbols {
        return shortlist();
    }

    match provider.list_symbols(&config.exchange).await {
        Ok(symbols) if !symbols.is_empty() => {
            let mut tickers: Vec<Ticker> = symbols
                .iter()
                .filter_map(|s| Ticker::parse(&s.symbol))
                .collect();
            tickers.sort();
            tickers.dedup();
            info!("Loaded {} symbols for exchange {}", tickers.len(), config.exchange);
            tickers
        }
        Ok(_) => {
            warn!("Exchange {} returned no symbols, using shortlist", config.exchange);
            shortlist()
        }
        Err(e) => {
            warn!("Symbol list fetch failed, using shortlist: {}", e);
            shortlist()
        }
    }
}

/// Terminal dashboard. Every selection change restarts the poller.
pub async fn run(config: &AppConfig, provider: &dyn MarketData, poller: Poller) -> Result<(), AppError> {
    let options = load_options(provider, config).await;
    let mut app = App::new(plain::TITLE, options, config.tickers.clone());

    let (tx, mut rx) = mpsc::channel(16);
    let mut scheduler = Scheduler::new(poller, tx);
    app.begin_session(scheduler.restart(app.selected().to_vec()));

    let mut guard = TerminalGuard::enter()?;
    let mut keys = EventStream::new();

    let result = loop {
        guard.terminal.draw(|f| view::draw(f, &mut app))?;

        tokio::select! {
            key = keys.next() => match key {
                Some(Ok(Event::Key(key))) => match app.handle_key(key) {
                    Action::Quit => break Ok(()),
                    Action::SelectionChanged => {
                        let session = scheduler.restart(app.selected().to_vec());
                        app.begin_session(session);
                    }
                    Action::Refresh => scheduler.refresh(),
                    Action::None => {}
                },
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(AppError::Terminal(e)),
                None => break Ok(()),
            },
            Some(event) = rx.recv() => {
                app.apply(event);
            }
        }
    };

    scheduler.stop().await;
    drop(guard);
    result
}
