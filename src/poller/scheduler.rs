use crate::model::Ticker;
use crate::poller::{DashboardEvent, Poller};
use crate::utils;

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

/// A running session. Dropping the handle cancels it.
pub struct PollHandle {
    session: u64,
    cancel: Arc<Notify>,
    refresh: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn spawn(
        poller: Poller,
        session: u64,
        tickers: Vec<Ticker>,
        today: NaiveDate,
        events: mpsc::Sender<DashboardEvent>,
    ) -> Self {
        let cancel = Arc::new(Notify::new());
        let refresh = Arc::new(Notify::new());
        let task = tokio::spawn({
            let cancel = cancel.clone();
            let refresh = refresh.clone();
            async move {
                poller
                    .run(session, tickers, today, events, cancel, refresh)
                    .await
            }
        });

        Self {
            session,
            cancel,
            refresh,
            task: Some(task),
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    /// Cancels and waits for the task to wind down.
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Owns the current session and restarts it when the selection changes.
pub struct Scheduler {
    poller: Poller,
    events: mpsc::Sender<DashboardEvent>,
    current: Option<PollHandle>,
    next_session: u64,
}

impl Scheduler {
    pub fn new(poller: Poller, events: mpsc::Sender<DashboardEvent>) -> Self {
        Self {
            poller,
            events,
            current: None,
            next_session: 1,
        }
    }

    /// Cancels the running session and starts a new one for `tickers`.
    /// Returns the new session id, or `None` for an empty selection.
    pub fn restart(&mut self, tickers: Vec<Ticker>) -> Option<u64> {
        self.restart_at(tickers, utils::today())
    }

    pub fn restart_at(&mut self, tickers: Vec<Ticker>, today: NaiveDate) -> Option<u64> {
        if let Some(old) = self.current.take() {
            info!("Selection changed, cancelling session {}", old.session());
        }
        if tickers.is_empty() {
            return None;
        }

        let session = self.next_session;
        self.next_session += 1;
        let symbols: Vec<&str> = tickers.iter().map(Ticker::as_str).collect();
        info!("Starting session {} for {}", session, symbols.join(", "));
        self.current = Some(PollHandle::spawn(
            self.poller.clone(),
            session,
            tickers,
            today,
            self.events.clone(),
        ));
        Some(session)
    }

    pub fn current_session(&self) -> Option<u64> {
        self.current.as_ref().map(PollHandle::session)
    }

    pub fn refresh(&self) {
        if let Some(handle) = &self.current {
            handle.refresh();
        }
    }

    pub async fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.shutdown().await;
        }
    }
}
