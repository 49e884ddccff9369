// Headless output: the table and sentiment history as plain text on stdout.
use crate::config::AppConfig;
use crate::model::{AppError, DisplayRow, FetchFailure, Ticker};
use crate::poller::{DashboardEvent, Poller, Scheduler};
use crate::sentiment::SentimentHistory;

use chrono::Local;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tracing::info;

pub const TITLE: &str = "Real-time Stock Price Monitor";

pub fn render_table(rows: &[DisplayRow]) -> String {
    let mut out = format!(
        "{:<8} {:>12} {:>10} {:>8}\n",
        "Symbol", "Price", "Sentiment", "MSPR"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<8} {:>12} {:>10} {:>8}\n",
            row.ticker.as_str(),
            row.price_cell(),
            row.available_cell(),
            row.mspr_cell()
        ));
    }
    out
}

pub fn render_history(history: &[(Ticker, SentimentHistory)]) -> String {
    let mut out = String::new();
    for (ticker, months) in history {
        if months.is_empty() {
            out.push_str(&format!("{}: no insider sentiment in the last 12 months\n", ticker));
            continue;
        }
        let cells: Vec<String> = months
            .iter()
            .map(|(month, values)| {
                let values: Vec<String> = values.iter().map(|v| format!("{:.2}", v)).collect();
                format!("{} {}", month, values.join("/"))
            })
            .collect();
        out.push_str(&format!("{}: {}\n", ticker, cells.join("  ")));
    }
    out
}

fn render_failures(failures: &[FetchFailure]) -> String {
    failures.iter().map(|f| format!("{}\n", f)).collect()
}

pub fn render_event(event: &DashboardEvent) -> String {
    match event {
        DashboardEvent::Ready {
            history, failures, ..
        } => {
            let mut out = String::from("## Insider Sentiment (MSPR)\n");
            out.push_str(&render_history(history));
            out.push_str(&render_failures(failures));
            out
        }
        DashboardEvent::Table {
            cycle,
            rows,
            failures,
            ..
        } => {
            let mut out = format!(
                "## Live Stock Prices (cycle {}, {})\n",
                cycle,
                Local::now().format("%H:%M:%S")
            );
            out.push_str(&render_table(rows));
            out.push_str(&render_failures(failures));
            out
        }
    }
}

/// Polls the configured tickers and prints every update until Ctrl-C.
pub async fn run(config: &AppConfig, poller: Poller) -> Result<(), AppError> {
    let (tx, mut rx) = mpsc::channel(16);
    let mut scheduler = Scheduler::new(poller, tx);
    scheduler.restart(config.tickers.clone());

    let mut stdout = io::stdout();
    writeln!(stdout, "{}\n", TITLE)?;

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if Some(event.session()) != scheduler.current_session() {
                    continue;
                }
                writeln!(stdout, "{}", render_event(&event))?;
                stdout.flush()?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, stopping.");
                break;
            }
        }
    }

    scheduler.stop().await;
    Ok(())
}
