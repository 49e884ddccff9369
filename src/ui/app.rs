use crate::model::{DisplayRow, FetchFailure, Ticker};
use crate::poller::DashboardEvent;
use crate::sentiment::SentimentHistory;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::ListState;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    SelectionChanged,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Filter,
}

pub struct App {
    pub title: String,
    options: Vec<Ticker>,
    /// Selection in the order the user picked it.
    selected: Vec<Ticker>,
    pub filter: String,
    pub mode: Mode,
    pub cursor: ListState,
    session: Option<u64>,
    pub rows: Vec<DisplayRow>,
    pub history: Vec<(Ticker, SentimentHistory)>,
    pub failures: Vec<FetchFailure>,
    pub cycle: Option<u64>,
    pub loading: bool,
}

impl App {
    pub fn new(title: impl Into<String>, mut options: Vec<Ticker>, selected: Vec<Ticker>) -> Self {
        for ticker in &selected {
            if !options.contains(ticker) {
                options.push(ticker.clone());
            }
        }
        let mut cursor = ListState::default();
        if !options.is_empty() {
            cursor.select(Some(0));
        }

        Self {
            title: title.into(),
            options,
            selected,
            filter: String::new(),
            mode: Mode::Browse,
            cursor,
            session: None,
            rows: Vec::new(),
            history: Vec::new(),
            failures: Vec::new(),
            cycle: None,
            loading: false,
        }
    }

    pub fn selected(&self) -> &[Ticker] {
        &self.selected
    }

    pub fn is_selected(&self, ticker: &Ticker) -> bool {
        self.selected.contains(ticker)
    }

    /// Options matching the current filter.
    pub fn visible(&self) -> Vec<&Ticker> {
        let needle = self.filter.to_uppercase();
        self.options
            .iter()
            .filter(|t| needle.is_empty() || t.as_str().contains(&needle))
            .collect()
    }

    /// Called after the scheduler restarted; clears everything from the
    /// previous selection.
    pub fn begin_session(&mut self, session: Option<u64>) {
        self.session = session;
        self.rows = self.selected.iter().cloned().map(DisplayRow::new).collect();
        self.history.clear();
        self.failures.clear();
        self.cycle = None;
        self.loading = session.is_some();
    }

    /// Applies a poller event. Events from superseded sessions are dropped.
    pub fn apply(&mut self, event: DashboardEvent) -> bool {
        if Some(event.session()) != self.session {
            return false;
        }
        match event {
            DashboardEvent::Ready {
                history,
                rows,
                failures,
                ..
            } => {
                self.history = history;
                self.rows = rows;
                self.failures = failures;
                self.loading = false;
            }
            DashboardEvent::Table {
                cycle,
                rows,
                failures,
                ..
            } => {
                self.rows = rows;
                self.failures = failures;
                self.cycle = Some(cycle);
                self.loading = false;
            }
        }
        true
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match self.mode {
            Mode::Filter => {
                match key.code {
                    KeyCode::Esc => {
                        self.filter.clear();
                        self.mode = Mode::Browse;
                    }
                    KeyCode::Enter => self.mode = Mode::Browse,
                    KeyCode::Backspace => {
                        self.filter.pop();
                    }
                    KeyCode::Char(c) => self.filter.push(c),
                    _ => return Action::None,
                }
                self.clamp_cursor();
                Action::None
            }
            Mode::Browse => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Char('r') => Action::Refresh,
                KeyCode::Char('/') => {
                    self.mode = Mode::Filter;
                    Action::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_cursor(1);
                    Action::None
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_cursor(-1);
                    Action::None
                }
                KeyCode::Char(' ') | KeyCode::Enter => {
                    if self.toggle_current() {
                        Action::SelectionChanged
                    } else {
                        Action::None
                    }
                }
                _ => Action::None,
            },
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor.select(None);
            return;
        }
        let current = self.cursor.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.cursor.select(Some(next as usize));
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        match (len, self.cursor.selected()) {
            (0, _) => self.cursor.select(None),
            (_, None) => self.cursor.select(Some(0)),
            (len, Some(i)) if i >= len => self.cursor.select(Some(len - 1)),
            _ => {}
        }
    }

    fn toggle_current(&mut self) -> bool {
        let Some(index) = self.cursor.selected() else {
            return false;
        };
        let Some(ticker) = self.visible().get(index).map(|t| (*t).clone()) else {
            return false;
        };

        if let Some(pos) = self.selected.iter().position(|t| t == &ticker) {
            self.selected.remove(pos);
        } else {
            self.selected.push(ticker);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sentiment;
    use crate::provider::stub::ticker;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(
            "Monitor",
            vec![ticker("AAPL"), ticker("GOOGL"), ticker("MSFT")],
            Vec::new(),
        )
    }

    fn table(session: u64, cycle: u64, symbols: &[&str]) -> DashboardEvent {
        DashboardEvent::Table {
            session,
            cycle,
            rows: symbols.iter().map(|s| DisplayRow::new(ticker(s))).collect(),
            failures: Vec::new(),
        }
    }

    #[test]
    fn space_toggles_selection_in_pick_order() {
        let mut app = app();
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.handle_key(key(KeyCode::Char(' '))), Action::SelectionChanged);
        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.selected(), &[ticker("MSFT"), ticker("AAPL")]);

        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.selected(), &[ticker("MSFT")]);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut app = app();
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.cursor.selected(), Some(0));
        for _ in 0..10 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.cursor.selected(), Some(2));
    }

    #[test]
    fn filter_narrows_options() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('/')));
        app.handle_key(key(KeyCode::Char('m')));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.visible(), vec![&ticker("MSFT")]);
        // 'q' is text while filtering.
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::None);
        assert!(app.visible().is_empty());
        assert_eq!(app.cursor.selected(), None);

        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.handle_key(key(KeyCode::Char(' '))), Action::SelectionChanged);
        assert_eq!(app.selected(), &[ticker("MSFT")]);
    }

    #[test]
    fn stale_sessions_are_ignored() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char(' ')));
        app.begin_session(Some(2));
        assert_eq!(app.rows.len(), 1);

        assert!(!app.apply(table(1, 7, &["GOOGL", "MSFT"])));
        assert_eq!(app.rows[0].ticker, ticker("AAPL"));

        assert!(app.apply(table(2, 1, &["AAPL"])));
        assert_eq!(app.cycle, Some(1));
    }

    #[test]
    fn table_event_ends_loading() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char(' ')));
        app.begin_session(Some(3));
        assert!(app.loading);

        assert!(!app.apply(table(2, 1, &["AAPL"])));
        assert!(app.loading);

        assert!(app.apply(table(3, 1, &["AAPL"])));
        assert!(!app.loading);
    }

    #[test]
    fn ready_replaces_history_and_rows() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char(' ')));
        app.begin_session(Some(1));
        assert!(app.loading);

        let mut row = DisplayRow::new(ticker("AAPL"));
        row.sentiment = Sentiment::Available(0.5);
        app.apply(DashboardEvent::Ready {
            session: 1,
            history: vec![(ticker("AAPL"), SentimentHistory::new())],
            rows: vec![row.clone()],
            failures: Vec::new(),
        });
        assert!(!app.loading);
        assert_eq!(app.rows, vec![row]);
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn quit_and_refresh_keys() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn preselected_tickers_are_offered() {
        let app = App::new("Monitor", vec![ticker("AAPL")], vec![ticker("NVDA")]);
        assert_eq!(app.visible(), vec![&ticker("AAPL"), &ticker("NVDA")]);
        assert!(app.is_selected(&ticker("NVDA")));
    }
}
