use crate::model::{DisplayRow, Sentiment, Ticker};
use crate::sentiment::{MonthKey, SentimentHistory};
use crate::ui::app::{App, Mode};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, Paragraph, Row,
        Table,
    },
};

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::Blue,
    Color::Red,
];

pub fn draw(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(app.title.as_str()).bold())
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, outer[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(30)])
        .split(outer[1]);
    draw_selector(f, app, body[0]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(body[1]);
    draw_table(f, app, main[0]);
    draw_chart(f, &app.history, main[1]);

    let help = match app.mode {
        Mode::Filter => format!(" filter: {}_  (Enter keep, Esc clear)", app.filter),
        Mode::Browse => " ↑/↓ move  space select  / filter  r refresh  q quit".to_string(),
    };
    f.render_widget(Paragraph::new(help).style(Style::default().fg(Color::DarkGray)), outer[2]);
}

fn draw_selector(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .visible()
        .into_iter()
        .map(|ticker| {
            let mark = if app.is_selected(ticker) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{} {}", mark, ticker))
        })
        .collect();

    let title = format!(" Select Stocks ({}) ", app.selected().len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.cursor);
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let block_title = match (app.loading, app.cycle) {
        (true, _) => " Live Stock Prices (loading...) ".to_string(),
        (false, Some(cycle)) => format!(" Live Stock Prices (cycle {}) ", cycle),
        (false, None) => " Live Stock Prices ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(block_title);

    if app.rows.is_empty() {
        let hint = Paragraph::new("  Select one or more tickers to start monitoring.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(hint, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let error_lines = app.failures.len().min(inner.height.saturating_sub(2) as usize / 2);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(error_lines as u16)])
        .split(inner);

    let header = Row::new(["Symbol", "Price", "Sentiment", "MSPR"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = app.rows.iter().map(table_row).collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(header);
    f.render_widget(table, parts[0]);

    let errors: Vec<Line> = app
        .failures
        .iter()
        .take(error_lines)
        .map(|failure| Line::from(failure.to_string()).fg(Color::Red))
        .collect();
    f.render_widget(Paragraph::new(errors), parts[1]);
}

fn table_row(row: &DisplayRow) -> Row<'static> {
    let mspr_style = match row.sentiment {
        Sentiment::Available(v) if v >= 0.0 => Style::default().fg(Color::Green),
        Sentiment::Available(_) => Style::default().fg(Color::Red),
        Sentiment::Unavailable => Style::default().fg(Color::DarkGray),
        Sentiment::Failed(_) => Style::default().fg(Color::Red),
    };
    Row::new(vec![
        Cell::from(row.ticker.to_string()),
        Cell::from(row.price_cell()),
        Cell::from(row.available_cell()),
        Cell::from(row.mspr_cell()).style(mspr_style),
    ])
}

/// Chart points per ticker: x is the month's index among all months shown.
pub fn chart_series(history: &[(Ticker, SentimentHistory)]) -> (Vec<MonthKey>, Vec<Vec<(f64, f64)>>) {
    let mut months: Vec<MonthKey> = history
        .iter()
        .flat_map(|(_, months)| months.keys().copied())
        .collect();
    months.sort();
    months.dedup();

    let series: Vec<Vec<(f64, f64)>> = history
        .iter()
        .map(|(_, by_month)| {
            by_month
                .iter()
                .flat_map(|(key, values)| {
                    let x = months.binary_search(key).unwrap_or_default() as f64;
                    values.iter().map(move |&y| (x, y))
                })
                .collect::<Vec<_>>()
        })
        .collect();

    (months, series)
}

fn draw_chart(f: &mut Frame, history: &[(Ticker, SentimentHistory)], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Insider Sentiment (MSPR, last 12 months) ");

    let (months, series) = chart_series(history);
    let values: Vec<f64> = series.iter().flatten().map(|&(_, y)| y).collect();
    if months.is_empty() || values.is_empty() {
        let empty = Paragraph::new("  No insider sentiment data")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let min_y = values.iter().cloned().fold(f64::INFINITY, f64::min).min(0.0);
    let max_y = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max).max(0.0);
    let pad = ((max_y - min_y) * 0.05).max(1.0);
    let max_x = (months.len().saturating_sub(1)).max(1) as f64;

    let datasets: Vec<Dataset> = history
        .iter()
        .zip(series.iter())
        .enumerate()
        .map(|(i, ((ticker, _), points))| {
            Dataset::default()
                .name(ticker.to_string())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                .data(points)
        })
        .collect();

    let mut x_labels = vec![Span::raw(months[0].to_string())];
    if months.len() > 2 {
        x_labels.push(Span::raw(months[months.len() / 2].to_string()));
    }
    if months.len() > 1 {
        x_labels.push(Span::raw(months[months.len() - 1].to_string()));
    }

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_x])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("MSPR")
                .style(Style::default().fg(Color::Gray))
                .bounds([min_y - pad, max_y + pad])
                .labels(vec![
                    Span::raw(format!("{:.1}", min_y - pad)),
                    Span::raw(format!("{:.1}", (min_y + max_y) / 2.0)),
                    Span::raw(format!("{:.1}", max_y + pad)),
                ]),
        );
    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FetchFailure, FetchKind};
    use crate::poller::DashboardEvent;
    use crate::provider::stub::ticker;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut text = String::new();
        for (i, cell) in buffer.content.iter().enumerate() {
            text.push_str(cell.symbol());
            if (i + 1) % width == 0 {
                text.push('\n');
            }
        }
        text
    }

    fn months(entries: &[(i32, u32, &[f64])]) -> SentimentHistory {
        entries
            .iter()
            .map(|&(year, month, values)| (MonthKey { year, month }, values.to_vec()))
            .collect()
    }

    #[test]
    fn empty_dashboard_shows_hint() {
        let mut app = App::new("Real-time Stock Price Monitor", vec![ticker("AAPL")], Vec::new());
        let text = screen(&mut app);
        assert!(text.contains("Real-time Stock Price Monitor"));
        assert!(text.contains("[ ] AAPL"));
        assert!(text.contains("Select one or more tickers"));
        assert!(text.contains("No insider sentiment data"));
    }

    #[test]
    fn table_and_errors_render() {
        let mut app = App::new("Monitor", vec![ticker("AAPL"), ticker("MSFT")], vec![ticker("AAPL"), ticker("MSFT")]);
        app.begin_session(Some(1));
        let mut aapl = DisplayRow::new(ticker("AAPL"));
        aapl.price = Some(150.0);
        aapl.sentiment = Sentiment::Available(0.3);
        let mut msft = DisplayRow::new(ticker("MSFT"));
        msft.price = Some(300.0);
        app.apply(DashboardEvent::Table {
            session: 1,
            cycle: 4,
            rows: vec![aapl, msft],
            failures: vec![FetchFailure {
                ticker: ticker("MSFT"),
                kind: FetchKind::Quote,
                message: "timeout".into(),
            }],
        });

        let text = screen(&mut app);
        assert!(text.contains("[x] AAPL"));
        assert!(text.contains("cycle 4"));
        assert!(text.contains("150.00"));
        assert!(text.contains("300.00"));
        assert!(text.contains("0.30"));
        assert!(text.contains("N/A"));
        assert!(text.contains("Error fetching price for MSFT: timeout"));
    }

    #[test]
    fn chart_series_aligns_months_across_tickers() {
        let history = vec![
            (ticker("AAPL"), months(&[(2024, 3, &[1.0]), (2024, 5, &[2.0, 3.0])])),
            (ticker("MSFT"), months(&[(2024, 4, &[-1.5])])),
        ];
        let (keys, series) = chart_series(&history);
        let labels: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(labels, vec!["2024-03", "2024-04", "2024-05"]);
        assert_eq!(series[0], vec![(0.0, 1.0), (2.0, 2.0), (2.0, 3.0)]);
        assert_eq!(series[1], vec![(1.0, -1.5)]);
    }

    #[test]
    fn chart_renders_legend() {
        let mut app = App::new("Monitor", vec![ticker("AAPL")], vec![ticker("AAPL")]);
        app.begin_session(Some(1));
        app.apply(DashboardEvent::Ready {
            session: 1,
            history: vec![(ticker("AAPL"), months(&[(2024, 3, &[1.0]), (2024, 4, &[-2.0])]))],
            rows: vec![DisplayRow::new(ticker("AAPL"))],
            failures: Vec::new(),
        });
        let text = screen(&mut app);
        assert!(text.contains("Insider Sentiment"));
        assert!(text.contains("2024-03"));
        assert!(!text.contains("No insider sentiment data"));
    }
}
