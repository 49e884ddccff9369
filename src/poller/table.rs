use crate::model::{DisplayRow, Sentiment, Ticker};

/// One row per selected ticker, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTable {
    rows: Vec<DisplayRow>,
}

impl DisplayTable {
    pub fn new(tickers: &[Ticker]) -> Self {
        Self {
            rows: tickers.iter().cloned().map(DisplayRow::new).collect(),
        }
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.rows.iter().map(|row| &row.ticker)
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn set_price(&mut self, ticker: &Ticker, price: f64) {
        if let Some(row) = self.row_mut(ticker) {
            row.price = Some(price);
        }
    }

    pub fn set_sentiment(&mut self, ticker: &Ticker, sentiment: Sentiment) {
        if let Some(row) = self.row_mut(ticker) {
            row.sentiment = sentiment;
        }
    }

    pub fn records(&self) -> Vec<String> {
        self.rows.iter().map(DisplayRow::to_record).collect()
    }

    fn row_mut(&mut self, ticker: &Ticker) -> Option<&mut DisplayRow> {
        self.rows.iter_mut().find(|row| &row.ticker == ticker)
    }
}
