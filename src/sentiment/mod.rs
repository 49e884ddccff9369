// Sentiment module: current-month ratio and trailing-year history.

pub mod current;
pub mod history;

pub use current::current_sentiment;
pub use history::{MonthKey, SentimentHistory, sentiment_history};
