pub mod finnhub;
pub mod traits;

#[cfg(test)]
pub mod stub;

pub use finnhub::FinnhubClient;
pub use traits::MarketData;
