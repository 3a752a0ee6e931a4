pub mod error;
pub mod yahoo_finance;

pub use error::MarketDataError;
pub use yahoo_finance::YahooFinanceClient;
