pub mod rest;
pub mod types;

pub use rest::{parse_balance_sheet_response, parse_chart_response, validate_ticker, YahooRestClient};
