use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid ticker '{0}'")]
    InvalidTicker(String),

    #[error("ticker not found: {ticker} ({reason})")]
    TickerNotFound { ticker: String, reason: String },

    #[error("yahoo API error (code {code}): {msg}")]
    YahooApi { code: String, msg: String },

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid date range: start {start} must be before end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
