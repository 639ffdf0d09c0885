use serde::Deserialize;

/// Yahoo chart endpoint envelope (`/v8/finance/chart/{symbol}`).
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<YahooErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct YahooErrorBody {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds; bar timestamps are shifted by
    /// this before taking the calendar date.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
    #[serde(default)]
    pub adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdjCloseColumn {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// Balance-sheet line items requested from the fundamentals time series
/// endpoint, as `(series key suffix, display label)`.
pub const BALANCE_SHEET_ITEMS: &[(&str, &str)] = &[
    ("TotalAssets", "Total Assets"),
    ("CurrentAssets", "Current Assets"),
    ("CashAndCashEquivalents", "Cash And Cash Equivalents"),
    ("AccountsReceivable", "Accounts Receivable"),
    ("Inventory", "Inventory"),
    ("NetPPE", "Net PPE"),
    ("TotalLiabilitiesNetMinorityInterest", "Total Liabilities Net Minority Interest"),
    ("CurrentLiabilities", "Current Liabilities"),
    ("AccountsPayable", "Accounts Payable"),
    ("LongTermDebt", "Long Term Debt"),
    ("TotalDebt", "Total Debt"),
    ("StockholdersEquity", "Stockholders Equity"),
    ("RetainedEarnings", "Retained Earnings"),
    ("WorkingCapital", "Working Capital"),
    ("ShareIssued", "Share Issued"),
];

pub const BALANCE_SHEET_FREQUENCY: &str = "annual";
