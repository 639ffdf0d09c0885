use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::error::AppError;
use crate::market_data::MarketDataSource;
use crate::model::balance_sheet::{BalanceSheet, BalanceSheetRow};
use crate::model::date_range::DateRange;
use crate::model::price::{PriceBar, PriceSeries};
use crate::yahoo::types::{ChartEnvelope, BALANCE_SHEET_FREQUENCY, BALANCE_SHEET_ITEMS};

const MAX_TICKER_LEN: usize = 20;
/// Earliest report date requested for fundamentals (2016-12-31 UTC).
const FUNDAMENTALS_START_UNIX: i64 = 1_483_142_400;

pub struct YahooRestClient {
    http: reqwest::Client,
    base_url: String,
}

/// Normalize a user-typed ticker (trim, upper-case) and reject anything
/// Yahoo could not resolve as a symbol.
pub fn validate_ticker(raw: &str) -> Result<String, AppError> {
    let symbol = raw.trim().to_ascii_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_TICKER_LEN
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if !valid {
        return Err(AppError::InvalidTicker(raw.trim().to_string()));
    }
    Ok(symbol)
}

fn compact_error_body(body: &str) -> String {
    let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() > 180 {
        let cut: String = normalized.chars().take(180).collect();
        format!("{}...", cut)
    } else {
        normalized
    }
}

/// Parse a `/v8/finance/chart` payload into a daily price series.
///
/// Bars with a missing open/high/low/close/adjclose are skipped; a missing
/// volume reads as zero. When the payload has no adjusted close column at
/// all, the close is used instead.
pub fn parse_chart_response(ticker: &str, body: &str) -> Result<PriceSeries, AppError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;
    if let Some(err) = envelope.chart.error {
        return Err(AppError::TickerNotFound {
            ticker: ticker.to_string(),
            reason: format!("{}: {}", err.code, err.description),
        });
    }
    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(AppError::TickerNotFound {
            ticker: ticker.to_string(),
            reason: "empty chart result".to_string(),
        });
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adj = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();
    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(dt) = DateTime::from_timestamp(ts.saturating_add(offset), 0) else {
            skipped += 1;
            continue;
        };
        let close = at(&quote.close, i);
        let adj_close = if adj.adjclose.is_empty() {
            close
        } else {
            at(&adj.adjclose, i)
        };
        let (Some(open), Some(high), Some(low), Some(close), Some(adj_close)) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            close,
            adj_close,
        ) else {
            skipped += 1;
            continue;
        };
        bars.push(PriceBar {
            date: dt.date_naive(),
            open,
            high,
            low,
            close,
            adj_close,
            volume: at(&quote.volume, i).unwrap_or(0.0).max(0.0) as u64,
        });
    }
    if skipped > 0 {
        tracing::debug!(ticker = %ticker, skipped, "dropped incomplete chart rows");
    }

    Ok(PriceSeries::new(result.meta.symbol, bars))
}

/// Parse a fundamentals time series payload into a balance sheet with
/// report dates ordered newest first.
pub fn parse_balance_sheet_response(ticker: &str, body: &str) -> Result<BalanceSheet, AppError> {
    let root: Value = serde_json::from_str(body)?;
    let Some(timeseries) = root.get("timeseries") else {
        return Err(AppError::YahooApi {
            code: "format".to_string(),
            msg: "missing timeseries object".to_string(),
        });
    };
    if let Some(err) = timeseries.get("error").filter(|e| !e.is_null()) {
        let reason = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("fundamentals request failed")
            .to_string();
        return Err(AppError::TickerNotFound {
            ticker: ticker.to_string(),
            reason,
        });
    }

    let results = timeseries
        .get("result")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut series: HashMap<String, Vec<(NaiveDate, f64)>> = HashMap::new();
    for entry in &results {
        let Some(key) = entry
            .get("meta")
            .and_then(|m| m.get("type"))
            .and_then(Value::as_array)
            .and_then(|types| types.first())
            .and_then(Value::as_str)
        else {
            continue;
        };
        let points = entry
            .get(key)
            .and_then(Value::as_array)
            .map(|points| {
                points
                    .iter()
                    .filter_map(|p| {
                        let date = p.get("asOfDate")?.as_str()?.parse::<NaiveDate>().ok()?;
                        let raw = p.get("reportedValue")?.get("raw")?.as_f64()?;
                        Some((date, raw))
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let item = key.strip_prefix(BALANCE_SHEET_FREQUENCY).unwrap_or(key);
        series.insert(item.to_string(), points);
    }

    let periods: Vec<NaiveDate> = series
        .values()
        .flat_map(|pts| pts.iter().map(|(d, _)| *d))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();

    let rows: Vec<BalanceSheetRow> = BALANCE_SHEET_ITEMS
        .iter()
        .filter_map(|(key, label)| {
            let pts = series.get(*key).filter(|pts| !pts.is_empty())?;
            let values = periods
                .iter()
                .map(|p| pts.iter().find(|(d, _)| d == p).map(|(_, v)| *v))
                .collect();
            Some(BalanceSheetRow {
                item: label.to_string(),
                values,
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(AppError::TickerNotFound {
            ticker: ticker.to_string(),
            reason: "no balance sheet data".to_string(),
        });
    }

    Ok(BalanceSheet {
        ticker: ticker.to_string(),
        periods,
        rows,
    })
}

impl YahooRestClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| AppError::Config(format!("invalid yahoo.user_agent: {}", e)))?,
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(reqwest::StatusCode, String), AppError> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Daily bars for `ticker` with dates inside `range` (end exclusive).
    pub async fn get_price_history(
        &self,
        ticker: &str,
        range: &DateRange,
    ) -> Result<PriceSeries, AppError> {
        let symbol = validate_ticker(ticker)?;
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let query = [
            ("period1", range.start_unix().to_string()),
            ("period2", range.end_unix().to_string()),
            ("interval", "1d".to_string()),
            ("events", "history".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];
        let (status, body) = self.get_text(&url, &query).await?;

        match parse_chart_response(&symbol, &body) {
            Ok(mut series) => {
                series.bars.retain(|b| range.contains(b.date));
                tracing::debug!(
                    ticker = %symbol,
                    rows = series.len(),
                    first = ?series.first_date(),
                    last = ?series.last_date(),
                    "fetched price history"
                );
                Ok(series)
            }
            Err(AppError::Json(_)) if !status.is_success() => Err(AppError::YahooApi {
                code: status.as_u16().to_string(),
                msg: compact_error_body(&body),
            }),
            Err(e) => {
                tracing::warn!(ticker = %symbol, status = %status, error = %e, "price history request failed");
                Err(e)
            }
        }
    }

    pub async fn get_balance_sheet(&self, ticker: &str) -> Result<BalanceSheet, AppError> {
        let symbol = validate_ticker(ticker)?;
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            self.base_url, symbol
        );
        let types = BALANCE_SHEET_ITEMS
            .iter()
            .map(|(key, _)| format!("{}{}", BALANCE_SHEET_FREQUENCY, key))
            .collect::<Vec<_>>()
            .join(",");
        let query = [
            ("symbol", symbol.clone()),
            ("type", types),
            ("period1", FUNDAMENTALS_START_UNIX.to_string()),
            ("period2", chrono::Utc::now().timestamp().to_string()),
        ];
        let (status, body) = self.get_text(&url, &query).await?;

        match parse_balance_sheet_response(&symbol, &body) {
            Ok(sheet) => {
                tracing::debug!(
                    ticker = %symbol,
                    items = sheet.rows.len(),
                    periods = sheet.periods.len(),
                    "fetched balance sheet"
                );
                Ok(sheet)
            }
            Err(AppError::Json(_)) if !status.is_success() => Err(AppError::YahooApi {
                code: status.as_u16().to_string(),
                msg: compact_error_body(&body),
            }),
            Err(e) => Err(e),
        }
    }
}

impl MarketDataSource for YahooRestClient {
    async fn fetch_prices(&self, ticker: &str, range: &DateRange) -> Result<PriceSeries, AppError> {
        self.get_price_history(ticker, range).await
    }

    async fn fetch_balance_sheet(&self, ticker: &str) -> Result<BalanceSheet, AppError> {
        self.get_balance_sheet(ticker).await
    }
}
