//! Multi-ticker comparison: one chosen column per ticker, aligned by date.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::metrics::raw_value;
use crate::model::column::Column;
use crate::model::price::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    /// One value per entry of `ComparisonTable::tickers`.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    pub column: Column,
    pub tickers: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one ticker across all rows.
    pub fn series(&self, ticker: &str) -> Option<Vec<Option<f64>>> {
        let col = self.tickers.iter().position(|t| t == ticker)?;
        Some(self.rows.iter().map(|r| r.values[col]).collect())
    }
}

/// Split a comma-separated ticker list, dropping blanks and repeats.
pub fn parse_ticker_list(input: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let t = raw.trim().to_ascii_uppercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Outer-join the given series on date. Each ticker contributes one value
/// column in input order; dates a ticker has no bar for stay empty.
pub fn combine(series: &[&PriceSeries], column: Column) -> ComparisonTable {
    let width = series.len();
    let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (col, s) in series.iter().enumerate() {
        for bar in &s.bars {
            by_date.entry(bar.date).or_insert_with(|| vec![None; width])[col] =
                Some(raw_value(bar, column));
        }
    }

    ComparisonTable {
        column,
        tickers: series.iter().map(|s| s.ticker.clone()).collect(),
        rows: by_date
            .into_iter()
            .map(|(date, values)| ComparisonRow { date, values })
            .collect(),
    }
}
