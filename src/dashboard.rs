//! Request/response core of the dashboard: user selections plus freshly
//! fetched data in, a render model out.

use chrono::NaiveDate;

use crate::compare::{combine, parse_ticker_list, ComparisonTable};
use crate::config::DashboardConfig;
use crate::error::AppError;
use crate::market_data::MarketDataSource;
use crate::metrics::{derive_with, DerivedMetrics, MetricWindows};
use crate::model::balance_sheet::BalanceSheet;
use crate::model::column::{Column, DEFAULT_TABLE_COLUMNS, TABLE_COLUMNS};
use crate::model::date_range::DateRange;
use crate::model::price::PriceSeries;

/// Everything the user can choose on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub ticker: String,
    pub start_date: String,
    pub end_date: String,
    pub hide_data: bool,
    pub hide_balance_sheet: bool,
    pub compare: bool,
    pub table_columns: Vec<Column>,
    pub chart_column: Column,
    pub compare_tickers: String,
    pub compare_column: Column,
}

impl Default for Selections {
    fn default() -> Self {
        Self {
            ticker: "AAPL".to_string(),
            start_date: "2020-01-01".to_string(),
            end_date: "2021-01-01".to_string(),
            hide_data: false,
            hide_balance_sheet: false,
            compare: false,
            table_columns: DEFAULT_TABLE_COLUMNS.to_vec(),
            chart_column: Column::AdjClose,
            compare_tickers: "AAPL, MSFT, GOOGL".to_string(),
            compare_column: Column::AdjClose,
        }
    }
}

impl Selections {
    pub fn from_config(cfg: &DashboardConfig) -> Self {
        Self {
            ticker: cfg.ticker.clone(),
            start_date: cfg.start_date.clone(),
            end_date: cfg.end_date.clone(),
            compare_tickers: cfg.compare_tickers.clone(),
            ..Self::default()
        }
    }

    pub fn normalized_ticker(&self) -> String {
        self.ticker.trim().to_ascii_uppercase()
    }

    pub fn date_range(&self) -> Result<DateRange, AppError> {
        DateRange::parse(&self.start_date, &self.end_date)
    }

    pub fn comparison_tickers(&self) -> Vec<String> {
        parse_ticker_list(&self.compare_tickers)
    }

    /// True when moving from `previous` to `self` needs data that was not
    /// fetched for `previous`. Pure view changes (table columns, chart
    /// column, hiding sections) can be re-rendered from the old data.
    pub fn requires_fetch(&self, previous: &Selections) -> bool {
        self.normalized_ticker() != previous.normalized_ticker()
            || self.start_date.trim() != previous.start_date.trim()
            || self.end_date.trim() != previous.end_date.trim()
            || (self.compare && !previous.compare)
            || (self.compare && self.comparison_tickers() != previous.comparison_tickers())
            || (!self.hide_balance_sheet && previous.hide_balance_sheet)
    }

    /// Add or remove a table column, keeping the table's canonical order.
    pub fn toggle_table_column(&mut self, column: Column) {
        if let Some(pos) = self.table_columns.iter().position(|c| *c == column) {
            self.table_columns.remove(pos);
        } else {
            self.table_columns.push(column);
            self.table_columns.sort_by_key(|c| {
                TABLE_COLUMNS
                    .iter()
                    .position(|t| t == c)
                    .unwrap_or(TABLE_COLUMNS.len())
            });
        }
    }
}

/// Fetch outcomes for one refresh cycle. Errors are kept as display text.
#[derive(Debug, Clone)]
pub struct FetchedData {
    pub primary: Result<PriceSeries, String>,
    pub comparison: Vec<(String, Result<PriceSeries, String>)>,
    pub balance_sheet: Option<Result<BalanceSheet, String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

impl TableView {
    pub fn from_metrics(metrics: &DerivedMetrics, columns: &[Column]) -> Self {
        let rows = metrics
            .series
            .bars
            .iter()
            .enumerate()
            .map(|(i, bar)| TableRow {
                date: bar.date,
                values: columns.iter().map(|c| metrics.value(*c, i)).collect(),
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    Single {
        ticker: String,
        column: Column,
        points: Vec<(NaiveDate, Option<f64>)>,
    },
    Comparison(ComparisonTable),
}

impl ChartView {
    pub fn title(&self) -> String {
        match self {
            Self::Single { ticker, column, .. } => format!("{} {}", ticker, column),
            Self::Comparison(t) => format!("Compare {} ({})", t.column, t.tickers.join(", ")),
        }
    }
}

/// What the UI draws for one refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    /// Selections this model was built from.
    pub selections: Selections,
    pub ticker: String,
    pub metrics: Option<DerivedMetrics>,
    pub table: Option<TableView>,
    pub chart: Option<ChartView>,
    pub balance_sheet: Option<BalanceSheet>,
    pub errors: Vec<String>,
}

impl RenderModel {
    /// A cycle that stopped before anything could be rendered.
    pub fn failed(selections: &Selections, error: impl Into<String>) -> Self {
        Self {
            selections: selections.clone(),
            ticker: selections.normalized_ticker(),
            metrics: None,
            table: None,
            chart: None,
            balance_sheet: None,
            errors: vec![error.into()],
        }
    }

    pub fn is_failed(&self) -> bool {
        self.metrics.is_none() && !self.errors.is_empty()
    }
}

pub fn build_render_model(
    selections: &Selections,
    fetched: FetchedData,
    windows: MetricWindows,
) -> RenderModel {
    let ticker = selections.normalized_ticker();
    let series = match fetched.primary {
        Ok(series) => series,
        Err(e) => return RenderModel::failed(selections, format!("Error: {}", e)),
    };
    if series.is_empty() {
        return RenderModel::failed(
            selections,
            format!(
                "no price data for {} between {} and {}",
                ticker,
                selections.start_date.trim(),
                selections.end_date.trim()
            ),
        );
    }

    let metrics = derive_with(series, windows);
    let mut errors = Vec::new();

    let table = (!selections.hide_data)
        .then(|| TableView::from_metrics(&metrics, &selections.table_columns));

    let chart = if selections.compare {
        let mut ok: Vec<&PriceSeries> = Vec::new();
        for (t, res) in &fetched.comparison {
            match res {
                Ok(s) if !s.is_empty() => ok.push(s),
                Ok(_) => errors.push(format!("{}: no price data in range", t)),
                Err(e) => errors.push(format!("{}: {}", t, e)),
            }
        }
        if ok.is_empty() {
            errors.push("comparison unavailable: no ticker returned data".to_string());
            None
        } else {
            Some(ChartView::Comparison(combine(&ok, selections.compare_column)))
        }
    } else {
        let column = selections.chart_column;
        let points = metrics
            .series
            .dates()
            .zip(metrics.column(column))
            .collect();
        Some(ChartView::Single {
            ticker: metrics.ticker().to_string(),
            column,
            points,
        })
    };

    let balance_sheet = match fetched.balance_sheet {
        Some(Ok(sheet)) if !selections.hide_balance_sheet => Some(sheet),
        Some(Err(e)) if !selections.hide_balance_sheet => {
            errors.push(format!("balance sheet: {}", e));
            None
        }
        _ => None,
    };

    RenderModel {
        selections: selections.clone(),
        ticker,
        metrics: Some(metrics),
        table,
        chart,
        balance_sheet,
        errors,
    }
}

/// Fetch everything `selections` asks for from `source`.
///
/// Fetches run one after another: primary ticker, comparison tickers when
/// compare mode is on, then the balance sheet unless hidden. A failed
/// primary fetch skips the rest. Only an unusable date range is an error.
pub async fn fetch_all<S: MarketDataSource>(
    source: &S,
    selections: &Selections,
) -> Result<FetchedData, AppError> {
    let ticker = selections.normalized_ticker();
    let range = selections.date_range()?;

    let primary = source
        .fetch_prices(&ticker, &range)
        .await
        .map_err(|e| e.to_string());
    if let Err(e) = &primary {
        tracing::warn!(ticker = %ticker, error = %e, "primary fetch failed");
        return Ok(FetchedData {
            primary,
            comparison: Vec::new(),
            balance_sheet: None,
        });
    }

    let mut comparison = Vec::new();
    if selections.compare {
        for t in selections.comparison_tickers() {
            let res = match &primary {
                Ok(series) if t == ticker => Ok(series.clone()),
                _ => source
                    .fetch_prices(&t, &range)
                    .await
                    .map_err(|e| e.to_string()),
            };
            if let Err(e) = &res {
                tracing::warn!(ticker = %t, error = %e, "comparison fetch failed");
            }
            comparison.push((t, res));
        }
    }

    let balance_sheet = if selections.hide_balance_sheet {
        None
    } else {
        Some(
            source
                .fetch_balance_sheet(&ticker)
                .await
                .map_err(|e| e.to_string()),
        )
    };

    Ok(FetchedData {
        primary,
        comparison,
        balance_sheet,
    })
}

/// Result of one fetch-and-derive cycle. `fetched` is absent when the
/// cycle stopped before any request was made.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub fetched: Option<FetchedData>,
    pub model: RenderModel,
}

/// Run one full fetch-and-derive cycle against `source`.
pub async fn refresh<S: MarketDataSource>(
    source: &S,
    selections: &Selections,
    windows: MetricWindows,
) -> RefreshOutcome {
    match fetch_all(source, selections).await {
        Ok(fetched) => RefreshOutcome {
            model: build_render_model(selections, fetched.clone(), windows),
            fetched: Some(fetched),
        },
        Err(e) => RefreshOutcome {
            fetched: None,
            model: RenderModel::failed(selections, format!("Error: {}", e)),
        },
    }
}
