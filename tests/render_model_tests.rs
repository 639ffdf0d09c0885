use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use stock_dashboard::dashboard::{
    build_render_model, fetch_all, refresh, ChartView, FetchedData, Selections,
};
use stock_dashboard::error::AppError;
use stock_dashboard::market_data::MarketDataSource;
use stock_dashboard::metrics::MetricWindows;
use stock_dashboard::model::balance_sheet::{BalanceSheet, BalanceSheetRow};
use stock_dashboard::model::column::Column;
use stock_dashboard::model::date_range::DateRange;
use stock_dashboard::model::price::{PriceBar, PriceSeries};

fn series(ticker: &str, n: usize, base: f64) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let bars = (0..n)
        .map(|i| {
            let px = base + i as f64;
            PriceBar {
                date: start + chrono::Days::new(i as u64),
                open: px,
                high: px + 1.0,
                low: px - 1.0,
                close: px,
                adj_close: px,
                volume: 1_000,
            }
        })
        .collect();
    PriceSeries::new(ticker, bars)
}

fn sheet(ticker: &str) -> BalanceSheet {
    BalanceSheet {
        ticker: ticker.to_string(),
        periods: vec![NaiveDate::from_ymd_opt(2020, 9, 30).unwrap()],
        rows: vec![BalanceSheetRow {
            item: "Total Assets".to_string(),
            values: vec![Some(323_888_000_000.0)],
        }],
    }
}

fn fetched(primary: Result<PriceSeries, String>) -> FetchedData {
    FetchedData {
        primary,
        comparison: Vec::new(),
        balance_sheet: Some(Ok(sheet("AAPL"))),
    }
}

#[derive(Default)]
struct FakeSource {
    prices: HashMap<String, PriceSeries>,
    price_calls: AtomicUsize,
    sheet_calls: AtomicUsize,
}

impl FakeSource {
    fn with(mut self, s: PriceSeries) -> Self {
        self.prices.insert(s.ticker.clone(), s);
        self
    }
}

impl MarketDataSource for FakeSource {
    async fn fetch_prices(&self, ticker: &str, _range: &DateRange) -> Result<PriceSeries, AppError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        self.prices
            .get(ticker)
            .cloned()
            .ok_or_else(|| AppError::TickerNotFound {
                ticker: ticker.to_string(),
                reason: "No data found, symbol may be delisted".to_string(),
            })
    }

    async fn fetch_balance_sheet(&self, ticker: &str) -> Result<BalanceSheet, AppError> {
        self.sheet_calls.fetch_add(1, Ordering::SeqCst);
        Ok(sheet(ticker))
    }
}

#[test]
fn default_selections_render_table_chart_and_balance_sheet() {
    let s = Selections::default();
    let m = build_render_model(&s, fetched(Ok(series("AAPL", 40, 70.0))), MetricWindows::default());

    assert!(m.errors.is_empty());
    let table = m.table.as_ref().expect("table shown by default");
    assert_eq!(table.columns, vec![Column::AdjClose, Column::Returns]);
    assert_eq!(table.rows.len(), 40);
    assert_eq!(table.rows[0].values, vec![Some(70.0), None]);
    match m.chart.as_ref() {
        Some(ChartView::Single { ticker, column, points }) => {
            assert_eq!(ticker, "AAPL");
            assert_eq!(*column, Column::AdjClose);
            assert_eq!(points.len(), 40);
        }
        other => panic!("expected single chart, got {other:?}"),
    }
    assert!(m.balance_sheet.is_some());
}

#[test]
fn hide_toggles_suppress_sections() {
    let s = Selections {
        hide_data: true,
        hide_balance_sheet: true,
        ..Selections::default()
    };
    let m = build_render_model(&s, fetched(Ok(series("AAPL", 10, 70.0))), MetricWindows::default());
    assert!(m.table.is_none());
    assert!(m.balance_sheet.is_none());
    assert!(m.chart.is_some());
}

#[test]
fn chart_follows_selected_derived_column() {
    let s = Selections {
        chart_column: Column::ShortMa,
        ..Selections::default()
    };
    let m = build_render_model(&s, fetched(Ok(series("AAPL", 8, 10.0))), MetricWindows::default());
    let Some(ChartView::Single { points, .. }) = m.chart else {
        panic!("expected single chart");
    };
    assert_eq!(points[5].1, None);
    assert_eq!(points[6].1, Some(13.0));
}

#[test]
/// A failed primary fetch is terminal for the cycle: only the error is
/// shown, even if a balance sheet is at hand.
fn primary_failure_renders_only_error() {
    let s = Selections::default();
    let m = build_render_model(
        &s,
        fetched(Err("ticker not found: ZZZZ (No data found)".to_string())),
        MetricWindows::default(),
    );
    assert!(m.is_failed());
    assert!(m.errors[0].starts_with("Error: "));
    assert!(m.table.is_none() && m.chart.is_none() && m.balance_sheet.is_none());
}

#[test]
fn empty_primary_is_reported_as_no_data() {
    let s = Selections::default();
    let m = build_render_model(&s, fetched(Ok(series("AAPL", 0, 0.0))), MetricWindows::default());
    assert!(m.is_failed());
    assert_eq!(
        m.errors,
        vec!["no price data for AAPL between 2020-01-01 and 2021-01-01".to_string()]
    );
}

#[test]
fn balance_sheet_failure_keeps_other_sections() {
    let s = Selections::default();
    let mut data = fetched(Ok(series("AAPL", 5, 70.0)));
    data.balance_sheet = Some(Err("yahoo API error (code 500): down".to_string()));
    let m = build_render_model(&s, data, MetricWindows::default());
    assert!(!m.is_failed());
    assert!(m.table.is_some() && m.chart.is_some());
    assert_eq!(m.errors, vec!["balance sheet: yahoo API error (code 500): down".to_string()]);
}

#[test]
/// Tickers that fail are dropped from the comparison and reported; the
/// rest are still compared.
fn comparison_drops_failed_tickers() {
    let s = Selections {
        compare: true,
        compare_column: Column::Open,
        ..Selections::default()
    };
    let mut data = fetched(Ok(series("AAPL", 3, 70.0)));
    data.comparison = vec![
        ("AAPL".to_string(), Ok(series("AAPL", 3, 70.0))),
        ("ZZZZ".to_string(), Err("ticker not found".to_string())),
        ("MSFT".to_string(), Ok(series("MSFT", 3, 150.0))),
    ];
    let m = build_render_model(&s, data, MetricWindows::default());

    let Some(ChartView::Comparison(table)) = &m.chart else {
        panic!("expected comparison chart");
    };
    assert_eq!(table.tickers, vec!["AAPL".to_string(), "MSFT".to_string()]);
    assert_eq!(table.column, Column::Open);
    assert_eq!(table.rows[0].values, vec![Some(70.0), Some(150.0)]);
    assert_eq!(m.errors, vec!["ZZZZ: ticker not found".to_string()]);
}

#[test]
fn comparison_with_no_survivors_has_no_chart() {
    let s = Selections {
        compare: true,
        ..Selections::default()
    };
    let mut data = fetched(Ok(series("AAPL", 3, 70.0)));
    data.comparison = vec![("ZZZZ".to_string(), Err("ticker not found".to_string()))];
    let m = build_render_model(&s, data, MetricWindows::default());
    assert!(m.chart.is_none());
    assert!(m.table.is_some());
    assert!(m
        .errors
        .contains(&"comparison unavailable: no ticker returned data".to_string()));
}

#[test]
fn fetch_all_skips_rest_after_primary_failure() {
    let source = FakeSource::default();
    let s = Selections {
        ticker: "zzzz".to_string(),
        compare: true,
        ..Selections::default()
    };
    let data = tokio_test::block_on(fetch_all(&source, &s)).expect("dates are valid");
    assert!(data.primary.is_err());
    assert!(data.comparison.is_empty());
    assert!(data.balance_sheet.is_none());
    assert_eq!(source.price_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.sheet_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn fetch_all_reuses_primary_for_comparison() {
    let source = FakeSource::default()
        .with(series("AAPL", 5, 70.0))
        .with(series("MSFT", 5, 150.0));
    let s = Selections {
        compare: true,
        compare_tickers: "aapl, msft".to_string(),
        hide_balance_sheet: true,
        ..Selections::default()
    };
    let data = tokio_test::block_on(fetch_all(&source, &s)).expect("dates are valid");
    assert_eq!(data.comparison.len(), 2);
    assert!(data.comparison.iter().all(|(_, r)| r.is_ok()));
    // AAPL once for the primary, MSFT once for the comparison.
    assert_eq!(source.price_calls.load(Ordering::SeqCst), 2);
    assert!(data.balance_sheet.is_none());
}

#[test]
fn invalid_date_range_fails_before_fetching() {
    let source = FakeSource::default().with(series("AAPL", 5, 70.0));
    let s = Selections {
        start_date: "2021-01-01".to_string(),
        end_date: "2020-01-01".to_string(),
        ..Selections::default()
    };
    let outcome = tokio_test::block_on(refresh(&source, &s, MetricWindows::default()));
    assert!(outcome.fetched.is_none());
    assert!(outcome.model.is_failed());
    assert!(outcome.model.errors[0].contains("invalid date range"));
    assert_eq!(source.price_calls.load(Ordering::SeqCst), 0);

    let bad = Selections {
        start_date: "01/01/2020".to_string(),
        ..Selections::default()
    };
    let outcome = tokio_test::block_on(refresh(&source, &bad, MetricWindows::default()));
    assert!(outcome.model.errors[0].contains("invalid date '01/01/2020'"));
}
