use chrono::NaiveDate;
use stock_dashboard::error::AppError;
use stock_dashboard::yahoo::{parse_balance_sheet_response, parse_chart_response};

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

const CHART_OK: &str = r#"{
  "chart": {
    "result": [{
      "meta": { "currency": "USD", "symbol": "AAPL", "gmtoffset": -18000 },
      "timestamp": [1577975400, 1578061800, 1578321000],
      "indicators": {
        "quote": [{
          "open":   [74.06, 74.29, 73.45],
          "high":   [75.15, 75.14, 74.99],
          "low":    [73.80, 74.13, 73.19],
          "close":  [75.09, 74.36, 74.95],
          "volume": [135480400, null, 118387200]
        }],
        "adjclose": [{ "adjclose": [73.06, 72.35, 72.93] }]
      }
    }],
    "error": null
  }
}"#;

#[test]
fn chart_payload_parses_into_daily_bars() {
    let s = parse_chart_response("AAPL", CHART_OK).expect("chart should parse");

    assert_eq!(s.ticker, "AAPL");
    assert_eq!(s.len(), 3);
    assert_eq!(
        s.dates().collect::<Vec<_>>(),
        vec![d("2020-01-02"), d("2020-01-03"), d("2020-01-06")]
    );
    let first = &s.bars[0];
    assert_eq!(first.open, 74.06);
    assert_eq!(first.close, 75.09);
    assert_eq!(first.adj_close, 73.06);
    assert_eq!(first.volume, 135_480_400);
    // Missing volume reads as zero, the row is kept.
    assert_eq!(s.bars[1].volume, 0);
}

#[test]
fn chart_rows_with_missing_prices_are_skipped() {
    let body = r#"{
      "chart": {
        "result": [{
          "meta": { "symbol": "MSFT", "gmtoffset": 0 },
          "timestamp": [1577975400, 1578061800],
          "indicators": {
            "quote": [{
              "open": [158.78, null], "high": [160.73, 159.95],
              "low": [158.33, 158.06], "close": [160.62, 158.62],
              "volume": [22622100, 21116200]
            }]
          }
        }],
        "error": null
      }
    }"#;

    let s = parse_chart_response("MSFT", body).expect("chart should parse");
    assert_eq!(s.len(), 1);
    // No adjclose column at all: fall back to close.
    assert_eq!(s.bars[0].adj_close, 160.62);
}

#[test]
fn chart_error_payload_is_ticker_not_found() {
    let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
    let err = parse_chart_response("ZZZZZZ", body).unwrap_err();
    match err {
        AppError::TickerNotFound { ticker, reason } => {
            assert_eq!(ticker, "ZZZZZZ");
            assert!(reason.contains("No data found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn chart_empty_result_is_ticker_not_found() {
    let body = r#"{"chart":{"result":[],"error":null}}"#;
    assert!(matches!(
        parse_chart_response("AAPL", body),
        Err(AppError::TickerNotFound { .. })
    ));
}

#[test]
fn chart_without_timestamps_is_empty_series() {
    let body = r#"{"chart":{"result":[{"meta":{"symbol":"AAPL"},"indicators":{"quote":[{}]}}],"error":null}}"#;
    let s = parse_chart_response("AAPL", body).expect("chart should parse");
    assert!(s.is_empty());
}

#[test]
fn malformed_chart_json_is_json_error() {
    assert!(matches!(
        parse_chart_response("AAPL", "<html>rate limited</html>"),
        Err(AppError::Json(_))
    ));
}

const BALANCE_SHEET_OK: &str = r#"{
  "timeseries": {
    "result": [
      {
        "meta": { "symbol": ["AAPL"], "type": ["annualTotalAssets"] },
        "timestamp": [1569801600, 1601424000],
        "annualTotalAssets": [
          { "asOfDate": "2019-09-30", "periodType": "12M", "reportedValue": { "raw": 338516000000.0, "fmt": "338.52B" } },
          { "asOfDate": "2020-09-30", "periodType": "12M", "reportedValue": { "raw": 323888000000.0, "fmt": "323.89B" } }
        ]
      },
      {
        "meta": { "symbol": ["AAPL"], "type": ["annualInventory"] },
        "timestamp": [1601424000],
        "annualInventory": [
          { "asOfDate": "2020-09-30", "periodType": "12M", "reportedValue": { "raw": 4061000000.0, "fmt": "4.06B" } }
        ]
      },
      {
        "meta": { "symbol": ["AAPL"], "type": ["annualGoodwill"] },
        "annualGoodwill": []
      }
    ],
    "error": null
  }
}"#;

#[test]
fn balance_sheet_periods_newest_first() {
    let sheet = parse_balance_sheet_response("AAPL", BALANCE_SHEET_OK).expect("should parse");

    assert_eq!(sheet.ticker, "AAPL");
    assert_eq!(sheet.periods, vec![d("2020-09-30"), d("2019-09-30")]);
    let items: Vec<&str> = sheet.rows.iter().map(|r| r.item.as_str()).collect();
    assert_eq!(items, vec!["Total Assets", "Inventory"]);
    assert_eq!(
        sheet.value("Total Assets", d("2019-09-30")),
        Some(338_516_000_000.0)
    );
    assert_eq!(sheet.value("Inventory", d("2019-09-30")), None);
    assert_eq!(sheet.rows[1].values, vec![Some(4_061_000_000.0), None]);
}

#[test]
fn balance_sheet_error_payload_is_ticker_not_found() {
    let body = r#"{"timeseries":{"result":null,"error":{"code":"Bad Request","description":"Invalid symbol"}}}"#;
    assert!(matches!(
        parse_balance_sheet_response("ZZZZZZ", body),
        Err(AppError::TickerNotFound { .. })
    ));
}

#[test]
fn balance_sheet_without_rows_is_ticker_not_found() {
    let body = r#"{"timeseries":{"result":[],"error":null}}"#;
    assert!(matches!(
        parse_balance_sheet_response("AAPL", body),
        Err(AppError::TickerNotFound { .. })
    ));
}
