//! Derived price metrics: single-period return plus short and long
//! trailing moving averages of the adjusted close.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::indicator::pct_change::PctChange;
use crate::indicator::rolling_mean::RollingMean;
use crate::model::column::Column;
use crate::model::price::{PriceBar, PriceSeries};

pub const RETURN_LAG: usize = 1;
pub const SHORT_MA_WINDOW: usize = 7;
pub const LONG_MA_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MetricWindows {
    #[serde(default = "default_return_lag")]
    pub return_lag: usize,
    #[serde(default = "default_short_ma_window")]
    pub short_ma_window: usize,
    #[serde(default = "default_long_ma_window")]
    pub long_ma_window: usize,
}

fn default_return_lag() -> usize {
    RETURN_LAG
}

fn default_short_ma_window() -> usize {
    SHORT_MA_WINDOW
}

fn default_long_ma_window() -> usize {
    LONG_MA_WINDOW
}

impl Default for MetricWindows {
    fn default() -> Self {
        Self {
            return_lag: RETURN_LAG,
            short_ma_window: SHORT_MA_WINDOW,
            long_ma_window: LONG_MA_WINDOW,
        }
    }
}

impl MetricWindows {
    pub fn validate(&self) -> Result<(), String> {
        if self.return_lag == 0 {
            return Err("metrics.return_lag must be > 0".to_string());
        }
        if self.short_ma_window == 0 {
            return Err("metrics.short_ma_window must be > 0".to_string());
        }
        if self.long_ma_window == 0 {
            return Err("metrics.long_ma_window must be > 0".to_string());
        }
        Ok(())
    }
}

/// Derived values for one row. `None` means the trailing window was not
/// yet full at that row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricRow {
    pub returns: Option<f64>,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
}

/// A price series augmented with one `MetricRow` per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    pub series: PriceSeries,
    pub rows: Vec<MetricRow>,
    pub windows: MetricWindows,
}

impl DerivedMetrics {
    pub fn ticker(&self) -> &str {
        &self.series.ticker
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        self.series.bars.get(index).map(|b| b.date)
    }

    pub fn value(&self, column: Column, index: usize) -> Option<f64> {
        let bar = self.series.bars.get(index)?;
        let row = self.rows.get(index)?;
        match column {
            Column::Returns => row.returns,
            Column::ShortMa => row.short_ma,
            Column::LongMa => row.long_ma,
            raw => Some(raw_value(bar, raw)),
        }
    }

    pub fn column(&self, column: Column) -> Vec<Option<f64>> {
        (0..self.len()).map(|i| self.value(column, i)).collect()
    }
}

/// Value of a non-derived column. Derived columns have no raw value and
/// read as `NaN`.
pub fn raw_value(bar: &PriceBar, column: Column) -> f64 {
    match column {
        Column::Open => bar.open,
        Column::High => bar.high,
        Column::Low => bar.low,
        Column::Close => bar.close,
        Column::AdjClose => bar.adj_close,
        Column::Volume => bar.volume as f64,
        Column::Returns | Column::ShortMa | Column::LongMa => f64::NAN,
    }
}

pub fn derive(series: PriceSeries) -> DerivedMetrics {
    derive_with(series, MetricWindows::default())
}

pub fn derive_with(series: PriceSeries, windows: MetricWindows) -> DerivedMetrics {
    let mut returns = PctChange::new(windows.return_lag);
    let mut short_ma = RollingMean::new(windows.short_ma_window);
    let mut long_ma = RollingMean::new(windows.long_ma_window);

    let rows = series
        .adj_closes()
        .map(|px| MetricRow {
            returns: returns.push(px),
            short_ma: short_ma.push(px),
            long_ma: long_ma.push(px),
        })
        .collect();

    DerivedMetrics {
        series,
        rows,
        windows,
    }
}
