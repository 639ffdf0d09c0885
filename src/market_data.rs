use std::future::Future;

use crate::error::AppError;
use crate::model::balance_sheet::BalanceSheet;
use crate::model::date_range::DateRange;
use crate::model::price::PriceSeries;

/// Source of daily prices and balance sheets for a ticker.
pub trait MarketDataSource: Send + Sync + 'static {
    fn fetch_prices(
        &self,
        ticker: &str,
        range: &DateRange,
    ) -> impl Future<Output = Result<PriceSeries, AppError>> + Send;

    fn fetch_balance_sheet(
        &self,
        ticker: &str,
    ) -> impl Future<Output = Result<BalanceSheet, AppError>> + Send;
}
