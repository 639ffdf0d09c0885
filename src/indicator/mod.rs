pub mod pct_change;
pub mod rolling_mean;
