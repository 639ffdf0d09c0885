use chrono::NaiveDate;

/// One trading day of daily price data.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

/// Daily bars for a single ticker, ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(|b| b.date)
    }

    pub fn adj_closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.adj_close)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, adj_close: f64) -> PriceBar {
        PriceBar {
            date: date.parse().unwrap(),
            open: adj_close,
            high: adj_close,
            low: adj_close,
            close: adj_close,
            adj_close,
            volume: 0,
        }
    }

    #[test]
    fn new_sorts_and_dedups_by_date() {
        let s = PriceSeries::new(
            "AAPL",
            vec![
                bar("2020-01-03", 3.0),
                bar("2020-01-02", 2.0),
                bar("2020-01-03", 9.0),
            ],
        );
        assert_eq!(s.len(), 2);
        assert_eq!(s.first_date(), "2020-01-02".parse().ok());
        assert_eq!(s.last_date(), "2020-01-03".parse().ok());
        assert_eq!(s.adj_closes().collect::<Vec<_>>(), vec![2.0, 3.0]);
    }
}
