use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSheetRow {
    pub item: String,
    /// One value per entry of `BalanceSheet::periods`.
    pub values: Vec<Option<f64>>,
}

/// Annual balance sheet as reported, newest period first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BalanceSheet {
    pub ticker: String,
    pub periods: Vec<NaiveDate>,
    pub rows: Vec<BalanceSheetRow>,
}

impl BalanceSheet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.periods.is_empty()
    }

    pub fn value(&self, item: &str, period: NaiveDate) -> Option<f64> {
        let col = self.periods.iter().position(|p| *p == period)?;
        self.rows
            .iter()
            .find(|r| r.item == item)
            .and_then(|r| r.values.get(col).copied().flatten())
    }
}

/// Compact human-readable amount, e.g. `352.58B`.
pub fn format_amount(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (value / 1e12, "T")
    } else if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    format!("{:.2}{}", scaled, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_amount_scales() {
        assert_eq!(format_amount(352_583_000_000.0), "352.58B");
        assert_eq!(format_amount(-1_500_000.0), "-1.50M");
        assert_eq!(format_amount(12.0), "12.00");
        assert_eq!(format_amount(2.5e12), "2.50T");
    }

    #[test]
    fn value_lookup_by_item_and_period() {
        let p1: NaiveDate = "2023-09-30".parse().unwrap();
        let p2: NaiveDate = "2022-09-30".parse().unwrap();
        let sheet = BalanceSheet {
            ticker: "AAPL".to_string(),
            periods: vec![p1, p2],
            rows: vec![BalanceSheetRow {
                item: "Total Assets".to_string(),
                values: vec![Some(1.0), None],
            }],
        };
        assert_eq!(sheet.value("Total Assets", p1), Some(1.0));
        assert_eq!(sheet.value("Total Assets", p2), None);
        assert_eq!(sheet.value("Cash", p1), None);
        assert!(!sheet.is_empty());
    }
}
