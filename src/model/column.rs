use std::fmt;
use std::str::FromStr;

/// A displayable column of the augmented price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
    Returns,
    ShortMa,
    LongMa,
}

/// Columns offered by the data table, in toggle-key order (`1`..`8`).
pub const TABLE_COLUMNS: [Column; 8] = [
    Column::Open,
    Column::High,
    Column::Low,
    Column::AdjClose,
    Column::Volume,
    Column::Returns,
    Column::ShortMa,
    Column::LongMa,
];

pub const DEFAULT_TABLE_COLUMNS: [Column; 2] = [Column::AdjClose, Column::Returns];

/// Columns offered by the single-ticker chart.
pub const CHART_COLUMNS: [Column; 8] = [
    Column::AdjClose,
    Column::Open,
    Column::Volume,
    Column::Low,
    Column::High,
    Column::Returns,
    Column::ShortMa,
    Column::LongMa,
];

/// Raw columns offered by comparison mode.
pub const COMPARE_COLUMNS: [Column; 5] = [
    Column::AdjClose,
    Column::Open,
    Column::Volume,
    Column::Low,
    Column::High,
];

impl Column {
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::AdjClose => "Adj Close",
            Self::Volume => "Volume",
            Self::Returns => "Returns",
            Self::ShortMa => "7 Day Moving Average",
            Self::LongMa => "1 Month Moving Average",
        }
    }

    /// Narrow header for table cells.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::AdjClose => "AdjClose",
            Self::ShortMa => "7D MA",
            Self::LongMa => "1M MA",
            other => other.label(),
        }
    }

    /// Step to the next (or previous) entry of `choices`, wrapping around.
    /// A column outside `choices` snaps to the first entry.
    pub fn cycle(self, choices: &[Column], forward: bool) -> Column {
        let Some(pos) = choices.iter().position(|c| *c == self) else {
            return choices.first().copied().unwrap_or(self);
        };
        let n = choices.len();
        let next = if forward { (pos + 1) % n } else { (pos + n - 1) % n };
        choices[next]
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let col = match key.as_str() {
            "open" => Self::Open,
            "high" => Self::High,
            "low" => Self::Low,
            "close" => Self::Close,
            "adj close" | "adj_close" | "adjclose" => Self::AdjClose,
            "volume" => Self::Volume,
            "returns" | "return" => Self::Returns,
            "7 day moving average" | "short_ma" | "7d ma" => Self::ShortMa,
            "1 month moving average" | "long_ma" | "1m ma" => Self::LongMa,
            _ => return Err(format!("unknown column '{}'", s.trim())),
        };
        Ok(col)
    }
}
