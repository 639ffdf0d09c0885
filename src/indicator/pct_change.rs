use std::collections::VecDeque;

/// Fractional change against the value `lag` observations earlier:
/// `x[t] / x[t - lag] - 1`.
#[derive(Debug, Clone)]
pub struct PctChange {
    lag: usize,
    history: VecDeque<f64>,
}

impl PctChange {
    pub fn new(lag: usize) -> Self {
        assert!(lag > 0, "pct change lag must be > 0");
        Self {
            lag,
            history: VecDeque::with_capacity(lag + 1),
        }
    }

    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.history.push_back(value);
        if self.history.len() <= self.lag {
            return None;
        }
        let base = self.history.pop_front()?;
        Some(value / base - 1.0)
    }

    pub fn lag(&self) -> usize {
        self.lag
    }
}
