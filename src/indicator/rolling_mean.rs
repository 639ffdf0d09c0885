/// Trailing-window arithmetic mean over a fixed number of observations.
///
/// Values are held in a ring buffer so each push is O(1). No value is
/// produced until the window has been filled once.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    slots: Vec<f64>,
    next: usize,
    filled: usize,
    sum: f64,
}

impl RollingMean {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "rolling window must be > 0");
        Self {
            window,
            slots: vec![0.0; window],
            next: 0,
            filled: 0,
            sum: 0.0,
        }
    }

    /// Add an observation and return the mean of the last `window` values
    /// once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.is_full() {
            self.sum -= self.slots[self.next];
        } else {
            self.filled += 1;
        }
        self.slots[self.next] = value;
        self.sum += value;
        self.next = (self.next + 1) % self.window;
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        self.is_full().then(|| self.sum / self.window as f64)
    }

    pub fn is_full(&self) -> bool {
        self.filled >= self.window
    }

    pub fn window(&self) -> usize {
        self.window
    }
}
