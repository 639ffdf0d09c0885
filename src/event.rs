use crate::dashboard::{FetchedData, RenderModel};

#[derive(Debug, Clone)]
pub enum AppEvent {
    RefreshStarted {
        cycle: u64,
        ticker: String,
        reason: RefreshReason,
    },
    Rendered {
        cycle: u64,
        fetched: Option<FetchedData>,
        model: RenderModel,
    },
    /// A cycle still fetching when the next one began; its result is dropped.
    RefreshCancelled {
        cycle: u64,
    },
    LogMessage(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Timer,
    Manual,
    SelectionsChanged,
}

impl RefreshReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Manual => "manual",
            Self::SelectionsChanged => "input",
        }
    }
}
