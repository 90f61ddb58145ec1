use dashboard_core::RecordKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level dashboard screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Overview,
    Posts,
    Analytics,
    Costs,
}

/// What a view reads on activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSpec {
    pub kind: RecordKind,
    pub order_by: &'static str,
    pub ascending: bool,
}

impl View {
    pub const ALL: [View; 4] = [View::Overview, View::Posts, View::Analytics, View::Costs];

    pub fn fetch_spec(&self) -> FetchSpec {
        let (kind, order_by, ascending) = match self {
            View::Overview => (RecordKind::Content, "roi_weight", false),
            View::Posts => (RecordKind::Content, "processed_at", false),
            View::Analytics => (RecordKind::Content, "created_utc", true),
            View::Costs => (RecordKind::Cost, "month", true),
        };
        FetchSpec {
            kind,
            order_by,
            ascending,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Posts => "Posts",
            View::Analytics => "Analytics",
            View::Costs => "Cost Tracking",
        }
    }

    pub fn loading_message(&self) -> &'static str {
        match self {
            View::Overview => "Loading dashboard data...",
            View::Posts => "Loading posts...",
            View::Analytics => "Loading analytics...",
            View::Costs => "Loading cost data...",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            View::Overview | View::Posts | View::Analytics => {
                "No posts yet. Run the scraper to collect data."
            }
            View::Costs => "No cost data yet. Costs appear once the scraper has processed posts.",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Presentation state of a view after activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    Loading,
    /// No data to show. `notice` explains a failed load.
    Empty {
        message: String,
        notice: Option<String>,
    },
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn empty(message: impl Into<String>) -> Self {
        ViewState::Empty {
            message: message.into(),
            notice: None,
        }
    }

    pub fn failed(message: impl Into<String>, notice: impl Into<String>) -> Self {
        ViewState::Empty {
            message: message.into(),
            notice: Some(notice.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ViewState::Empty { .. })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ViewState::Empty { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            ViewState::Empty { notice, .. } => notice.as_deref(),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ViewState<U> {
        match self {
            ViewState::Loading => ViewState::Loading,
            ViewState::Empty { message, notice } => ViewState::Empty { message, notice },
            ViewState::Ready(value) => ViewState::Ready(f(value)),
        }
    }
}
