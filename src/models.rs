//! Core data models for the lookup orchestrator

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Plan =================
//

/// Which lookups a single orchestration run should perform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    #[serde(default)]
    pub run_web: bool,
    #[serde(default)]
    pub run_quotes: bool,
    #[serde(default)]
    pub instrument_ids: Vec<String>,
}

impl ExecutionPlan {
    pub fn new(run_web: bool, run_quotes: bool, instrument_ids: Vec<String>) -> Self {
        Self {
            run_web,
            run_quotes,
            instrument_ids,
        }
    }
}

//
// ================= Collaborator Payloads =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Quote for one symbol. A failed symbol is data, not a task failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuoteResult {
    Priced {
        symbol: String,
        price: f64,
        currency: String,
    },
    Failed {
        symbol: String,
        error: String,
    },
}

impl QuoteResult {
    pub fn priced(symbol: impl Into<String>, price: f64, currency: impl Into<String>) -> Self {
        QuoteResult::Priced {
            symbol: symbol.into(),
            price,
            currency: currency.into(),
        }
    }

    pub fn failed(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        QuoteResult::Failed {
            symbol: symbol.into(),
            error: error.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            QuoteResult::Priced { symbol, .. } | QuoteResult::Failed { symbol, .. } => symbol,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QuoteResult::Failed { .. })
    }
}

//
// ================= Task Identity =================
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskName {
    Web,
    Stock,
    Profile,
}

impl TaskName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::Web => "web",
            TaskName::Stock => "stock",
            TaskName::Profile => "profile",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One failed task, recorded instead of propagating the fault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskError {
    pub task_name: TaskName,
    pub kind: String,
    pub message: String,
}

//
// ================= Accumulator =================
//

/// Per-run accumulator. `None` means the task was not submitted or failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialResults {
    pub web_items: Option<Vec<WebItem>>,
    pub quotes: Option<Vec<QuoteResult>>,
    pub profile_text: Option<String>,
    pub profile_sources: Option<Vec<String>>,
    pub task_errors: Vec<TaskError>,
}

impl PartialResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.web_items.is_none()
            && self.quotes.is_none()
            && self.profile_text.is_none()
            && self.profile_sources.is_none()
            && self.task_errors.is_empty()
    }
}

//
// ================= Final Result =================
//

pub const RESULT_TYPE: &str = "day1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    #[serde(rename = "type")]
    pub result_type: String,
    pub query: String,
    pub web_top: Vec<WebItem>,
    pub prices: Vec<QuoteResult>,
    pub company_profile: String,
    pub profile_sources: Vec<String>,
    pub errors: Vec<TaskError>,
}
