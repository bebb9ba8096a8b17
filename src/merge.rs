//! Result normalization
//!
//! Turns a run's `PartialResults` into the fixed `NormalizedResult` schema.
//! Pure: no I/O, and the same accumulator always yields the same document.

use crate::models::{NormalizedResult, PartialResults, WebItem, RESULT_TYPE};

/// Number of web results kept in `web_top`
pub const WEB_TOP_N: usize = 5;

/// First `k` items in collaborator order; absent or `k == 0` yields empty.
pub fn top_results(items: Option<&[WebItem]>, k: usize) -> Vec<WebItem> {
    match items {
        Some(items) => items.iter().take(k).cloned().collect(),
        None => Vec::new(),
    }
}

pub fn merge(partial: &PartialResults, query: &str) -> NormalizedResult {
    let company_profile = partial
        .profile_text
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string();

    NormalizedResult {
        result_type: RESULT_TYPE.to_string(),
        query: query.to_string(),
        web_top: top_results(partial.web_items.as_deref(), WEB_TOP_N),
        prices: partial.quotes.clone().unwrap_or_default(),
        company_profile,
        profile_sources: partial.profile_sources.clone().unwrap_or_default(),
        errors: partial.task_errors.clone(),
    }
}
