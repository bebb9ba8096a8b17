//! Company profile lookup
//!
//! search -> extract -> summarize, failing soft at every step. The result is
//! always `(summary, sources)`; an empty summary means nothing usable was found.

use crate::classifier;
use crate::tools::{ContentExtractor, ProfileCollaborator, Summarizer, WebSearch};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fallback text is clipped to this many characters when no summary is available
const MAX_PROFILE_CHARS: usize = 1200;

pub struct ProfileLookup {
    search: Arc<dyn WebSearch>,
    extractor: Arc<dyn ContentExtractor>,
    summarizer: Option<Arc<dyn Summarizer>>,
    max_sources: usize,
    timeout: Duration,
}

impl ProfileLookup {
    pub fn new(
        search: Arc<dyn WebSearch>,
        extractor: Arc<dyn ContentExtractor>,
        summarizer: Option<Arc<dyn Summarizer>>,
        max_sources: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            search,
            extractor,
            summarizer,
            max_sources,
            timeout,
        }
    }

    pub fn looks_like_identifier(s: &str) -> bool {
        classifier::looks_like_identifier(s)
    }

    /// Never fails; returns `("", [])` when nothing could be fetched.
    pub fn lookup(&self, query: &str) -> (String, Vec<String>) {
        let search_query = format!("{} company profile overview", query.trim());

        let items = match self.search.search(&search_query, self.max_sources, self.timeout) {
            Ok(items) => items,
            Err(e) => {
                warn!(query = %query, error = %e, "Profile search failed");
                return (String::new(), Vec::new());
            }
        };

        let sources: Vec<String> = items
            .iter()
            .map(|item| item.url.trim().to_string())
            .filter(|url| !url.is_empty())
            .take(self.max_sources)
            .collect();

        if sources.is_empty() {
            debug!(query = %query, "Profile search returned no sources");
            return (String::new(), Vec::new());
        }

        let body = match self.extractor.extract(&sources, self.timeout) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                debug!(query = %query, "Extraction returned no text, using snippets");
                snippet_text(&items)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Profile extraction failed, using snippets");
                snippet_text(&items)
            }
        };

        let summary = self.summarize(&body);
        let text = if summary.is_empty() { clip(&body, MAX_PROFILE_CHARS) } else { summary };

        (text, sources)
    }

    fn summarize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let Some(summarizer) = self.summarizer.as_ref() else {
            debug!("No summarizer configured, skipping summary");
            return String::new();
        };

        match summarizer.summarize(text) {
            Ok(response) => response_text(&response),
            Err(e) => {
                warn!(error = %e, "Profile summarization failed");
                String::new()
            }
        }
    }
}

impl ProfileCollaborator for ProfileLookup {
    fn fetch_profile(&self, query: &str) -> (String, Vec<String>) {
        self.lookup(query)
    }
}

/// Extracts text from a summarizer response of unknown but bounded shape.
///
/// - a JSON string is returned as-is
/// - an object with a non-empty string `text` field yields that field
/// - a Gemini-style `candidates[0].content.parts[*].text` is concatenated
/// - `null` yields ""
/// - anything else falls back to its JSON rendering
///
/// The result is trimmed.
pub fn response_text(response: &Value) -> String {
    let text = match response {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(text) = map.get("text").and_then(Value::as_str).filter(|t| !t.is_empty()) {
                text.to_string()
            } else if let Some(text) = candidate_text(response) {
                text
            } else {
                response.to_string()
            }
        }
        other => other.to_string(),
    };

    text.trim().to_string()
}

fn candidate_text(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn snippet_text(items: &[crate::models::WebItem]) -> String {
    items
        .iter()
        .map(|item| item.snippet.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn clip(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}
