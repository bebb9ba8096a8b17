//! Collaborator traits
//!
//! The orchestrator talks to external providers only through these narrow,
//! synchronous interfaces. Calls run on the blocking worker pool, so
//! implementations may block on network I/O or on the runtime handle.

use crate::error::CollaboratorError;
use crate::models::{QuoteResult, WebItem};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub mod http;
pub use http::{JsonApiClient, TavilyClient, YahooQuoteSource};

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// Generic web search
pub trait WebSearch: Send + Sync {
    fn search(
        &self,
        query: &str,
        top_k: usize,
        timeout: Duration,
    ) -> CollaboratorResult<Vec<WebItem>>;
}

/// Batch quote lookup. Per-symbol failures come back as
/// `QuoteResult::Failed`; an `Err` means the whole call failed.
pub trait QuoteCollaborator: Send + Sync {
    fn fetch(&self, symbols: &[String], timeout: Duration) -> CollaboratorResult<Vec<QuoteResult>>;
}

/// Company profile lookup. Fails soft: never returns an error.
pub trait ProfileCollaborator: Send + Sync {
    fn fetch_profile(&self, query: &str) -> (String, Vec<String>);
}

/// Pulls readable body text out of one or more pages.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, urls: &[String], timeout: Duration) -> CollaboratorResult<String>;
}

/// Compresses text. The response shape is provider-specific; callers read it
/// through `profile::response_text`.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> CollaboratorResult<serde_json::Value>;
}

/// Single-symbol quote source
pub trait SymbolQuoteSource: Send + Sync {
    /// Returns `(price, currency)` for an already-normalized symbol.
    fn quote(&self, symbol: &str, timeout: Duration) -> CollaboratorResult<(f64, String)>;
}

/// Adapts a `SymbolQuoteSource` into a `QuoteCollaborator`, turning each
/// symbol's failure into a `QuoteResult::Failed` entry.
pub struct PerSymbolQuotes {
    source: Arc<dyn SymbolQuoteSource>,
}

impl PerSymbolQuotes {
    pub fn new(source: Arc<dyn SymbolQuoteSource>) -> Self {
        Self { source }
    }
}

impl QuoteCollaborator for PerSymbolQuotes {
    fn fetch(&self, symbols: &[String], timeout: Duration) -> CollaboratorResult<Vec<QuoteResult>> {
        let quotes = symbols
            .iter()
            .map(|symbol| match self.source.quote(symbol, timeout) {
                Ok((price, currency)) => QuoteResult::priced(symbol.as_str(), price, currency),
                Err(e) => {
                    debug!(symbol = %symbol, error = %e, "Quote lookup failed for symbol");
                    QuoteResult::failed(symbol.as_str(), e.to_string())
                }
            })
            .collect();

        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakySource;

    impl SymbolQuoteSource for FlakySource {
        fn quote(&self, symbol: &str, _timeout: Duration) -> CollaboratorResult<(f64, String)> {
            match symbol {
                "AAPL" => Ok((150.2, "USD".to_string())),
                "005930.KS" => Ok((71000.0, "KRW".to_string())),
                other => Err(CollaboratorError::Malformed(format!("no price for {}", other))),
            }
        }
    }

    #[test]
    fn test_per_symbol_failures_become_data() {
        let quotes = PerSymbolQuotes::new(Arc::new(FlakySource));
        let symbols = vec!["AAPL".to_string(), "NOPE".to_string(), "005930.KS".to_string()];

        let result = quotes.fetch(&symbols, Duration::from_secs(1)).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0], QuoteResult::priced("AAPL", 150.2, "USD"));
        assert!(result[1].is_failed());
        assert_eq!(result[1].symbol(), "NOPE");
        assert_eq!(result[2], QuoteResult::priced("005930.KS", 71000.0, "KRW"));
    }

    #[test]
    fn test_empty_symbol_list_yields_empty_quotes() {
        let quotes = PerSymbolQuotes::new(Arc::new(FlakySource));
        let result = quotes.fetch(&[], Duration::from_secs(1)).unwrap();
        assert!(result.is_empty());
    }
}
