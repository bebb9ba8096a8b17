//! HTTP-backed collaborators
//!
//! Thin wrappers over the search/extract and quote providers. The collaborator
//! traits are synchronous and run on the blocking pool, so each call drives
//! its request on the ambient tokio runtime with `block_on`.
//! They only translate transport and shape problems into `CollaboratorError`;
//! fail-soft policy lives in the orchestrator and in `ProfileLookup`.

use super::{CollaboratorResult, ContentExtractor, SymbolQuoteSource, WebSearch};
use crate::error::CollaboratorError;
use crate::models::WebItem;
use crate::Result;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

const TAVILY_BASE_URL: &str = "https://api.tavily.com";
const YAHOO_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = concat!("day1-lookup/", env!("CARGO_PKG_VERSION"));

/// Maximum characters of an error body kept in a `Status` fault
pub(crate) const MAX_ERROR_BODY: usize = 256;

/// Drives a provider request to completion from a blocking worker thread.
///
/// Must not be called from inside an async task; collaborators only run
/// under `spawn_blocking`.
pub(crate) fn block_on<F: Future>(future: F) -> CollaboratorResult<F::Output> {
    let handle = Handle::try_current().map_err(|e| {
        CollaboratorError::Unavailable(format!("no async runtime for provider call: {}", e))
    })?;

    Ok(handle.block_on(future))
}

pub(crate) fn clip_error_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

/// Connection-pooled JSON client shared by the provider wrappers
#[derive(Clone)]
pub struct JsonApiClient {
    client: Client,
}

impl JsonApiClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    pub fn post_json(
        &self,
        url: &str,
        body: &Value,
        bearer: Option<&str>,
        timeout: Duration,
    ) -> CollaboratorResult<Value> {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .timeout(timeout);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        block_on(self.send(url, request))?
    }

    pub fn get_json(&self, url: &str, timeout: Duration) -> CollaboratorResult<Value> {
        let request = self.client.get(url).timeout(timeout);
        block_on(self.send(url, request))?
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> CollaboratorResult<Value> {
        debug!(url = %url, "Sending provider request");

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body: clip_error_body(&body),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            CollaboratorError::Malformed(format!("Invalid JSON response from {}: {}", url, e))
        })
    }
}

//
// ================= Tavily =================
//

/// Tavily search + extract client
pub struct TavilyClient {
    http: JsonApiClient,
    api_key: Option<String>,
    base_url: String,
}

impl TavilyClient {
    pub fn new(http: JsonApiClient, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: TAVILY_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> CollaboratorResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| CollaboratorError::NotConfigured("TAVILY_API_KEY".to_string()))
    }
}

impl WebSearch for TavilyClient {
    fn search(
        &self,
        query: &str,
        top_k: usize,
        timeout: Duration,
    ) -> CollaboratorResult<Vec<WebItem>> {
        let api_key = self.api_key()?;
        let body = json!({
            "query": query,
            "search_depth": "basic",
            "max_results": top_k,
            "include_answer": false,
            "include_raw_content": false,
        });

        let url = format!("{}/search", self.base_url);
        let response = self.http.post_json(&url, &body, Some(api_key), timeout)?;
        parse_search_results(&response)
    }
}

impl ContentExtractor for TavilyClient {
    fn extract(&self, urls: &[String], timeout: Duration) -> CollaboratorResult<String> {
        if urls.is_empty() {
            return Ok(String::new());
        }

        let api_key = self.api_key()?;
        let body = json!({ "urls": urls });

        let url = format!("{}/extract", self.base_url);
        let response = self.http.post_json(&url, &body, Some(api_key), timeout)?;
        parse_extracted_text(&response)
    }
}

/// `{"results": [{"title", "url", "content"}]}` -> `WebItem`s, provider order kept
fn parse_search_results(response: &Value) -> CollaboratorResult<Vec<WebItem>> {
    let results = response
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            CollaboratorError::Malformed("search response has no 'results' array".to_string())
        })?;

    let field = |item: &Value, key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Ok(results
        .iter()
        .map(|item| WebItem {
            title: field(item, "title"),
            url: field(item, "url"),
            snippet: field(item, "content"),
        })
        .collect())
}

/// Joins the `raw_content` of every extracted page
fn parse_extracted_text(response: &Value) -> CollaboratorResult<String> {
    let results = response
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            CollaboratorError::Malformed("extract response has no 'results' array".to_string())
        })?;

    let text = results
        .iter()
        .filter_map(|page| page.get("raw_content").and_then(Value::as_str))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(text)
}

//
// ================= Yahoo Finance =================
//

/// Yahoo Finance chart endpoint, one request per symbol
pub struct YahooQuoteSource {
    http: JsonApiClient,
    base_url: String,
}

impl YahooQuoteSource {
    pub fn new(http: JsonApiClient) -> Self {
        Self {
            http,
            base_url: YAHOO_CHART_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The symbol is always a single, percent-encoded path segment.
    fn chart_url(&self, symbol: &str) -> CollaboratorResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CollaboratorError::Request(format!("invalid quote base url: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| CollaboratorError::Request("quote base url cannot take a path".into()))?
            .pop_if_empty()
            .push(symbol);

        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", "1d");

        Ok(url)
    }
}

impl SymbolQuoteSource for YahooQuoteSource {
    fn quote(&self, symbol: &str, timeout: Duration) -> CollaboratorResult<(f64, String)> {
        let url = self.chart_url(symbol)?;
        let response = self.http.get_json(url.as_str(), timeout)?;
        parse_chart_quote(&response)
    }
}

fn parse_chart_quote(response: &Value) -> CollaboratorResult<(f64, String)> {
    let chart = response
        .get("chart")
        .ok_or_else(|| CollaboratorError::Malformed("quote response has no 'chart'".to_string()))?;

    if let Some(error) = chart.get("error").filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(CollaboratorError::Unavailable(description));
    }

    let meta = chart
        .get("result")
        .and_then(|r| r.get(0))
        .and_then(|r| r.get("meta"))
        .ok_or_else(|| {
            CollaboratorError::Malformed("quote response has no result metadata".to_string())
        })?;

    let price = meta
        .get("regularMarketPrice")
        .and_then(Value::as_f64)
        .ok_or_else(|| CollaboratorError::Malformed("missing regularMarketPrice".to_string()))?;

    let currency = meta
        .get("currency")
        .and_then(Value::as_str)
        .ok_or_else(|| CollaboratorError::Malformed("missing currency".to_string()))?;

    Ok((price, currency.to_string()))
}
