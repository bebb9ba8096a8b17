//! Gemini API client used as the profile summarizer
//!
//! Uses a long-lived reqwest::Client for connection pooling; calls run on the
//! orchestrator's worker pool and are driven on the ambient runtime.

use crate::error::CollaboratorError;
use crate::tools::http::{block_on, clip_error_body};
use crate::tools::{CollaboratorResult, Summarizer};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: GEMINI_URL.to_string(),
            timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a prompt and return the raw response document
    pub fn generate(&self, prompt: &str) -> CollaboratorResult<Value> {
        if self.api_key.is_empty() {
            return Err(CollaboratorError::NotConfigured("GEMINI_API_KEY".to_string()));
        }

        block_on(self.generate_async(prompt))?
    }

    async fn generate_async(&self, prompt: &str) -> CollaboratorResult<Value> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 512,
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
        };

        info!("Calling Gemini API");

        let response = self
            .client
            .post(&self.base_url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let e = CollaboratorError::from(e);
                warn!("Gemini API request failed: {}", e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = clip_error_body(&response.text().await.unwrap_or_default());
            warn!("Gemini API error response: {}", error_text);
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CollaboratorError::Malformed(format!("Gemini parse error: {}", e)))
    }
}

impl Summarizer for GeminiClient {
    fn summarize(&self, text: &str) -> CollaboratorResult<Value> {
        self.generate(&build_summary_prompt(text))
    }
}

const SYSTEM_PROMPT: &str = "You are a financial analyst writing short, factual company overviews.";

fn build_summary_prompt(text: &str) -> String {
    format!(
        r#"Summarize the company described below in 3 to 5 sentences.
Cover what the company does, its main products or segments, and where it operates.
Do not speculate and do not give investment advice.

SOURCE TEXT:
---
{}
---

SUMMARY:"#,
        text
    )
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::http::MAX_ERROR_BODY;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    /// Accepts only `x-goog-api-key: gm-test` and never a key in the query
    async fn serve_gemini() -> String {
        let router = Router::new().route(
            "/generate",
            post(|headers: HeaderMap, uri: Uri| async move {
                let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
                if key != Some("gm-test") || uri.query().is_some() {
                    return (StatusCode::FORBIDDEN, "denied ".repeat(100)).into_response();
                }
                let part = json!({"text": "Apple designs consumer electronics."});
                Json(json!({"candidates": [{"content": {"parts": [part]}}]})).into_response()
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/generate", addr)
    }

    #[test]
    fn test_request_serialization() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_summary_prompt("Apple designs consumer electronics."),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 512,
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
        };

        let json = serde_json::to_string(&request);
        assert!(json.is_ok());
        assert!(json.unwrap().contains("Apple designs consumer electronics."));
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let client = GeminiClient::new(String::new(), Duration::from_secs(1)).unwrap();
        let err = client.summarize("some text").unwrap_err();
        assert_eq!(err, CollaboratorError::NotConfigured("GEMINI_API_KEY".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_key_sent_in_header() {
        let url = serve_gemini().await;
        let client = GeminiClient::new("gm-test".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(url);

        let response = tokio::task::spawn_blocking(move || client.summarize("Apple Inc."))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            crate::profile::response_text(&response),
            "Apple designs consumer electronics."
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rejected_key_status_body_is_clipped() {
        let url = serve_gemini().await;
        let client = GeminiClient::new("wrong".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(url);

        let err = tokio::task::spawn_blocking(move || client.summarize("Apple Inc."))
            .await
            .unwrap()
            .unwrap_err();

        match err {
            CollaboratorError::Status { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body.chars().count(), MAX_ERROR_BODY);
                assert!(!body.contains("wrong"));
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }
}
