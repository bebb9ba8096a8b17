//! Runtime configuration
//!
//! Read from environment variables. Binaries call `dotenv::dotenv()` first so
//! a local `.env` file is honoured.

use crate::error::OrchestrationError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_WEB_TOPK: usize = 6;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_MAX_WORKERS: usize = 4;
pub const DEFAULT_PROFILE_SOURCES: usize = 3;
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day1Config {
    /// Results requested from the web search provider (merge keeps the top 5)
    pub web_top_k: usize,
    pub request_timeout_secs: u64,
    pub max_workers: usize,
    pub profile_sources: usize,
    pub tavily_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub port: u16,
}

impl Default for Day1Config {
    fn default() -> Self {
        Self {
            web_top_k: DEFAULT_WEB_TOPK,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_workers: DEFAULT_MAX_WORKERS,
            profile_sources: DEFAULT_PROFILE_SOURCES,
            tavily_api_key: None,
            gemini_api_key: None,
            port: DEFAULT_PORT,
        }
    }
}

impl Day1Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            web_top_k: parse_or(&lookup, "DAY1_WEB_TOPK", defaults.web_top_k)?,
            request_timeout_secs: parse_or(
                &lookup,
                "DAY1_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            max_workers: parse_or(&lookup, "DAY1_MAX_WORKERS", defaults.max_workers)?,
            profile_sources: parse_or(&lookup, "DAY1_PROFILE_SOURCES", defaults.profile_sources)?,
            tavily_api_key: non_empty(lookup("TAVILY_API_KEY")),
            gemini_api_key: non_empty(lookup("GEMINI_API_KEY")),
            port: match lookup("PORT").or_else(|| lookup("API_PORT")) {
                Some(raw) => parse_value("PORT", &raw)?,
                None => defaults.port,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(OrchestrationError::ConfigError(
                "DAY1_MAX_WORKERS must be greater than 0".to_string(),
            ));
        }
        if self.web_top_k == 0 {
            return Err(OrchestrationError::ConfigError(
                "DAY1_WEB_TOPK must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(OrchestrationError::ConfigError(
                "DAY1_REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        OrchestrationError::ConfigError(format!("{} has invalid value '{}'", key, raw))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
