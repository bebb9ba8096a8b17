//! Lookup orchestrator
//!
//! PLAN -> FAN OUT (web | stock | profile) -> JOIN -> MERGE
//!
//! Each submitted lookup runs on the blocking pool, bounded by a semaphore
//! sized to `max_workers`. Every task carries its `TaskName` back through the
//! join, so outcomes are mapped by tag rather than by completion order. A
//! failing or panicking collaborator becomes a `TaskError`; only a fault of
//! the pool itself leaves `run` as an `Err`.

use crate::classifier::normalize_symbol;
use crate::config::Day1Config;
use crate::error::{CollaboratorError, OrchestrationError};
use crate::gemini::GeminiClient;
use crate::merge::merge;
use crate::models::{
    ExecutionPlan, NormalizedResult, PartialResults, QuoteResult, TaskError, TaskName, WebItem,
};
use crate::profile::ProfileLookup;
use crate::tools::{
    CollaboratorResult, JsonApiClient, PerSymbolQuotes, ProfileCollaborator, QuoteCollaborator,
    Summarizer, TavilyClient, WebSearch, YahooQuoteSource,
};
use crate::Result;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub web_top_k: usize,
    pub request_timeout: Duration,
    pub max_workers: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&Day1Config::default())
    }
}

impl From<&Day1Config> for OrchestratorSettings {
    fn from(config: &Day1Config) -> Self {
        Self {
            web_top_k: config.web_top_k,
            request_timeout: config.request_timeout(),
            max_workers: config.max_workers,
        }
    }
}

/// One unit of fanned-out work, owning everything it needs to run.
enum LookupTask {
    Web {
        search: Arc<dyn WebSearch>,
        query: String,
        top_k: usize,
        timeout: Duration,
    },
    Stock {
        quotes: Arc<dyn QuoteCollaborator>,
        symbols: Vec<String>,
        timeout: Duration,
    },
    Profile {
        profile: Arc<dyn ProfileCollaborator>,
        query: String,
    },
}

enum TaskOutput {
    Web(Vec<WebItem>),
    Stock(Vec<QuoteResult>),
    Profile { text: String, sources: Vec<String> },
}

/// What comes back through the join: the tag plus the outcome
struct TaskOutcome {
    name: TaskName,
    outcome: CollaboratorResult<TaskOutput>,
    elapsed_ms: u64,
}

impl LookupTask {
    fn name(&self) -> TaskName {
        match self {
            LookupTask::Web { .. } => TaskName::Web,
            LookupTask::Stock { .. } => TaskName::Stock,
            LookupTask::Profile { .. } => TaskName::Profile,
        }
    }

    fn execute(self) -> CollaboratorResult<TaskOutput> {
        match self {
            LookupTask::Web {
                search,
                query,
                top_k,
                timeout,
            } => search.search(&query, top_k, timeout).map(TaskOutput::Web),
            LookupTask::Stock {
                quotes,
                symbols,
                timeout,
            } => quotes.fetch(&symbols, timeout).map(TaskOutput::Stock),
            LookupTask::Profile { profile, query } => {
                let (text, sources) = profile.fetch_profile(&query);
                Ok(TaskOutput::Profile { text, sources })
            }
        }
    }

    /// Runs the task, converting a panic into a task fault.
    fn run_caught(self) -> TaskOutcome {
        let name = self.name();
        let start = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute()))
            .unwrap_or_else(|payload| Err(CollaboratorError::Panicked(panic_message(payload))));

        TaskOutcome {
            name,
            outcome,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Writes one task's outcome into its own field(s). Each field is written once.
fn record(partial: &mut PartialResults, name: TaskName, outcome: CollaboratorResult<TaskOutput>) {
    match outcome {
        Ok(TaskOutput::Web(items)) => {
            debug_assert!(partial.web_items.is_none());
            partial.web_items = Some(items);
        }
        Ok(TaskOutput::Stock(quotes)) => {
            debug_assert!(partial.quotes.is_none());
            partial.quotes = Some(quotes);
        }
        Ok(TaskOutput::Profile { text, sources }) => {
            debug_assert!(partial.profile_text.is_none());
            partial.profile_text = Some(text);
            partial.profile_sources = Some(sources);
        }
        Err(e) => partial.task_errors.push(TaskError {
            task_name: name,
            kind: e.kind().to_string(),
            message: e.to_string(),
        }),
    }
}

/// Fans a query out to the planned lookups and merges what comes back
pub struct Orchestrator {
    web: Arc<dyn WebSearch>,
    quotes: Arc<dyn QuoteCollaborator>,
    profile: Arc<dyn ProfileCollaborator>,
    settings: OrchestratorSettings,
    pool: Arc<Semaphore>,
}

impl Orchestrator {
    pub fn new(
        web: Arc<dyn WebSearch>,
        quotes: Arc<dyn QuoteCollaborator>,
        profile: Arc<dyn ProfileCollaborator>,
        settings: OrchestratorSettings,
    ) -> Self {
        let pool = Arc::new(Semaphore::new(settings.max_workers.max(1)));

        Self {
            web,
            quotes,
            profile,
            settings,
            pool,
        }
    }

    /// Wires the HTTP-backed providers from configuration.
    pub fn from_config(config: &Day1Config) -> Result<Self> {
        config.validate()?;

        let timeout = config.request_timeout();
        let http = JsonApiClient::new()?;

        let tavily = Arc::new(TavilyClient::new(http.clone(), config.tavily_api_key.clone()));
        let quotes = Arc::new(PerSymbolQuotes::new(Arc::new(YahooQuoteSource::new(http))));

        let summarizer: Option<Arc<dyn Summarizer>> = match &config.gemini_api_key {
            Some(key) => {
                let gemini = GeminiClient::new(key.clone(), timeout)?;
                Some(Arc::new(gemini) as Arc<dyn Summarizer>)
            }
            None => {
                info!("GEMINI_API_KEY not set, company profiles will not be summarized");
                None
            }
        };

        if config.tavily_api_key.is_none() {
            warn!("TAVILY_API_KEY not set, web and profile lookups will fail");
        }

        let profile = Arc::new(ProfileLookup::new(
            tavily.clone(),
            tavily.clone(),
            summarizer,
            config.profile_sources,
            timeout,
        ));

        Ok(Self::new(tavily, quotes, profile, OrchestratorSettings::from(config)))
    }

    /// Run every lookup the plan asks for and return the merged document.
    ///
    /// Collaborator faults are recorded in `errors`; the only `Err` is a
    /// `SchedulingError` from the worker pool.
    pub async fn run(&self, query: &str, plan: &ExecutionPlan) -> Result<NormalizedResult> {
        let run_id = Uuid::new_v4();
        let start_time = Instant::now();

        info!(
            run_id = %run_id,
            query = %query,
            run_web = plan.run_web,
            run_quotes = plan.run_quotes,
            instruments = plan.instrument_ids.len(),
            "Orchestrator: starting run"
        );

        let tasks = self.plan_tasks(query, plan);
        let mut partial = PartialResults::new();

        if tasks.is_empty() {
            debug!(run_id = %run_id, "No lookups planned");
            return Ok(merge(&partial, query));
        }

        // === FAN OUT ===
        let mut join_set = JoinSet::new();

        for task in tasks {
            let permit = self.pool.clone().acquire_owned().await.map_err(|e| {
                OrchestrationError::SchedulingError(format!("worker pool closed: {}", e))
            })?;

            debug!(run_id = %run_id, task = %task.name(), "Submitting task");

            join_set.spawn_blocking(move || {
                let _permit = permit;
                task.run_caught()
            });
        }

        // === JOIN ===
        while let Some(joined) = join_set.join_next().await {
            let TaskOutcome {
                name,
                outcome,
                elapsed_ms,
            } = joined.map_err(|e| {
                OrchestrationError::SchedulingError(format!("task did not complete: {}", e))
            })?;

            match &outcome {
                Ok(_) => debug!(run_id = %run_id, task = %name, elapsed_ms, "Task succeeded"),
                Err(e) => warn!(
                    run_id = %run_id,
                    task = %name,
                    elapsed_ms,
                    kind = e.kind(),
                    error = %e,
                    "Task failed"
                ),
            }

            record(&mut partial, name, outcome);
        }

        // === MERGE ===
        let result = merge(&partial, query);

        info!(
            run_id = %run_id,
            web_top = result.web_top.len(),
            prices = result.prices.len(),
            errors = result.errors.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Orchestrator: run complete"
        );

        Ok(result)
    }

    fn plan_tasks(&self, query: &str, plan: &ExecutionPlan) -> Vec<LookupTask> {
        let mut tasks = Vec::with_capacity(3);
        let timeout = self.settings.request_timeout;

        if plan.run_web {
            tasks.push(LookupTask::Web {
                search: Arc::clone(&self.web),
                query: query.to_string(),
                top_k: self.settings.web_top_k,
                timeout,
            });
        }

        if plan.run_quotes {
            tasks.push(LookupTask::Stock {
                quotes: Arc::clone(&self.quotes),
                symbols: plan.instrument_ids.iter().map(|s| normalize_symbol(s)).collect(),
                timeout,
            });
        }

        if !plan.instrument_ids.is_empty() || ProfileLookup::looks_like_identifier(query) {
            tasks.push(LookupTask::Profile {
                profile: Arc::clone(&self.profile),
                query: query.to_string(),
            });
        }

        tasks
    }
}
