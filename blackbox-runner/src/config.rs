//! Pipeline configuration
//!
//! Defines stage sizes, concurrency, deadlines and the partial-failure
//! policy for e-book generation.

use blackbox_client::GenerationOptions;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What to do when some (but not all) tasks of a phase fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Continue with the surviving tasks, dropping failed indices
    #[default]
    BestEffort,
    /// Abort the stage on the first failed task
    AllOrNothing,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" => Ok(Self::BestEffort),
            "all-or-nothing" | "all_or_nothing" => Ok(Self::AllOrNothing),
            other => anyhow::bail!(
                "unknown failure policy '{}' (expected best-effort or all-or-nothing)",
                other
            ),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestEffort => write!(f, "best-effort"),
            Self::AllOrNothing => write!(f, "all-or-nothing"),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of chapter titles to generate (K)
    pub title_count: usize,

    /// Maximum concurrent generation calls within a phase
    pub concurrency_limit: usize,

    /// Deadline for each of the title and content phases
    pub phase_timeout: Duration,

    /// Deadline for the single introduction call
    pub introduction_timeout: Duration,

    pub failure_policy: FailurePolicy,

    /// Collection the finished document is written to
    pub products_collection: String,

    pub introduction_options: GenerationOptions,
    pub title_options: GenerationOptions,
    pub content_options: GenerationOptions,
}

impl PipelineConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            title_count: 10,
            concurrency_limit: 5,
            phase_timeout: Duration::from_secs(30),
            introduction_timeout: Duration::from_secs(30),
            failure_policy: FailurePolicy::BestEffort,
            products_collection: "products".to_string(),
            introduction_options: GenerationOptions::new(1.0, 512),
            title_options: GenerationOptions::new(1.0, 48),
            content_options: GenerationOptions::new(1.0, 2048),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - TITLE_COUNT (default: 10)
    /// - NUM_WORKERS (default: 5)
    /// - PHASE_TIMEOUT_SECS (default: 30)
    /// - INTRODUCTION_TIMEOUT_SECS (default: 30)
    /// - FAILURE_POLICY (best-effort | all-or-nothing, default: best-effort)
    /// - PRODUCTS_COLLECTION (default: products)
    /// - OPENAI_TEMPERATURE (default: 1.0)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, rejecting values that do not parse
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::new();

        if let Some(title_count) = parse_var::<usize>(&lookup, "TITLE_COUNT")? {
            config.title_count = title_count;
        }

        if let Some(workers) = parse_var::<usize>(&lookup, "NUM_WORKERS")? {
            config.concurrency_limit = workers;
        }

        if let Some(timeout) = parse_var::<u64>(&lookup, "PHASE_TIMEOUT_SECS")? {
            config.phase_timeout = Duration::from_secs(timeout);
        }

        if let Some(timeout) = parse_var::<u64>(&lookup, "INTRODUCTION_TIMEOUT_SECS")? {
            config.introduction_timeout = Duration::from_secs(timeout);
        }

        if let Some(policy) = lookup("FAILURE_POLICY") {
            config.failure_policy = policy.parse()?;
        }

        if let Some(collection) = lookup("PRODUCTS_COLLECTION") {
            config.products_collection = collection;
        }

        if let Some(temperature) = parse_var::<f32>(&lookup, "OPENAI_TEMPERATURE")? {
            config.introduction_options.temperature = temperature;
            config.title_options.temperature = temperature;
            config.content_options.temperature = temperature;
        }

        Ok(config)
    }

    pub fn with_title_count(mut self, title_count: usize) -> Self {
        self.title_count = title_count;
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_phase_timeout(mut self, timeout: Duration) -> Self {
        self.phase_timeout = timeout;
        self
    }

    pub fn with_introduction_timeout(mut self, timeout: Duration) -> Self {
        self.introduction_timeout = timeout;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Concurrency limit for a phase of `tasks` tasks
    pub fn effective_concurrency(&self, tasks: usize) -> usize {
        self.concurrency_limit.min(tasks).max(1)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.title_count == 0 {
            anyhow::bail!("title_count must be greater than 0");
        }

        if self.concurrency_limit == 0 {
            anyhow::bail!("concurrency_limit must be greater than 0");
        }

        if self.phase_timeout.is_zero() {
            anyhow::bail!("phase_timeout must be greater than 0");
        }

        if self.introduction_timeout.is_zero() {
            anyhow::bail!("introduction_timeout must be greater than 0");
        }

        if self.products_collection.trim().is_empty() {
            anyhow::bail!("products_collection cannot be empty");
        }

        for options in [
            &self.introduction_options,
            &self.title_options,
            &self.content_options,
        ] {
            if !(0.0..=2.0).contains(&options.temperature) {
                anyhow::bail!("temperature must be between 0 and 2");
            }
            if options.max_tokens == 0 {
                anyhow::bail!("max_tokens must be greater than 0");
            }
        }

        Ok(())
    }
}

/// Parses `key` when it is set; an unparsable value is an error, not a default
pub fn parse_var<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
) -> anyhow::Result<Option<T>> {
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => anyhow::bail!("{} must be a number, got '{}'", key, raw),
        },
        None => Ok(None),
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
