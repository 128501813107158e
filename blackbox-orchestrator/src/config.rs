//! Server configuration
//!
//! Everything the binary needs to wire the pipeline to its vendors.

use blackbox_runner::PipelineConfig;
use blackbox_runner::config::parse_var;
use std::time::Duration;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub bind_addr: String,

    pub port: u16,

    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,

    /// Firestore project; without it documents are kept in memory
    pub firebase_app_id: Option<String>,

    pub firestore_access_token: Option<String>,

    /// Collection standalone introductions are saved to
    pub introductions_collection: String,

    /// Request timeout of the shared HTTP client
    pub upstream_timeout: Duration,

    pub pipeline: PipelineConfig,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - OPENAI_API_KEY (required)
    /// - BIND_ADDR (default: 0.0.0.0)
    /// - PORT (default: 8080)
    /// - OPENAI_BASE_URL (default: https://api.openai.com/v1)
    /// - OPENAI_MODEL (default: gpt-3.5-turbo)
    /// - FIREBASE_APP_ID (optional)
    /// - FIRESTORE_ACCESS_TOKEN (optional)
    /// - INTRODUCTIONS_PRODUCTS_COLLECTION (default: introductions)
    /// - UPSTREAM_HTTP_TIMEOUT_SECS (default: 120)
    ///
    /// Pipeline settings are read by [`PipelineConfig::from_lookup`].
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the server and pipeline settings from `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY must be set"))?;

        let port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got '{}'", port))?,
            None => 8080,
        };

        let upstream_timeout = parse_var::<u64>(&lookup, "UPSTREAM_HTTP_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(120));

        let pipeline = PipelineConfig::from_lookup(&lookup)?;

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            openai_api_key,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            firebase_app_id: lookup("FIREBASE_APP_ID").filter(|id| !id.trim().is_empty()),
            firestore_access_token: lookup("FIRESTORE_ACCESS_TOKEN")
                .filter(|token| !token.trim().is_empty()),
            introductions_collection: lookup("INTRODUCTIONS_PRODUCTS_COLLECTION")
                .unwrap_or_else(|| "introductions".to_string()),
            upstream_timeout,
            pipeline,
        })
    }

    /// Address string for the TCP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.trim().is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.introductions_collection.trim().is_empty() {
            anyhow::bail!("introductions_collection cannot be empty");
        }

        if self.upstream_timeout.is_zero() {
            anyhow::bail!("upstream_timeout must be greater than 0");
        }

        if !self.openai_base_url.starts_with("http://") && !self.openai_base_url.starts_with("https://")
        {
            anyhow::bail!("OPENAI_BASE_URL must start with http:// or https://");
        }

        self.pipeline.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert_eq!(config.firebase_app_id, None);
        assert_eq!(config.introductions_collection, "introductions");
        assert_eq!(config.upstream_timeout, Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("BIND_ADDR", "127.0.0.1"),
            ("PORT", "3000"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("FIREBASE_APP_ID", "my-project"),
            ("FIRESTORE_ACCESS_TOKEN", "token"),
            ("UPSTREAM_HTTP_TIMEOUT_SECS", "15"),
            ("TITLE_COUNT", "6"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr(), "127.0.0.1:3000");
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.firebase_app_id.as_deref(), Some("my-project"));
        assert_eq!(config.firestore_access_token.as_deref(), Some("token"));
        assert_eq!(config.upstream_timeout, Duration::from_secs(15));
        assert_eq!(config.pipeline.title_count, 6);
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(
            Config::from_lookup(lookup(&[("OPENAI_API_KEY", "k"), ("PORT", "http")])).is_err()
        );
        assert!(
            Config::from_lookup(lookup(&[("OPENAI_API_KEY", "k"), ("NUM_WORKERS", "many")])).is_err()
        );
        assert!(
            Config::from_lookup(lookup(&[
                ("OPENAI_API_KEY", "k"),
                ("UPSTREAM_HTTP_TIMEOUT_SECS", "2m")
            ]))
            .is_err()
        );

        let mut config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "k")])).unwrap();
        config.openai_base_url = "api.openai.com".to_string();
        assert!(config.validate().is_err());

        config.openai_base_url = DEFAULT_OPENAI_BASE_URL.to_string();
        config.pipeline.title_count = 0;
        assert!(config.validate().is_err());
    }
}
