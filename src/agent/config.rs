//! Research configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ResearchError;

/// Default model for all pipeline stages.
const DEFAULT_MODEL: &str = "gpt-4.1";
/// Default maximum tokens per completion.
const DEFAULT_MAX_TOKENS: u32 = 10_000;
/// Default maximum concurrent evidence fetches.
const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Default web search timeout in seconds, scoped per sub-question.
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;

/// Configuration for the research pipeline.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Default model for every model-invoking stage.
    pub model: String,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Maximum concurrent evidence fetches in the gathering stage.
    pub max_concurrency: usize,
    /// Timeout for a single web search call.
    pub search_timeout: Duration,
    /// Directory containing prompt template files.
    ///
    /// When set, the pipeline loads prompt templates from markdown files
    /// in this directory, falling back to compiled-in defaults for any
    /// missing files.
    pub prompt_dir: Option<PathBuf>,
}

impl ResearchConfig {
    /// Creates a new builder for `ResearchConfig`.
    #[must_use]
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, ResearchError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`ResearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct ResearchConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    max_concurrency: Option<usize>,
    search_timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

impl ResearchConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("DOSSIER_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("DOSSIER_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("DOSSIER_BASE_URL"))
                .ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("DOSSIER_MODEL").ok();
        }
        if self.max_tokens.is_none() {
            self.max_tokens = std::env::var("DOSSIER_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.max_concurrency.is_none() {
            self.max_concurrency = std::env::var("DOSSIER_GATHER_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.search_timeout.is_none() {
            self.search_timeout = std::env::var("DOSSIER_SEARCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("DOSSIER_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the maximum tokens per completion.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the maximum concurrent evidence fetches.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Sets the web search timeout.
    #[must_use]
    pub const fn search_timeout(mut self, duration: Duration) -> Self {
        self.search_timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`ResearchConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<ResearchConfig, ResearchError> {
        let api_key = self.api_key.ok_or(ResearchError::ApiKeyMissing)?;

        Ok(ResearchConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            max_concurrency: self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
            search_timeout: self
                .search_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ResearchConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(
            config.search_timeout,
            Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS)
        );
        assert!(config.prompt_dir.is_none());
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = ResearchConfig::builder().build();
        assert!(matches!(result, Err(ResearchError::ApiKeyMissing)));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ResearchConfig::builder()
            .api_key("key")
            .provider("custom")
            .model("gpt-4o-mini")
            .max_tokens(500)
            .max_concurrency(2)
            .search_timeout(Duration::from_secs(5))
            .prompt_dir("/tmp/prompts")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.search_timeout, Duration::from_secs(5));
        assert_eq!(config.prompt_dir, Some(PathBuf::from("/tmp/prompts")));
    }
}
