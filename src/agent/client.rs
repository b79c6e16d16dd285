//! Provider registry and model selector parsing.
//!
//! Maps provider names to concrete [`LlmProvider`] implementations and
//! parses `provider:model` selector strings from the request surface.

use crate::agent::config::ResearchConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::error::ResearchError;

/// Creates an [`LlmProvider`] based on the configured provider name.
///
/// # Supported Providers
///
/// - `"openai"` (default) — OpenAI-compatible APIs via `async-openai`
///
/// # Errors
///
/// Returns [`ResearchError::UnsupportedProvider`] for unknown provider names.
pub fn create_provider(config: &ResearchConfig) -> Result<Box<dyn LlmProvider>, ResearchError> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiProvider::new(config))),
        other => Err(ResearchError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}

/// A parsed model selector of the form `provider:model` or bare `model`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Provider prefix, when the selector carried one.
    pub provider: Option<String>,
    /// Model identifier; may be empty for selectors like `"openai:"`.
    pub model: String,
}

impl ModelSpec {
    /// Parses a selector string such as `"openai:gpt-4.1"` or `"gpt-4.1"`.
    #[must_use]
    pub fn parse(selector: &str) -> Self {
        let trimmed = selector.trim();
        match trimmed.split_once(':') {
            Some((provider, model)) => Self {
                provider: Some(provider.trim().to_string()),
                model: model.trim().to_string(),
            },
            None => Self {
                provider: None,
                model: trimmed.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_provider() {
        let config = ResearchConfig::builder()
            .api_key("test")
            .provider("openai")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider = create_provider(&config);
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap_or_else(|_| unreachable!()).name(), "openai");
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = ResearchConfig::builder()
            .api_key("test")
            .provider("unknown")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let result = create_provider(&config);
        assert!(matches!(
            result,
            Err(ResearchError::UnsupportedProvider { name }) if name == "unknown"
        ));
    }

    #[test]
    fn test_parse_prefixed_selector() {
        let spec = ModelSpec::parse("openai:gpt-4.1");
        assert_eq!(spec.provider.as_deref(), Some("openai"));
        assert_eq!(spec.model, "gpt-4.1");
    }

    #[test]
    fn test_parse_bare_selector() {
        let spec = ModelSpec::parse("gpt-4o-mini");
        assert!(spec.provider.is_none());
        assert_eq!(spec.model, "gpt-4o-mini");
    }

    #[test]
    fn test_parse_selector_with_empty_model() {
        let spec = ModelSpec::parse("openai:");
        assert_eq!(spec.provider.as_deref(), Some("openai"));
        assert!(spec.model.is_empty());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let spec = ModelSpec::parse("  openai : gpt-4.1  ");
        assert_eq!(spec.provider.as_deref(), Some("openai"));
        assert_eq!(spec.model, "gpt-4.1");
    }
}
