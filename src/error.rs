//! Error types for the research pipeline.
//!
//! [`ResearchError`] covers the failure kinds the pipeline can signal:
//! stage failures that route to the recovery node, provider/API failures
//! from the LLM layer, and coordination failures from the orchestrator.
//! Evidence-source failures are a separate type ([`crate::tools::ProviderError`])
//! because they are always recovered locally and never become a run-level
//! failure.

use thiserror::Error;

/// Convenience result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ResearchError>;

/// Errors raised by the research pipeline.
#[derive(Debug, Clone, Error)]
pub enum ResearchError {
    /// No usable user question was provided.
    #[error("no user query provided")]
    MissingInput,

    /// The analysis stage failed to decompose the query.
    #[error("analysis failed: {message}")]
    Analysis {
        /// Underlying cause.
        message: String,
    },

    /// The gather stage was entered without any sub-questions.
    #[error("no sub-questions to process")]
    NoWork,

    /// Every sub-question failed to produce usable evidence.
    #[error("no usable evidence returned by the research tools")]
    NoEvidence,

    /// The synthesis stage failed to produce an answer.
    #[error("synthesis failed: {message}")]
    Synthesis {
        /// Underlying cause.
        message: String,
    },

    /// No API key found in configuration or environment.
    #[error("no API key found; set OPENAI_API_KEY or DOSSIER_API_KEY")]
    ApiKeyMissing,

    /// An LLM API request failed.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error detail from the provider.
        message: String,
        /// HTTP status code, when available.
        status: Option<u16>,
    },

    /// The model response could not be parsed.
    #[error("failed to parse model response: {message}")]
    ResponseParse {
        /// Parse error detail.
        message: String,
        /// The raw response content that failed to parse.
        content: String,
    },

    /// Unknown provider prefix in a model selector.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The provider name that was requested.
        name: String,
    },

    /// Pipeline coordination failure.
    #[error("orchestration error: {message}")]
    Orchestration {
        /// What went wrong.
        message: String,
    },
}

impl ResearchError {
    /// Returns the French user-facing message for this failure.
    ///
    /// These strings are the pipeline's stable response surface: they
    /// appear in the `error` field of API responses and feed the
    /// recovery prompt. Technical variants that never reach that
    /// surface fall back to their display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput => "Aucune question utilisateur fournie.".to_string(),
            Self::Analysis { message } => format!("Analyse échouée: {message}"),
            Self::NoWork => "Aucune sous-question à traiter.".to_string(),
            Self::NoEvidence => {
                "Aucune donnée exploitable retournée par les outils de recherche.".to_string()
            }
            Self::Synthesis { message } => format!("Synthèse échouée: {message}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_missing_input() {
        let err = ResearchError::MissingInput;
        assert_eq!(err.user_message(), "Aucune question utilisateur fournie.");
    }

    #[test]
    fn test_user_message_analysis_carries_cause() {
        let err = ResearchError::Analysis {
            message: "timeout".to_string(),
        };
        assert_eq!(err.user_message(), "Analyse échouée: timeout");
    }

    #[test]
    fn test_user_message_no_evidence() {
        let err = ResearchError::NoEvidence;
        assert_eq!(
            err.user_message(),
            "Aucune donnée exploitable retournée par les outils de recherche."
        );
    }

    #[test]
    fn test_user_message_no_work() {
        let err = ResearchError::NoWork;
        assert_eq!(err.user_message(), "Aucune sous-question à traiter.");
    }

    #[test]
    fn test_user_message_synthesis_carries_cause() {
        let err = ResearchError::Synthesis {
            message: "connection reset".to_string(),
        };
        assert_eq!(err.user_message(), "Synthèse échouée: connection reset");
    }

    #[test]
    fn test_display_api_request() {
        let err = ResearchError::ApiRequest {
            message: "rate limited".to_string(),
            status: Some(429),
        };
        assert_eq!(err.to_string(), "API request failed: rate limited");
    }
}
