//! Synthesis stage: final answer composition.
//!
//! Takes the original question, the sub-questions, and the summarized
//! evidence, and produces one structured markdown answer. When the
//! model call fails the stage records a synthesis failure instead of
//! aborting; the recovery stage then owns the response.

use async_trait::async_trait;

use super::orchestrator::RunSettings;
use super::prompt::build_synthesize_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::state::{pipeline_entry, ResearchState, StateUpdate};
use crate::error::ResearchError;

/// Agent that writes the final structured answer.
pub struct Synthesizer {
    model: String,
    max_tokens: u32,
    template: String,
}

impl Synthesizer {
    /// Creates a new synthesizer for one run.
    #[must_use]
    pub fn new(settings: &RunSettings, template: String) -> Self {
        Self {
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            template,
        }
    }

    /// Runs the stage and returns its state patch.
    ///
    /// On success the answer lands in `final_answer` and is echoed to
    /// the transcript. On failure no answer of any kind is recorded,
    /// only the error; a run that ends here has no `final_answer`.
    pub async fn run(&self, provider: &dyn LlmProvider, state: &ResearchState) -> StateUpdate {
        let prompt = build_synthesize_prompt(
            &self.template,
            &state.user_query,
            &state.sub_questions,
            &state.evidence,
        );

        match self.execute(provider, &prompt).await {
            Ok(response) => StateUpdate {
                final_answer: Some(response.content.clone()),
                transcript: vec![pipeline_entry(&response.content)],
                ..StateUpdate::default()
            },
            Err(e) => {
                let error = ResearchError::Synthesis {
                    message: e.to_string(),
                };
                let note = pipeline_entry(&error.user_message());
                StateUpdate {
                    error: Some(error),
                    transcript: vec![note],
                    ..StateUpdate::default()
                }
            }
        }
    }
}

#[async_trait]
impl Agent for Synthesizer {
    fn name(&self) -> &'static str {
        "synthesizer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        0.4
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
    use crate::agent::prompt::SYNTHESIZE_PROMPT;
    use crate::core::state::Speaker;

    struct FixedProvider(&'static str);

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, ResearchError> {
            Ok(ChatResponse {
                content: self.0.to_string(),
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, ResearchError> {
            Err(ResearchError::ApiRequest {
                message: "rate limited".to_string(),
                status: Some(429),
            })
        }
    }

    fn synthesizer() -> Synthesizer {
        let settings = RunSettings::new("gpt-4.1", 500);
        Synthesizer::new(&settings, SYNTHESIZE_PROMPT.to_string())
    }

    fn populated_state() -> ResearchState {
        let mut evidence = HashMap::new();
        evidence.insert("pourquoi ?".to_string(), "parce que.".to_string());
        ResearchState {
            user_query: "grande question".to_string(),
            sub_questions: vec!["pourquoi ?".to_string()],
            evidence,
            ..ResearchState::default()
        }
    }

    #[tokio::test]
    async fn test_success_records_answer_and_transcript() {
        let agent = synthesizer();
        let update = agent
            .run(&FixedProvider("# Rapport final"), &populated_state())
            .await;

        assert_eq!(update.final_answer.as_deref(), Some("# Rapport final"));
        assert!(update.error.is_none());
        assert_eq!(update.transcript.len(), 1);
        assert_eq!(update.transcript[0].speaker, Speaker::Pipeline);
        assert_eq!(update.transcript[0].text, "# Rapport final");
    }

    #[tokio::test]
    async fn test_failure_records_error_without_answer() {
        let agent = synthesizer();
        let update = agent.run(&FailingProvider, &populated_state()).await;

        assert!(update.final_answer.is_none());
        let error = update
            .error
            .unwrap_or_else(|| panic!("expected a synthesis error"));
        assert!(matches!(error, ResearchError::Synthesis { .. }));
        assert!(update.transcript[0].text.starts_with("Synthèse échouée:"));
    }

    #[test]
    fn test_agent_properties() {
        let agent = synthesizer();
        assert_eq!(agent.name(), "synthesizer");
        assert_eq!(agent.model(), "gpt-4.1");
        assert!(!agent.json_mode());
        assert!((agent.temperature() - 0.4).abs() < f32::EPSILON);
        assert_eq!(agent.max_tokens(), 500);
    }
}
