//! Agent trait definition.
//!
//! All pipeline stages that invoke the model (analyzer, gatherer,
//! synthesizer, recovery) implement this trait, which provides a
//! uniform interface over the provider.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, system_message, user_message};
use super::provider::LlmProvider;
use crate::error::ResearchError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: super::message::TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by all model-invoking stages.
///
/// Agents encapsulate a specific role (analysis, summarization,
/// synthesis, recovery) with a fixed sampling configuration. Stages call
/// [`Agent::execute`] to run one completion against a provider.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt for the agent. An empty prompt is omitted from the
    /// request; the rendered template then travels as the sole user
    /// message.
    fn system_prompt(&self) -> &str {
        ""
    }

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Executes the agent with the given user message.
    ///
    /// Builds a [`ChatRequest`] from the agent's configuration and
    /// delegates to the provider.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError`] on API failures or response parsing errors.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, ResearchError> {
        let mut messages = Vec::with_capacity(2);
        if !self.system_prompt().is_empty() {
            messages.push(system_message(self.system_prompt()));
        }
        messages.push(user_message(user_msg));

        let request = ChatRequest {
            model: self.model().to_string(),
            messages,
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
        };

        let response: ChatResponse = provider.chat(&request).await?;

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::agent::message::TokenUsage;

    struct CapturingProvider {
        captured: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl LlmProvider for CapturingProvider {
        fn name(&self) -> &'static str {
            "capture"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ResearchError> {
            if let Ok(mut captured) = self.captured.lock() {
                captured.push(request.clone());
            }
            Ok(ChatResponse {
                content: "ok".to_string(),
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    struct BareAgent;

    impl Agent for BareAgent {
        fn name(&self) -> &'static str {
            "bare"
        }

        fn model(&self) -> &str {
            "gpt-4.1"
        }

        fn temperature(&self) -> f32 {
            0.3
        }
    }

    #[tokio::test]
    async fn test_execute_omits_empty_system_prompt() {
        let provider = CapturingProvider {
            captured: Mutex::new(Vec::new()),
        };
        let response = BareAgent
            .execute(&provider, "question")
            .await
            .unwrap_or_else(|e| panic!("execute failed: {e}"));
        assert_eq!(response.content, "ok");

        let captured = provider
            .captured
            .lock()
            .unwrap_or_else(|e| panic!("mutex poisoned: {e}"));
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].messages.len(), 1);
        assert_eq!(captured[0].messages[0].content, "question");
        assert_eq!(captured[0].model, "gpt-4.1");
        assert_eq!(captured[0].max_tokens, Some(2048));
    }
}
