//! Recovery stage: graceful degradation after a pipeline failure.
//!
//! Entered whenever an earlier stage recorded an error. Asks the model
//! for a short apology that names the failure and suggests a next
//! step. The recorded error stays in place so the response carries
//! both the explanation and the failure it explains. A model failure
//! here has no further fallback and surfaces to the caller.

use async_trait::async_trait;

use super::orchestrator::RunSettings;
use super::prompt::build_recovery_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::state::{pipeline_entry, ResearchState, StateUpdate};
use crate::error::{ResearchError, Result};

/// Reason used when the recovery stage is entered without a recorded error.
const UNKNOWN_REASON: &str = "Problème inconnu.";

/// Agent that explains a failed run to the user.
pub struct Recovery {
    model: String,
    max_tokens: u32,
    template: String,
}

impl Recovery {
    /// Creates a new recovery agent for one run.
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
    /// Unlike the other stages this returns `Result`: there is no stage
    /// left to divert to, so an error here aborts the run.
    pub async fn run(
        &self,
        provider: &dyn LlmProvider,
        state: &ResearchState,
    ) -> Result<StateUpdate> {
        let reason = state
            .error
            .as_ref()
            .map_or_else(|| UNKNOWN_REASON.to_string(), ResearchError::user_message);

        let prompt = build_recovery_prompt(&self.template, &state.user_query, &reason);
        let response = self.execute(provider, &prompt).await?;

        Ok(StateUpdate {
            final_answer: Some(response.content.clone()),
            transcript: vec![pipeline_entry(&response.content)],
            ..StateUpdate::default()
        })
    }
}

#[async_trait]
impl Agent for Recovery {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        0.5
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
