//! Analyzing stage: query decomposition.
//!
//! Decomposes the user query into concrete sub-questions through a
//! JSON-formatted model call. An unusable decomposition falls back to
//! the original query, so the gathering stage always has at least one
//! unit of work on the success path.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::orchestrator::RunSettings;
use super::prompt::build_analyze_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::state::{ResearchState, StateUpdate, pipeline_entry};
use crate::error::ResearchError;

/// Structured decomposition returned by the model.
#[derive(Debug, Deserialize)]
struct AnalysisPlan {
    #[serde(default)]
    sub_questions: Vec<String>,
}

/// Agent that decomposes the user query into sub-questions.
pub struct Analyzer {
    model: String,
    max_tokens: u32,
    template: String,
}

impl Analyzer {
    /// Creates a new analyzer for one run.
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
    /// Failures are recorded in the patch's `error` field rather than
    /// returned, so routing can divert the run to recovery.
    pub async fn run(&self, provider: &dyn LlmProvider, state: &ResearchState) -> StateUpdate {
        let user_query = state.effective_query();
        if user_query.is_empty() {
            return fail(ResearchError::MissingInput);
        }

        let prompt = build_analyze_prompt(&self.template, &user_query);
        let response = match self.execute(provider, &prompt).await {
            Ok(response) => response,
            Err(e) => {
                return fail(ResearchError::Analysis {
                    message: e.to_string(),
                });
            }
        };

        match parse_sub_questions(&response.content) {
            Ok(parsed) => {
                let sub_questions = if parsed.is_empty() {
                    vec![user_query.clone()]
                } else {
                    parsed
                };
                debug!(count = sub_questions.len(), "query decomposed");
                StateUpdate {
                    user_query: Some(user_query),
                    sub_questions: Some(sub_questions),
                    ..StateUpdate::default()
                }
            }
            Err(e) => fail(ResearchError::Analysis {
                message: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Agent for Analyzer {
    fn name(&self) -> &'static str {
        "analyzer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn temperature(&self) -> f32 {
        0.3
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Builds a failure patch that also notes the shortfall in the transcript.
fn fail(error: ResearchError) -> StateUpdate {
    let note = pipeline_entry(&error.user_message());
    let mut update = StateUpdate::failure(error);
    update.transcript.push(note);
    update
}

/// Parses the model's JSON decomposition, tolerating markdown fences.
///
/// Candidates are stripped of bullet decoration; empty candidates are
/// discarded. An unparseable response is a
/// [`ResearchError::ResponseParse`] failure carrying the cause and the
/// offending content.
fn parse_sub_questions(content: &str) -> Result<Vec<String>, ResearchError> {
    let trimmed = content.trim();

    // Handle markdown code blocks
    let json_str = if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    };

    let plan: AnalysisPlan =
        serde_json::from_str(json_str).map_err(|e| ResearchError::ResponseParse {
            message: e.to_string(),
            content: content.to_string(),
        })?;

    Ok(plan
        .sub_questions
        .iter()
        .map(|q| q.trim().trim_matches([' ', '-', '•']).trim().to_string())
        .filter(|q| !q.is_empty())
        .collect())
}
