//! Shared pipeline state and per-field merge rules.
//!
//! A run owns exactly one [`ResearchState`]. Stages never mutate it
//! directly: each returns a [`StateUpdate`] patch and the orchestrator
//! merges it through [`ResearchState::apply`], the single merge path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ResearchError;

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person asking the question.
    User,
    /// A pipeline stage.
    Pipeline,
}

/// One entry in the append-only run transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Who wrote this entry.
    pub speaker: Speaker,
    /// Entry text.
    pub text: String,
}

/// Creates a user transcript entry.
#[must_use]
pub fn user_entry(text: &str) -> TranscriptEntry {
    TranscriptEntry {
        speaker: Speaker::User,
        text: text.to_string(),
    }
}

/// Creates a pipeline transcript entry.
#[must_use]
pub fn pipeline_entry(text: &str) -> TranscriptEntry {
    TranscriptEntry {
        speaker: Speaker::Pipeline,
        text: text.to_string(),
    }
}

/// The single mutable record threaded through a research run.
///
/// Created once per request, never persisted, discarded after the
/// response is returned.
#[derive(Debug, Clone, Default)]
pub struct ResearchState {
    /// The original question, set once at entry.
    pub user_query: String,
    /// Analysis output; empty until the analyzing stage completes.
    pub sub_questions: Vec<String>,
    /// Sub-question → summarized evidence. Keys are a subset of
    /// `sub_questions`; display order comes from `sub_questions`, not
    /// from map iteration.
    pub evidence: HashMap<String, String>,
    /// Synthesis output, or the recovery stage's clarification.
    pub final_answer: Option<String>,
    /// The first stage failure, if any.
    pub error: Option<ResearchError>,
    /// Append-only log of pipeline messages.
    pub transcript: Vec<TranscriptEntry>,
}

impl ResearchState {
    /// Seeds a fresh state, recording the query as the first
    /// transcript entry.
    #[must_use]
    pub fn new(user_query: &str) -> Self {
        Self {
            user_query: user_query.to_string(),
            transcript: vec![user_entry(user_query)],
            ..Self::default()
        }
    }

    /// Merges a stage patch into the state.
    ///
    /// Per-field rules:
    /// - scalars and sequences: last-writer-wins, `None` leaves the
    ///   field untouched;
    /// - `evidence`: key-wise union, patch entries overlay existing
    ///   keys but never clear others;
    /// - `transcript`: append-only concatenation.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(user_query) = update.user_query {
            self.user_query = user_query;
        }
        if let Some(sub_questions) = update.sub_questions {
            self.sub_questions = sub_questions;
        }
        self.evidence.extend(update.evidence);
        if let Some(final_answer) = update.final_answer {
            self.final_answer = Some(final_answer);
        }
        if let Some(error) = update.error {
            self.error = Some(error);
        }
        self.transcript.extend(update.transcript);
    }

    /// Returns the question to analyze: `user_query`, or a
    /// reconstruction from the transcript when the field is blank.
    #[must_use]
    pub fn effective_query(&self) -> String {
        let trimmed = self.user_query.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        self.transcript
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

/// A patch produced by one pipeline stage.
///
/// `evidence` and `transcript` are always merged additively; every
/// other field only takes effect when `Some`.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    /// Replacement user query.
    pub user_query: Option<String>,
    /// Replacement sub-question list.
    pub sub_questions: Option<Vec<String>>,
    /// Evidence entries to overlay onto the state's map.
    pub evidence: HashMap<String, String>,
    /// Final answer to set.
    pub final_answer: Option<String>,
    /// Failure to record.
    pub error: Option<ResearchError>,
    /// Transcript entries to append.
    pub transcript: Vec<TranscriptEntry>,
}

impl StateUpdate {
    /// Creates a patch that records a stage failure and nothing else.
    #[must_use]
    pub fn failure(error: ResearchError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Response-surface projection of a finished run.
///
/// Field names match the service's wire format; `tool_results` is the
/// evidence map and `error` carries the French user-facing message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    /// The original question.
    pub user_query: String,
    /// Decomposed sub-questions.
    pub sub_questions: Vec<String>,
    /// Evidence collected per sub-question.
    pub tool_results: HashMap<String, String>,
    /// The synthesized answer, when one was produced.
    pub final_answer: Option<String>,
    /// User-facing failure message, when the run failed.
    pub error: Option<String>,
}

impl ResearchReport {
    /// Projects a finished state onto the response surface.
    #[must_use]
    pub fn from_state(state: &ResearchState) -> Self {
        Self {
            user_query: state.user_query.clone(),
            sub_questions: state.sub_questions.clone(),
            tool_results: state.evidence.clone(),
            final_answer: state.final_answer.clone(),
            error: state.error.as_ref().map(ResearchError::user_message),
        }
    }
}
