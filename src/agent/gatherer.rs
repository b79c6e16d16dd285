//! Gathering stage: concurrent evidence collection.
//!
//! Fans each sub-question out to the evidence sources in order, first
//! success wins. Fetches run concurrently under a semaphore bound and
//! join at a barrier; a failed fetch only costs its own sub-question.
//! Raw results are then summarized one by one so the synthesizer sees
//! focused facts instead of raw search output.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::orchestrator::RunSettings;
use super::prompt::build_gather_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::state::{ResearchState, StateUpdate};
use crate::error::ResearchError;
use crate::tools::{EvidenceSource, Lookup};

/// Agent that collects and summarizes evidence per sub-question.
pub struct Gatherer {
    model: String,
    max_tokens: u32,
    template: String,
    sources: Vec<Arc<dyn EvidenceSource>>,
    max_concurrency: usize,
}

impl Gatherer {
    /// Creates a new gatherer for one run.
    ///
    /// `sources` are tried in order for every sub-question; the first
    /// one returning text wins.
    #[must_use]
    pub fn new(
        settings: &RunSettings,
        template: String,
        sources: Vec<Arc<dyn EvidenceSource>>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            template,
            sources,
            max_concurrency,
        }
    }

    /// Runs the stage and returns its state patch.
    ///
    /// Partial success is success: sub-questions that yield nothing are
    /// dropped silently. Only an entirely empty evidence map records
    /// [`ResearchError::NoEvidence`].
    pub async fn run(&self, provider: &dyn LlmProvider, state: &ResearchState) -> StateUpdate {
        if state.sub_questions.is_empty() {
            return StateUpdate::failure(ResearchError::NoWork);
        }

        let pairs = self.fan_out(&state.sub_questions).await;

        let mut evidence = HashMap::new();
        for (sub_question, raw) in pairs {
            let Some(raw) = raw else { continue };
            match self.summarize(provider, &sub_question, &raw).await {
                Ok(summary) => {
                    evidence.insert(sub_question, summary);
                }
                Err(e) => {
                    warn!(sub_question = %sub_question, error = %e, "summarization failed, dropping entry");
                }
            }
        }

        if evidence.is_empty() {
            return StateUpdate::failure(ResearchError::NoEvidence);
        }

        StateUpdate {
            evidence,
            ..StateUpdate::default()
        }
    }

    /// Fetches raw evidence for every sub-question concurrently.
    ///
    /// Returns one `(sub_question, raw)` pair per input, in input order.
    /// A panicked or cancelled task yields `None` for its sub-question
    /// and never aborts the stage.
    async fn fan_out(&self, sub_questions: &[String]) -> Vec<(String, Option<String>)> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency.max(1)));
        let mut handles = Vec::with_capacity(sub_questions.len());

        for sub_question in sub_questions {
            let sem = Arc::clone(&semaphore);
            let sources = self.sources.clone();
            let question = sub_question.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    return (question, None);
                };
                let raw = fetch_with_fallback(&sources, &question).await;
                (question, raw)
            });

            handles.push(handle);
        }

        let expected = handles.len();
        let mut pairs = Vec::with_capacity(expected);
        for (handle, sub_question) in handles.into_iter().zip(sub_questions) {
            match handle.await {
                Ok(pair) => pairs.push(pair),
                Err(e) => {
                    warn!(sub_question = %sub_question, error = %e, "evidence task failed to join");
                    pairs.push((sub_question.clone(), None));
                }
            }
        }

        debug_assert_eq!(
            pairs.len(),
            expected,
            "fetch result count mismatch: expected {expected}, got {}",
            pairs.len()
        );

        pairs
    }

    /// Summarizes one raw result into concise facts.
    async fn summarize(
        &self,
        provider: &dyn LlmProvider,
        sub_question: &str,
        raw: &str,
    ) -> Result<String, ResearchError> {
        let prompt = build_gather_prompt(&self.template, sub_question, raw);
        let response = self.execute(provider, &prompt).await?;
        Ok(response.content)
    }
}

#[async_trait]
impl Agent for Gatherer {
    fn name(&self) -> &'static str {
        "gatherer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        0.2
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Tries each source in order, returning the first usable text.
///
/// Empty results and provider failures both fall through to the next
/// source; exhaustion yields `None` for this item only.
async fn fetch_with_fallback(
    sources: &[Arc<dyn EvidenceSource>],
    query: &str,
) -> Option<String> {
    for source in sources {
        match source.fetch(query).await {
            Ok(Lookup::Found(text)) => {
                debug!(provider = source.name(), query = %query, "evidence found");
                return Some(text);
            }
            Ok(Lookup::Empty) => {
                debug!(provider = source.name(), query = %query, "no results, trying next source");
            }
            Err(e) => {
                warn!(provider = source.name(), query = %query, error = %e, "source failed, trying next");
            }
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
    use crate::agent::prompt::GATHER_PROMPT;
    use crate::tools::ProviderError;

    /// Source that always answers with the same scripted outcome.
    struct ScriptedSource {
        name: &'static str,
        outcome: Result<Lookup, ProviderError>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(name: &'static str, outcome: Result<Lookup, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EvidenceSource for ScriptedSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _query: &str) -> Result<Lookup, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    /// Summarizer that prefixes whatever it is asked to condense.
    struct EchoSummarizer;

    #[async_trait]
    impl LlmProvider for EchoSummarizer {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ResearchError> {
            let prompt = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(ChatResponse {
                content: format!("Faits: {prompt}"),
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    /// Summarizer that always fails.
    struct BrokenSummarizer;

    #[async_trait]
    impl LlmProvider for BrokenSummarizer {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, ResearchError> {
            Err(ResearchError::ApiRequest {
                message: "boom".to_string(),
                status: Some(500),
            })
        }
    }

    fn gatherer(sources: Vec<Arc<dyn EvidenceSource>>) -> Gatherer {
        let settings = RunSettings::new("gpt-4.1", 200);
        Gatherer::new(&settings, GATHER_PROMPT.to_string(), sources, 4)
    }

    fn state_with_questions(questions: &[&str]) -> ResearchState {
        ResearchState {
            user_query: "q".to_string(),
            sub_questions: questions.iter().map(ToString::to_string).collect(),
            ..ResearchState::default()
        }
    }

    #[tokio::test]
    async fn test_no_sub_questions_signals_no_work() {
        let gatherer = gatherer(vec![]);
        let state = state_with_questions(&[]);
        let update = gatherer.run(&EchoSummarizer, &state).await;
        assert!(matches!(update.error, Some(ResearchError::NoWork)));
        assert!(update.evidence.is_empty());
    }

    #[tokio::test]
    async fn test_first_source_win_skips_fallback() {
        let web = ScriptedSource::new("web", Ok(Lookup::Found("des résultats web".to_string())));
        let kb = ScriptedSource::new("kb", Ok(Lookup::Found("des données locales".to_string())));
        let gatherer = gatherer(vec![web.clone(), kb.clone()]);
        let state = state_with_questions(&["quelle performance ?"]);

        let update = gatherer.run(&EchoSummarizer, &state).await;

        assert!(update.error.is_none());
        let summary = update
            .evidence
            .get("quelle performance ?")
            .unwrap_or_else(|| panic!("missing evidence entry"));
        assert!(summary.contains("des résultats web"));
        assert_eq!(web.calls(), 1);
        assert_eq!(kb.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_web_result_falls_back_to_knowledge() {
        let web = ScriptedSource::new("web", Ok(Lookup::Empty));
        let kb = ScriptedSource::new("kb", Ok(Lookup::Found("des données locales".to_string())));
        let gatherer = gatherer(vec![web.clone(), kb.clone()]);
        let state = state_with_questions(&["python vs javascript backend"]);

        let update = gatherer.run(&EchoSummarizer, &state).await;

        assert_eq!(web.calls(), 1);
        assert_eq!(kb.calls(), 1);
        let summary = update
            .evidence
            .get("python vs javascript backend")
            .unwrap_or_else(|| panic!("missing evidence entry"));
        assert!(summary.contains("des données locales"));
    }

    #[tokio::test]
    async fn test_missing_credentials_fall_back_to_knowledge() {
        let web = ScriptedSource::new("web", Err(ProviderError::MissingCredentials));
        let kb = ScriptedSource::new("kb", Ok(Lookup::Found("local".to_string())));
        let gatherer = gatherer(vec![web.clone(), kb.clone()]);
        let state = state_with_questions(&["sujet"]);

        let update = gatherer.run(&EchoSummarizer, &state).await;

        assert_eq!(kb.calls(), 1);
        assert!(update.evidence.contains_key("sujet"));
    }

    #[tokio::test]
    async fn test_all_sources_exhausted_signals_no_evidence() {
        let web = ScriptedSource::new(
            "web",
            Err(ProviderError::Timeout { seconds: 30 }),
        );
        let kb = ScriptedSource::new("kb", Ok(Lookup::Empty));
        let gatherer = gatherer(vec![web as Arc<dyn EvidenceSource>, kb]);
        let state = state_with_questions(&["sujet un", "sujet deux"]);

        let update = gatherer.run(&EchoSummarizer, &state).await;

        assert!(matches!(update.error, Some(ResearchError::NoEvidence)));
        assert!(update.evidence.is_empty());
    }

    #[tokio::test]
    async fn test_partial_success_is_success() {
        // First source answers, second never reached; one question still
        // yields nothing because the echo text is keyed per question.
        struct OneTopicSource;

        #[async_trait]
        impl EvidenceSource for OneTopicSource {
            fn name(&self) -> &str {
                "one-topic"
            }

            async fn fetch(&self, query: &str) -> Result<Lookup, ProviderError> {
                if query.contains("connu") {
                    Ok(Lookup::Found("matière connue".to_string()))
                } else {
                    Ok(Lookup::Empty)
                }
            }
        }

        let gatherer = gatherer(vec![Arc::new(OneTopicSource)]);
        let state = state_with_questions(&["sujet connu", "sujet obscur"]);

        let update = gatherer.run(&EchoSummarizer, &state).await;

        assert!(update.error.is_none());
        assert_eq!(update.evidence.len(), 1);
        assert!(update.evidence.contains_key("sujet connu"));
        assert!(!update.evidence.contains_key("sujet obscur"));
    }

    #[tokio::test]
    async fn test_summarization_failure_drops_entry() {
        let kb = ScriptedSource::new("kb", Ok(Lookup::Found("texte brut".to_string())));
        let gatherer = gatherer(vec![kb as Arc<dyn EvidenceSource>]);
        let state = state_with_questions(&["sujet"]);

        let update = gatherer.run(&BrokenSummarizer, &state).await;

        assert!(matches!(update.error, Some(ResearchError::NoEvidence)));
        assert!(update.evidence.is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_preserves_input_order() {
        let kb = ScriptedSource::new("kb", Ok(Lookup::Found("x".to_string())));
        let gatherer = gatherer(vec![kb as Arc<dyn EvidenceSource>]);
        let questions: Vec<String> = (0..6).map(|i| format!("sujet {i}")).collect();

        let pairs = gatherer.fan_out(&questions).await;

        let returned: Vec<&str> = pairs.iter().map(|(q, _)| q.as_str()).collect();
        let expected: Vec<&str> = questions.iter().map(String::as_str).collect();
        assert_eq!(returned, expected);
    }
}
