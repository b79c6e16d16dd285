//! Orchestrator for the staged research pipeline.
//!
//! Drives the loop: analyze → gather → synthesize, detouring to the
//! recovery stage whenever a stage records a failure. Transitions come
//! from [`crate::core::routing`]; each stage returns a [`StateUpdate`]
//! that is merged into the shared [`ResearchState`], so the state after
//! any step is the full history of the run so far.

use std::sync::Arc;

use tracing::{debug, info};

use super::analyzer::Analyzer;
use super::client::ModelSpec;
use super::config::ResearchConfig;
use super::gatherer::Gatherer;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::recovery::Recovery;
use super::synthesizer::Synthesizer;
use crate::core::routing::{Next, Stage};
use crate::core::state::{ResearchState, StateUpdate};
use crate::error::{ResearchError, Result};
use crate::tools::{EvidenceSource, KnowledgeBase, WebSearch};

/// Per-request overrides for model parameters.
///
/// Each field is resolved as: override → configuration default.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Model selector, either `provider:model` or a bare model name.
    pub model: Option<String>,
    /// Completion token cap applied to every stage call.
    pub max_tokens: Option<u32>,
}

/// Model parameters resolved once per run and shared by every stage.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Completion token cap applied to every stage call.
    pub max_tokens: u32,
}

impl RunSettings {
    /// Creates settings from explicit values.
    #[must_use]
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
        }
    }
}

/// Orchestrates the staged research workflow.
///
/// Holds the LLM provider, the ordered evidence sources, and the prompt
/// templates for one deployment; individual runs share all three.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    sources: Vec<Arc<dyn EvidenceSource>>,
    config: ResearchConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates a new orchestrator with the default evidence sources:
    /// web search first, the built-in knowledge base as fallback.
    ///
    /// Prompt templates load from [`ResearchConfig::prompt_dir`],
    /// falling back to compiled-in defaults.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: ResearchConfig) -> Self {
        let sources: Vec<Arc<dyn EvidenceSource>> = vec![
            Arc::new(WebSearch::from_env(config.search_timeout)),
            Arc::new(KnowledgeBase::builtin()),
        ];
        Self::with_sources(provider, config, sources)
    }

    /// Creates an orchestrator with explicit evidence sources, tried in
    /// order for every sub-question.
    #[must_use]
    pub fn with_sources(
        provider: Arc<dyn LlmProvider>,
        config: ResearchConfig,
        sources: Vec<Arc<dyn EvidenceSource>>,
    ) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self {
            provider,
            sources,
            config,
            prompts,
        }
    }

    /// Executes a full research run and returns the final state.
    ///
    /// Stage failures do not abort the run: they are recorded in the
    /// state and routed to the recovery stage, which produces a
    /// clarification instead of an answer. The two exceptions are a
    /// synthesis failure, which ends the run with the error recorded
    /// and no `final_answer`, and a recovery failure, which has nothing
    /// left to fall back to.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::UnsupportedProvider`] for a model
    /// selector whose prefix names a different provider, and any error
    /// raised by the recovery stage itself.
    pub async fn run(&self, query: &str, overrides: &RunOverrides) -> Result<ResearchState> {
        let settings = self.resolve(overrides)?;
        info!(model = %settings.model, "starting research run");

        let mut state = ResearchState::new(query);
        let mut stage = Stage::Analyzing;

        loop {
            debug!(stage = %stage, "entering stage");
            let update = self.run_stage(stage, &settings, &state).await?;
            state.apply(update);

            stage = match stage.route(&state) {
                Next::Gather => Stage::Gathering,
                Next::Synthesize => Stage::Synthesizing,
                Next::Error => Stage::Erroring,
                Next::Terminal => break,
            };
        }

        info!(
            answered = state.final_answer.is_some(),
            failed = state.error.is_some(),
            "research run finished"
        );
        Ok(state)
    }

    /// Runs one stage against the current state.
    async fn run_stage(
        &self,
        stage: Stage,
        settings: &RunSettings,
        state: &ResearchState,
    ) -> Result<StateUpdate> {
        let update = match stage {
            Stage::Analyzing => {
                let agent = Analyzer::new(settings, self.prompts.analyze.clone());
                agent.run(&*self.provider, state).await
            }
            Stage::Gathering => {
                let agent = Gatherer::new(
                    settings,
                    self.prompts.gather.clone(),
                    self.sources.clone(),
                    self.config.max_concurrency,
                );
                agent.run(&*self.provider, state).await
            }
            Stage::Synthesizing => {
                let agent = Synthesizer::new(settings, self.prompts.synthesize.clone());
                agent.run(&*self.provider, state).await
            }
            Stage::Erroring => {
                let agent = Recovery::new(settings, self.prompts.recovery.clone());
                agent.run(&*self.provider, state).await?
            }
        };
        Ok(update)
    }

    /// Resolves per-run model settings from overrides and configuration.
    ///
    /// A selector prefix must name the active provider; the model part
    /// may be empty (`"openai:"`) to keep the configured default.
    fn resolve(&self, overrides: &RunOverrides) -> Result<RunSettings> {
        let model = match overrides.model.as_deref() {
            Some(selector) => {
                let spec = ModelSpec::parse(selector);
                if let Some(prefix) = spec.provider
                    && prefix != self.provider.name()
                {
                    return Err(ResearchError::UnsupportedProvider { name: prefix });
                }
                if spec.model.is_empty() {
                    self.config.model.clone()
                } else {
                    spec.model
                }
            }
            None => self.config.model.clone(),
        };

        Ok(RunSettings {
            model,
            max_tokens: overrides.max_tokens.unwrap_or(self.config.max_tokens),
        })
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source_names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("sources", &source_names)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
