//! HTTP handlers for the research API.

use std::sync::Arc;

use axum::extract::State;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::agent::{Orchestrator, RunOverrides};
use crate::core::state::ResearchReport;
use crate::error::ResearchError;

use super::error::{ApiError, ApiResult};

/// Smallest accepted `max_tokens` value.
const MIN_COMPLETION_TOKENS: u32 = 100;

/// Largest accepted `max_tokens` value.
const MAX_COMPLETION_TOKENS: u32 = 100_000;

/// Body of a `POST /research` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchRequest {
    /// The research question.
    pub query: String,
    /// Optional model selector (`provider:model` or bare model name).
    #[serde(default)]
    pub model: Option<String>,
    /// Optional completion token cap, accepted between 100 and 100000.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The research pipeline, shared by all in-flight requests.
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// Creates handler state around an orchestrator.
    #[must_use]
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// Validates a research request before it reaches the pipeline.
fn validate(request: &ResearchRequest) -> Result<(), ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("query cannot be empty"));
    }
    if let Some(max_tokens) = request.max_tokens
        && !(MIN_COMPLETION_TOKENS..=MAX_COMPLETION_TOKENS).contains(&max_tokens)
    {
        return Err(ApiError::bad_request(format!(
            "max_tokens must be between {MIN_COMPLETION_TOKENS} and {MAX_COMPLETION_TOKENS}, got {max_tokens}"
        )));
    }
    Ok(())
}

/// POST /research - runs the full research pipeline for one question.
///
/// Pipeline failures with a recovery answer come back as a normal
/// response whose `error` field is set; only an invalid request or a
/// failure past recovery becomes an HTTP error.
pub async fn research(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> ApiResult<Json<ResearchReport>> {
    validate(&request)?;
    info!(query = %request.query, "research request received");

    let overrides = RunOverrides {
        model: request.model.clone(),
        max_tokens: request.max_tokens,
    };

    let final_state = state
        .orchestrator
        .run(&request.query, &overrides)
        .await
        .map_err(|e| match e {
            ResearchError::UnsupportedProvider { .. } => ApiError::bad_request(e.to_string()),
            other => ApiError::internal(format!("Échec du traitement de la requête : {other}")),
        })?;

    Ok(Json(ResearchReport::from_state(&final_state)))
}

/// GET /health - service liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "dossier-rs",
    }))
}

/// GET / - service information.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "dossier-rs",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Assistant de recherche IA qui décompose les questions, collecte des preuves et synthétise les réponses",
        "endpoints": {
            "health": "GET /health - Vérification de santé du service",
            "research": "POST /research - Exécuter une requête de recherche",
        },
    }))
}

/// Builds the router with all API endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(root))
        .route("/health", axum::routing::get(health))
        .route("/research", axum::routing::post(research))
        .layer(CorsLayer::very_permissive())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use super::*;
    use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
    use crate::agent::{LlmProvider, ResearchConfig};
    use crate::tools::{EvidenceSource, Lookup, ProviderError};

    /// Provider whose every reply parses as a decomposition and also
    /// serves as summary and answer text.
    struct ConstProvider;

    #[async_trait]
    impl LlmProvider for ConstProvider {
        fn name(&self) -> &'static str {
            "openai"
        }

        async fn chat(
            &self,
            _request: &ChatRequest,
        ) -> Result<ChatResponse, ResearchError> {
            Ok(ChatResponse {
                content: r#"{"sub_questions": ["aspect"]}"#.to_string(),
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl LlmProvider for BrokenProvider {
        fn name(&self) -> &'static str {
            "openai"
        }

        async fn chat(
            &self,
            _request: &ChatRequest,
        ) -> Result<ChatResponse, ResearchError> {
            Err(ResearchError::ApiRequest {
                message: "outage".to_string(),
                status: Some(503),
            })
        }
    }

    struct StaticSource;

    #[async_trait]
    impl EvidenceSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch(&self, _query: &str) -> Result<Lookup, ProviderError> {
            Ok(Lookup::Found("des faits".to_string()))
        }
    }

    fn app_state(provider: Arc<dyn LlmProvider>, prompt_dir: &Path) -> AppState {
        let config = ResearchConfig::builder()
            .api_key("test-key")
            .prompt_dir(prompt_dir)
            .build()
            .unwrap_or_else(|e| panic!("config build failed: {e}"));
        let orchestrator =
            Orchestrator::with_sources(provider, config, vec![Arc::new(StaticSource)]);
        AppState::new(Arc::new(orchestrator))
    }

    fn request(query: &str) -> ResearchRequest {
        ResearchRequest {
            query: query.to_string(),
            model: None,
            max_tokens: None,
        }
    }

    fn rejection<T: std::fmt::Debug>(result: ApiResult<T>) -> ApiError {
        match result {
            Err(e) => e,
            Ok(v) => panic!("expected rejection, got {v:?}"),
        }
    }

    #[test]
    fn test_request_minimal_body_deserializes() {
        let parsed: ResearchRequest = serde_json::from_str(r#"{"query": "ma question"}"#)
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(parsed.query, "ma question");
        assert!(parsed.model.is_none());
        assert!(parsed.max_tokens.is_none());
    }

    #[test]
    fn test_request_full_body_deserializes() {
        let parsed: ResearchRequest = serde_json::from_str(
            r#"{"query": "q", "model": "openai:gpt-4o", "max_tokens": 2000}"#,
        )
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(parsed.model.as_deref(), Some("openai:gpt-4o"));
        assert_eq!(parsed.max_tokens, Some(2000));
    }

    #[test]
    fn test_validate_rejects_blank_query() {
        let error = rejection(validate(&request("  \n ")));
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validate_rejects_out_of_range_max_tokens() {
        for out_of_range in [0_u32, 99, 100_001] {
            let mut req = request("q");
            req.max_tokens = Some(out_of_range);
            let error = rejection(validate(&req));
            assert_eq!(error.status, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_validate_accepts_bounds() {
        for in_range in [100_u32, 10_000, 100_000] {
            let mut req = request("q");
            req.max_tokens = Some(in_range);
            assert!(validate(&req).is_ok());
        }
    }

    #[tokio::test]
    async fn test_research_returns_report() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let state = app_state(Arc::new(ConstProvider), dir.path());

        let Json(report) = research(State(state), Json(request("ma question")))
            .await
            .unwrap_or_else(|e| panic!("handler failed: {e}"));

        assert_eq!(report.user_query, "ma question");
        assert_eq!(report.sub_questions, vec!["aspect".to_string()]);
        assert!(report.final_answer.is_some());
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_research_rejects_empty_query() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let state = app_state(Arc::new(ConstProvider), dir.path());

        let error = rejection(research(State(state), Json(request(""))).await);
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_research_maps_unknown_provider_to_bad_request() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let state = app_state(Arc::new(ConstProvider), dir.path());

        let mut req = request("q");
        req.model = Some("anthropic:claude-3".to_string());
        let error = rejection(research(State(state), Json(req)).await);
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(error.message.contains("anthropic"));
    }

    #[tokio::test]
    async fn test_research_maps_fatal_failure_to_internal_error() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let state = app_state(Arc::new(BrokenProvider), dir.path());

        let error = rejection(research(State(state), Json(request("q"))).await);
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.message.starts_with("Échec du traitement de la requête :"));
    }

    #[tokio::test]
    async fn test_health_payload() {
        let Json(payload) = health().await;
        assert_eq!(payload["status"], "healthy");
        assert_eq!(payload["service"], "dossier-rs");
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let Json(payload) = root().await;
        assert_eq!(payload["service"], "dossier-rs");
        assert_eq!(payload["version"], env!("CARGO_PKG_VERSION"));
        assert!(payload["endpoints"]["research"]
            .as_str()
            .unwrap_or_default()
            .contains("POST /research"));
    }
}
