//! Web search over the Tavily REST API.
//!
//! Results are flattened into one French-framed text block per query so
//! downstream summarization sees titles, URLs, and content together.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EvidenceSource, Lookup, ProviderError};

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const MAX_RESULTS: usize = 5;
const SEARCH_DEPTH: &str = "basic";

/// Environment variable holding the Tavily API key.
pub const TAVILY_API_KEY_VAR: &str = "TAVILY_API_KEY";

// One client for all searches; reqwest pools connections internally.
static SHARED_HTTP: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}

/// Tavily-backed evidence source.
#[derive(Debug, Clone)]
pub struct WebSearch {
    api_key: Option<String>,
    timeout: Duration,
}

impl WebSearch {
    /// Creates a web search provider. A missing key is not an error
    /// here; every fetch will report [`ProviderError::MissingCredentials`]
    /// so the caller can fall back.
    #[must_use]
    pub const fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self { api_key, timeout }
    }

    /// Creates a provider keyed from `TAVILY_API_KEY`.
    #[must_use]
    pub fn from_env(timeout: Duration) -> Self {
        let api_key = std::env::var(TAVILY_API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(api_key, timeout)
    }

    /// Whether a key is configured.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl EvidenceSource for WebSearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn fetch(&self, query: &str) -> Result<Lookup, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::MissingCredentials);
        };

        debug!(query = %query, timeout_secs = self.timeout.as_secs(), "dispatching web search");

        let request = SHARED_HTTP
            .post(TAVILY_ENDPOINT)
            .bearer_auth(api_key)
            .json(&SearchRequest {
                query,
                max_results: MAX_RESULTS,
                search_depth: SEARCH_DEPTH,
                include_raw_content: false,
            });

        let exchange = async {
            let response = request.send().await.map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })?;
            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::Transport {
                    message: format!("search API returned status {status}"),
                });
            }
            response
                .json::<SearchResponse>()
                .await
                .map_err(|e| ProviderError::Transport {
                    message: format!("malformed search response: {e}"),
                })
        };

        let body = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ProviderError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        if body.results.is_empty() {
            return Ok(Lookup::Empty);
        }
        Ok(Lookup::Found(format_results(query, &body.results)))
    }
}

/// Flattens search results into the block handed to summarization.
fn format_results(query: &str, results: &[SearchResult]) -> String {
    let mut output = format!("Résultats de recherche pour: {query}\n\n");
    for (i, result) in results.iter().enumerate() {
        let title = result.title.as_deref().unwrap_or("Sans titre");
        let url = result.url.as_deref().unwrap_or("N/A");
        let content = result
            .content
            .as_deref()
            .unwrap_or("Pas de contenu disponible");
        output.push_str(&format!("\n--- SOURCE {}: {title} ---\n", i + 1));
        output.push_str(&format!("URL: {url}\n\n"));
        output.push_str(&format!("CONTENU:\n{content}\n\n"));
        output.push_str(&"-".repeat(80));
        output.push('\n');
    }
    output
}
