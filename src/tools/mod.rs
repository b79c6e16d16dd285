//! Evidence providers: web search and the local knowledge base.
//!
//! Providers share the [`EvidenceSource`] trait and report through a
//! typed contract instead of sentinel strings: a successful call yields
//! a [`Lookup`], a failed one a [`ProviderError`]. Provider failures are
//! recovered inside the gathering stage (fallback to the next source)
//! and never surface as run-level errors, so `ProviderError` has no
//! conversion into [`crate::error::ResearchError`].

pub mod knowledge;
pub mod web;

use async_trait::async_trait;
use thiserror::Error;

pub use knowledge::KnowledgeBase;
pub use web::WebSearch;

/// Outcome of a provider query that completed without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The provider returned usable text.
    Found(String),
    /// The provider answered but had nothing for this query.
    Empty,
}

/// A provider-level failure, always recovered by the caller.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider has no credentials configured.
    #[error("provider credentials missing")]
    MissingCredentials,

    /// The provider did not answer within the allowed window.
    #[error("search timed out after {seconds}s")]
    Timeout {
        /// Window that elapsed.
        seconds: u64,
    },

    /// The request failed in transit or the provider refused it.
    #[error("transport failure: {message}")]
    Transport {
        /// Provider or client error text.
        message: String,
    },
}

/// A queryable source of evidence text.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Fetches evidence for one query.
    async fn fetch(&self, query: &str) -> Result<Lookup, ProviderError>;
}
