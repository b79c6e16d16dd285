//! Staged research pipeline for dossier-rs.
//!
//! Provides an LLM-powered workflow that decomposes a question, gathers
//! evidence per sub-question, and synthesizes a structured answer. Uses
//! a pluggable provider abstraction backed by OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! User query → Orchestrator
//!   ├── Analyzer (decomposes into sub-questions, JSON mode)
//!   ├── Gatherer (fan-out → N concurrent evidence fetches
//!   │   with source fallback, then per-result summaries)
//!   ├── Synthesizer → final markdown answer
//!   └── Recovery (clarification when an earlier stage failed)
//! ```
//!
//! Routing between stages is pure state inspection; see
//! [`crate::core::routing`].

pub mod analyzer;
pub mod client;
pub mod config;
pub mod gatherer;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod recovery;
pub mod synthesizer;
pub mod traits;

// Re-export key types
pub use analyzer::Analyzer;
pub use client::{ModelSpec, create_provider};
pub use config::ResearchConfig;
pub use gatherer::Gatherer;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{Orchestrator, RunOverrides, RunSettings};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use recovery::Recovery;
pub use synthesizer::Synthesizer;
pub use traits::{Agent, AgentResponse};
