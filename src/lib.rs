//! dossier-rs: AI research concierge.
//!
//! Answers a research question in three stages: an analyzer decomposes
//! the question into sub-questions, a gatherer collects evidence for
//! each one concurrently (web search with a local knowledge fallback),
//! and a synthesizer composes a structured answer. Stage failures are
//! recorded in the run state and divert to a recovery stage that asks
//! the user to clarify instead of aborting the run.
//!
//! The pipeline is exposed two ways: the `dossier-rs` CLI and an axum
//! HTTP service (`POST /research`).
//!
//! # Modules
//!
//! - [`core`]: run state, merge rules, and stage routing.
//! - [`agent`]: the stage agents, prompts, and the orchestrator.
//! - [`tools`]: evidence sources behind the [`tools::EvidenceSource`] trait.
//! - [`server`]: the HTTP surface.
//! - [`cli`]: argument parsing and command dispatch.

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
pub mod server;
pub mod tools;

pub use agent::{Orchestrator, ResearchConfig, RunOverrides};
pub use core::state::{ResearchReport, ResearchState};
pub use error::{ResearchError, Result};
