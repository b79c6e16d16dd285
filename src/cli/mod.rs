//! CLI layer for dossier-rs.
//!
//! Provides the command-line interface using clap, with commands for
//! running research questions, serving the HTTP API, and managing
//! prompt templates.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
