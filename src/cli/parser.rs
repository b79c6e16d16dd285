//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dossier-rs: AI research concierge.
///
/// Decomposes a research question into sub-questions, gathers evidence
/// for each through web search with a local knowledge fallback, and
/// synthesizes a structured answer.
#[derive(Parser, Debug)]
#[command(name = "dossier-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory containing prompt template files.
    ///
    /// Defaults to `~/.config/dossier-rs/prompts/`.
    #[arg(long, global = true, env = "DOSSIER_PROMPT_DIR")]
    pub prompt_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a research question through the full pipeline.
    ///
    /// Decomposes the question into sub-questions, gathers evidence for
    /// each concurrently, and synthesizes a structured answer. Requires
    /// an OpenAI-compatible API key.
    #[command(after_help = r#"Examples:
  dossier-rs ask "Quels sont les avantages de Rust pour un service web ?"
  dossier-rs ask "Comparer PostgreSQL et SQLite" --model openai:gpt-4o
  dossier-rs ask "Expliquer WebAssembly" --max-tokens 4000
  dossier-rs ask "Qu'est-ce que LangGraph ?" --show-transcript
  dossier-rs --format json ask "Résumer Rust" | jq '.final_answer'
  OPENAI_API_KEY=sk-... TAVILY_API_KEY=tvly-... dossier-rs ask "..."
"#)]
    Ask {
        /// The research question.
        query: String,

        /// Model selector (`provider:model` or a bare model name).
        #[arg(long)]
        model: Option<String>,

        /// Maximum completion tokens per model call.
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Print the run transcript after the answer.
        #[arg(long)]
        show_transcript: bool,
    },

    /// Start the HTTP research service.
    #[command(after_help = r#"Examples:
  dossier-rs serve                             # Listen on 127.0.0.1:8080
  dossier-rs serve --host 0.0.0.0 --port 3000
  DOSSIER_PORT=9090 dossier-rs serve           # Port from the environment
"#)]
    Serve {
        /// Host to bind to (default: 127.0.0.1, env: DOSSIER_HOST).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default: 8080, env: DOSSIER_PORT).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Write default prompt templates to disk for customization.
    ///
    /// Creates markdown template files in the prompt directory so users
    /// can customize stage prompts without recompiling.
    #[command(name = "init-prompts")]
    #[command(after_help = r#"Examples:
  dossier-rs init-prompts                      # Write to ~/.config/dossier-rs/prompts/
  dossier-rs init-prompts --dir ./my-prompts   # Write to custom directory
"#)]
    InitPrompts {
        /// Target directory for prompt templates.
        ///
        /// Defaults to `~/.config/dossier-rs/prompts/`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}
