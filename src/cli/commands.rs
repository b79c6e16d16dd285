//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::path::Path;
use std::sync::Arc;

use crate::agent::prompt::PromptSet;
use crate::agent::{Orchestrator, ResearchConfig, RunOverrides, create_provider};
use crate::cli::output::{OutputFormat, format_run};
use crate::cli::parser::{Cli, Commands};
use crate::core::state::ResearchReport;
use crate::error::{ResearchError, Result};
use crate::server::{self, ServeConfig};

/// Parameters for the ask command.
#[derive(Debug, Clone, Default)]
pub struct AskParams<'a> {
    /// The research question.
    pub query: &'a str,
    /// Model selector (`provider:model` or a bare model name).
    pub model: Option<&'a str>,
    /// Maximum completion tokens per model call.
    pub max_tokens: Option<u32>,
    /// Directory containing prompt template files.
    pub prompt_dir: Option<&'a Path>,
    /// Print the run transcript after the answer.
    pub show_transcript: bool,
}

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success. An empty string means the
/// command produced no output to print.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask {
            query,
            model,
            max_tokens,
            show_transcript,
        } => {
            let params = AskParams {
                query,
                model: model.as_deref(),
                max_tokens: *max_tokens,
                prompt_dir: cli.prompt_dir.as_deref(),
                show_transcript: *show_transcript,
            };
            cmd_ask(&params, format).await
        }
        Commands::Serve { host, port } => {
            cmd_serve(host.as_deref(), *port, cli.prompt_dir.as_deref()).await
        }
        Commands::InitPrompts { dir } => {
            cmd_init_prompts(dir.as_deref().or(cli.prompt_dir.as_deref()), format)
        }
    }
}

/// Builds an orchestrator from environment configuration plus the
/// global prompt directory override.
fn build_orchestrator(prompt_dir: Option<&Path>) -> Result<Orchestrator> {
    let mut builder = ResearchConfig::builder().from_env();
    if let Some(dir) = prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    let config = builder.build()?;
    let provider = create_provider(&config)?;
    Ok(Orchestrator::new(Arc::from(provider), config))
}

async fn cmd_ask(params: &AskParams<'_>, format: OutputFormat) -> Result<String> {
    let orchestrator = build_orchestrator(params.prompt_dir)?;

    let overrides = RunOverrides {
        model: params.model.map(String::from),
        max_tokens: params.max_tokens,
    };

    let state = orchestrator.run(params.query, &overrides).await?;

    match format {
        OutputFormat::Text => Ok(format_run(&state, params.show_transcript)),
        OutputFormat::Json => serde_json::to_string_pretty(&ResearchReport::from_state(&state))
            .map_err(|e| ResearchError::Orchestration {
                message: format!("JSON serialization failed: {e}"),
            }),
    }
}

async fn cmd_serve(
    host: Option<&str>,
    port: Option<u16>,
    prompt_dir: Option<&Path>,
) -> Result<String> {
    let mut config = ServeConfig::from_env();
    if let Some(host) = host {
        config.host = host.to_string();
    }
    if let Some(port) = port {
        config.port = port;
    }

    let orchestrator = Arc::new(build_orchestrator(prompt_dir)?);
    server::serve(orchestrator, config).await?;
    Ok(String::new())
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(std::path::PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| ResearchError::Orchestration {
            message: "could not determine home directory for default prompt path".to_string(),
        })?;

    let written =
        PromptSet::write_defaults(&target_dir).map_err(|e| ResearchError::Orchestration {
            message: format!("failed to write prompt templates: {e}"),
        })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ))
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    output.push_str(&format!(
                        "  {}\n",
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown")
                    ));
                }
                output.push_str("\nEdit these files to customize stage prompts.\n");
                Ok(output)
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            serde_json::to_string_pretty(&json).map_err(|e| ResearchError::Orchestration {
                message: format!("JSON serialization failed: {e}"),
            })
        }
    }
}
