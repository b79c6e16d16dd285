//! Output formatting for CLI results.
//!
//! Text rendering of finished research runs, plus the format selector
//! shared by all commands.

use crate::core::state::{ResearchState, Speaker};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name. Unknown names fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Renders a finished run as human-readable text.
///
/// The answer body is followed by a one-line stats footer. When the run
/// recovered from a stage failure, the recorded failure is shown after
/// the footer so the clarification text is not mistaken for a real
/// answer.
#[must_use]
pub fn format_run(state: &ResearchState, show_transcript: bool) -> String {
    let mut output = String::from("--- Réponse ---\n\n");
    match (&state.final_answer, &state.error) {
        (Some(answer), _) => output.push_str(answer),
        (None, Some(error)) => output.push_str(&error.user_message()),
        (None, None) => output.push_str("(aucune réponse)"),
    }

    output.push_str(&format!(
        "\n\n---\nSous-questions: {} | Preuves: {}",
        state.sub_questions.len(),
        state.evidence.len()
    ));
    if let (Some(_), Some(error)) = (&state.final_answer, &state.error) {
        output.push_str(&format!("\nIncident: {}", error.user_message()));
    }

    if show_transcript {
        output.push_str("\n\n--- Transcription ---");
        for entry in &state.transcript {
            let speaker = match entry.speaker {
                Speaker::User => "utilisateur",
                Speaker::Pipeline => "pipeline",
            };
            output.push_str(&format!("\n[{speaker}] {}", entry.text));
        }
    }

    output
}

/// Prints the final output of a command.
#[allow(clippy::print_stdout)]
pub fn print_output(output: &str) {
    println!("{output}");
}
