//! Prompt templates and builders for the pipeline stages.
//!
//! Each stage owns one template with named `{placeholders}`; the
//! builders substitute run values into a copy. Templates can be
//! overridden per deployment through [`PromptSet::load`].

use std::collections::HashMap;
use std::path::Path;

/// Template for the analyzing stage. Requests a JSON object because the
/// analyzer runs with JSON-formatted output enabled.
pub const ANALYZE_PROMPT: &str = r#"Tu es un assistant de recherche. Analyse la question de l'utilisateur et détermine comment y répondre.

Question de l'utilisateur : {user_query}

Instructions :
- Si la question est simple et directe, retourne-la telle quelle ou légèrement reformulée
- Si la question est complexe ou nécessite plusieurs aspects, décompose-la en 2-5 sous-questions concrètes et indépendantes
- Chaque sous-question doit être spécifique et recherchable
- Évite les duplications et les questions trop génériques

Réponds uniquement avec un objet JSON de la forme {"sub_questions": ["question 1", "question 2"]}.
"#;

/// Template for per-result summarization in the gathering stage.
pub const GATHER_PROMPT: &str = r"Tu collectes des preuves pour une sous-question de recherche.
Extrais les faits clés pertinents des résultats de recherche fournis.

Sous-question : {sub_question}
Résultats de recherche :
{tool_result}

Retourne une liste concise des faits les plus pertinents sous forme de bullet points.
";

/// Template for the synthesizing stage.
pub const SYNTHESIZE_PROMPT: &str = r"Tu es un assistant de recherche qui synthétise des résultats.

Question de l'utilisateur : {user_query}

Sous-questions traitées :
{formatted_sub_questions}

Résultats par sous-question :
{formatted_evidence}

Rédige une réponse structurée avec cette forme :

# [Titre basé sur la question]

## Résumé exécutif
- 2-4 points clés synthétisant les principales conclusions

## Détails par sous-thème
- Développe chaque sous-question avec les résultats obtenus
- Utilise des paragraphes courts ou des bullet points

## Limites et incertitudes
- Mentionne les lacunes dans les données
- Indique les hypothèses faites
- Signale les informations manquantes

Reste factuel et concis. Utilise un ton professionnel.
";

/// Template for the recovery stage.
pub const RECOVERY_PROMPT: &str = r"Nous n'avons pas pu rassembler suffisamment d'informations pour répondre à : {user_query}

Raison : {error}

Propose une question de clarification à l'utilisateur OU suggère un angle plus précis pour la recherche.
Sois constructif et aide l'utilisateur à reformuler sa demande.
";

/// Default prompt directory under user config.
const DEFAULT_PROMPT_DIR: &str = ".config/dossier-rs/prompts";

/// Filenames for each prompt template.
const ANALYZE_FILENAME: &str = "analyze.md";
/// Filename for the gathering summarization template.
const GATHER_FILENAME: &str = "gather.md";
/// Filename for the synthesizing template.
const SYNTHESIZE_FILENAME: &str = "synthesize.md";
/// Filename for the recovery template.
const RECOVERY_FILENAME: &str = "recovery.md";

/// The set of prompt templates for all stages.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults. Use [`PromptSet::load`] to resolve the prompt
/// directory from CLI flags, environment variables, or the default path.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// Template for the analyzing stage.
    pub analyze: String,
    /// Template for per-result summarization.
    pub gather: String,
    /// Template for the synthesizing stage.
    pub synthesize: String,
    /// Template for the recovery stage.
    pub recovery: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for `prompt_dir`:
    /// 1. Explicit `prompt_dir` argument (from `--prompt-dir` CLI flag)
    /// 2. `DOSSIER_PROMPT_DIR` environment variable
    /// 3. `~/.config/dossier-rs/prompts/`
    ///
    /// Each file is loaded independently — a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(std::path::PathBuf::from)
            .or_else(|| {
                std::env::var("DOSSIER_PROMPT_DIR")
                    .ok()
                    .map(std::path::PathBuf::from)
            })
            .or_else(|| dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR)));

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            analyze: load_file(ANALYZE_FILENAME, ANALYZE_PROMPT),
            gather: load_file(GATHER_FILENAME, GATHER_PROMPT),
            synthesize: load_file(SYNTHESIZE_FILENAME, SYNTHESIZE_PROMPT),
            recovery: load_file(RECOVERY_FILENAME, RECOVERY_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            analyze: ANALYZE_PROMPT.to_string(),
            gather: GATHER_PROMPT.to_string(),
            synthesize: SYNTHESIZE_PROMPT.to_string(),
            recovery: RECOVERY_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten — use this for initial scaffolding only.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<std::path::PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (ANALYZE_FILENAME, ANALYZE_PROMPT),
            (GATHER_FILENAME, GATHER_PROMPT),
            (SYNTHESIZE_FILENAME, SYNTHESIZE_PROMPT),
            (RECOVERY_FILENAME, RECOVERY_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    ///
    /// Returns `None` if the home directory cannot be determined.
    #[must_use]
    pub fn default_dir() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

/// Builds the analyzing stage message.
#[must_use]
pub fn build_analyze_prompt(template: &str, user_query: &str) -> String {
    template.replace("{user_query}", user_query)
}

/// Builds the summarization message for one sub-question.
#[must_use]
pub fn build_gather_prompt(template: &str, sub_question: &str, tool_result: &str) -> String {
    template
        .replace("{sub_question}", sub_question)
        .replace("{tool_result}", tool_result)
}

/// Builds the synthesizing stage message.
///
/// Sub-questions are listed in analyzer order; evidence entries follow
/// the same order, skipping sub-questions that produced none.
#[must_use]
pub fn build_synthesize_prompt(
    template: &str,
    user_query: &str,
    sub_questions: &[String],
    evidence: &HashMap<String, String>,
) -> String {
    let formatted_sub_questions = sub_questions
        .iter()
        .map(|q| format!("- {q}"))
        .collect::<Vec<_>>()
        .join("\n");

    let formatted_evidence = sub_questions
        .iter()
        .filter_map(|q| evidence.get(q).map(|text| format!("- {q}:\n  {text}")))
        .collect::<Vec<_>>()
        .join("\n");

    template
        .replace("{user_query}", user_query)
        .replace("{formatted_sub_questions}", &formatted_sub_questions)
        .replace("{formatted_evidence}", &formatted_evidence)
}

/// Builds the recovery stage message.
#[must_use]
pub fn build_recovery_prompt(template: &str, user_query: &str, error: &str) -> String {
    template
        .replace("{user_query}", user_query)
        .replace("{error}", error)
}
