//! Local knowledge base, the deterministic fallback provider.
//!
//! Entries are matched by key-token containment against the lowercased
//! query: first an all-tokens pass, then an any-token pass, scanning in
//! insertion order so earlier entries win ties. Tokens match as
//! substrings, so the key token `sme` also matches a query mentioning
//! "SMEs".

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use super::{EvidenceSource, Lookup, ProviderError};

const PYTHON_VS_JAVASCRIPT_BACKEND: &str = "Performance: Python excelle avec les bibliothèques CPU-bound (NumPy, Pandas) mais nécessite async pour I/O;
JS/Node est fort pour les workloads I/O-bound avec event loop.

Écosystème: Python dispose de frameworks web matures (Django/FastAPI); JS a Express/NestJS,
plus alignement full-stack avec le frontend.

Courbe d'apprentissage: Syntaxe Python conviviale pour débutants; JavaScript a des nuances
async/event et quirks legacy des navigateurs.

Déploiement: Tous deux se conteneurisent bien; Python se marie souvent avec serveurs WSGI/ASGI;
apps Node se déploient en single process ou serverless handlers.

Recrutement/communauté: Communautés larges; Python fort en data/ML, JS fort en web/front-to-back.
";

const CYBERSECURITY_SME: &str = "Ransomware ciblant les PME reste prévalent; backups et formation phishing sont des mitigations primaires.

Adoption MFA est un quick win majeur pour réduire les risques de prise de contrôle de compte.

Outils de détection endpoint/EDR deviennent de plus en plus abordables pour les PME.

Services MDR (Managed Detection and Response) comblent les lacunes en personnel.

Réglementations: NIS2 (UE) et règles sectorielles poussent les PME à adopter des contrôles de base.

Posture cloud: mauvaises configurations (buckets S3 ouverts, IAM faible) restent des incidents courants.
";

const OPEN_SOURCE_VS_PROPRIETARY_MODELS: &str = "Avantages (open): transparence, self-hosting pour contrôle des données, flexibilité des coûts,
améliorations community-driven.

Limites (open): besoin d'infra/ops pour le serving; peut être en retard sur les modèles propriétaires
de pointe en termes de capacités.

Avantages (propriétaire): instruction-following de plus haute qualité, safety/guardrails intégrés,
hébergement clé en main.

Limites (propriétaire): vendor lock-in, préoccupations de résidence des données, coûts basés
sur l'usage et rate limits.

Hybride: certaines équipes prototypent avec modèles open localement et déploient du propriétaire
pour les SLAs production.
";

/// One curated entry.
#[derive(Debug, Clone)]
struct KnowledgeEntry {
    /// Lowercased key tokens used for matching.
    tokens: Vec<String>,
    /// Evidence text returned on a match.
    text: String,
}

/// Curated, in-memory evidence source.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Builds the compiled-in knowledge base.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries([
            ("python vs javascript backend", PYTHON_VS_JAVASCRIPT_BACKEND),
            ("cybersecurity sme", CYBERSECURITY_SME),
            (
                "open source vs proprietary models",
                OPEN_SOURCE_VS_PROPRIETARY_MODELS,
            ),
        ])
    }

    /// Builds a knowledge base from `(key, text)` pairs, preserving
    /// iteration order for tie-breaking.
    pub fn from_entries<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, text)| KnowledgeEntry {
                tokens: key
                    .to_lowercase()
                    .unicode_words()
                    .map(ToString::to_string)
                    .collect(),
                text: text.to_string(),
            })
            .collect();
        Self { entries }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the base holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first entry whose key matches the topic, trying full
    /// key-token containment before partial containment.
    fn lookup(&self, topic: &str) -> Option<&str> {
        let topic = topic.to_lowercase();
        self.entries
            .iter()
            .find(|entry| {
                !entry.tokens.is_empty()
                    && entry.tokens.iter().all(|token| topic.contains(token.as_str()))
            })
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|entry| entry.tokens.iter().any(|token| topic.contains(token.as_str())))
            })
            .map(|entry| entry.text.as_str())
    }
}

#[async_trait]
impl EvidenceSource for KnowledgeBase {
    fn name(&self) -> &str {
        "knowledge-base"
    }

    async fn fetch(&self, query: &str) -> Result<Lookup, ProviderError> {
        Ok(match self.lookup(query) {
            Some(text) => Lookup::Found(text.to_string()),
            None => Lookup::Empty,
        })
    }
}
