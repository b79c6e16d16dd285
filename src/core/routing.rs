//! Stage routing for the research state machine.
//!
//! Transitions are pure functions of the state. Every stage maps to an
//! explicit [`Next`] verdict through an exhaustive match, so the set of
//! reachable paths is closed:
//!
//! ```text
//! Analyzing ──▶ Gathering ──▶ Synthesizing ──▶ (terminal)
//!     │             │
//!     └──▶ Erroring ◀┘            Erroring ──▶ (terminal)
//! ```

use std::fmt;

use super::state::ResearchState;

/// Pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Decomposing the question into sub-questions.
    Analyzing,
    /// Collecting evidence per sub-question.
    Gathering,
    /// Composing the final answer.
    Synthesizing,
    /// Producing the recovery message.
    Erroring,
}

impl Stage {
    /// Routing verdict after this stage completes.
    #[must_use]
    pub fn route(self, state: &ResearchState) -> Next {
        match self {
            Self::Analyzing => route_after_analyze(state),
            Self::Gathering => route_after_gather(state),
            Self::Synthesizing | Self::Erroring => Next::Terminal,
        }
    }

    /// Stage name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Analyzing => "analyzing",
            Self::Gathering => "gathering",
            Self::Synthesizing => "synthesizing",
            Self::Erroring => "erroring",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the state machine goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Proceed to evidence gathering.
    Gather,
    /// Proceed to synthesis.
    Synthesize,
    /// Divert to the recovery stage.
    Error,
    /// The run is over.
    Terminal,
}

/// Verdict after the analyzing stage.
///
/// Any recorded error or an empty decomposition diverts to recovery.
#[must_use]
pub fn route_after_analyze(state: &ResearchState) -> Next {
    if state.error.is_some() || state.sub_questions.is_empty() {
        Next::Error
    } else {
        Next::Gather
    }
}

/// Verdict after the gathering stage.
///
/// Any recorded error or an empty evidence map diverts to recovery.
#[must_use]
pub fn route_after_gather(state: &ResearchState) -> Next {
    if state.error.is_some() || state.evidence.is_empty() {
        Next::Error
    } else {
        Next::Synthesize
    }
}
