//! Core state machine types: run state, merge rules, and routing.

pub mod routing;
pub mod state;

pub use routing::{Next, Stage, route_after_analyze, route_after_gather};
pub use state::{
    ResearchReport, ResearchState, Speaker, StateUpdate, TranscriptEntry, pipeline_entry,
    user_entry,
};
