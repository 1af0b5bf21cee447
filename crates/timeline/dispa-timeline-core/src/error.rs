//! Error types for building and loading timelines.
//!
//! Ticking never fails; these only surface while constructing rule tables,
//! registering them with an [`Engine`](crate::Engine), or reading config.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum TimelineError {
    #[error("timeline '{timeline}' has no rules")]
    EmptyTimeline { timeline: String },

    #[error("name '{name}' is invalid: only A-Z, a-z, 0-9, '_' and '-' are allowed")]
    InvalidName { name: String },

    #[error("tick offset {tick} in timeline '{timeline}' exceeds the counter range")]
    OffsetOutOfRange { timeline: String, tick: u32 },

    #[error("non-finite {field} value in timeline '{timeline}' at tick {tick}")]
    NonFinite {
        timeline: String,
        tick: u32,
        field: &'static str,
    },

    #[error("end tick {end} of timeline '{timeline}' precedes its last rule at {last}")]
    EndBeforeLastRule {
        timeline: String,
        end: u32,
        last: u32,
    },

    #[error("timeline '{timeline}' is already registered")]
    DuplicateTimeline { timeline: String },

    #[error("stored timeline parse error: {0}")]
    Parse(String),

    #[error("invalid action at tick {tick} in timeline '{timeline}': {reason}")]
    InvalidAction {
        timeline: String,
        tick: u32,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
