//! Input contracts for the engine.
//!
//! Hosts build these and pass them into `Engine::update()` each tick; they are
//! applied before any timeline advances.

use serde::{Deserialize, Serialize};

use crate::scoreboard::Objective;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    #[serde(default)]
    pub commands: Vec<TimelineCommand>,
}

impl Inputs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: TimelineCommand) -> Self {
        self.commands.push(command);
        self
    }
}

/// External writes to a timeline's registers. Unknown names create their entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TimelineCommand {
    SetScore {
        timeline: String,
        objective: Objective,
        value: i32,
    },
    AddScore {
        timeline: String,
        objective: Objective,
        delta: i32,
    },
    /// Zero both registers.
    Reset { timeline: String },
}
