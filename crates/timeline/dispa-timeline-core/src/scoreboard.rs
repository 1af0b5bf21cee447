//! Per-timeline integer registers.
//!
//! Each timeline owns a `timer` and a `flags` register. Unreferenced registers
//! read as 0; an entry is created on first write and never removed here.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Timer,
    Flags,
}

impl Objective {
    pub fn name(&self) -> &'static str {
        match self {
            Objective::Timer => "timer",
            Objective::Flags => "flags",
        }
    }
}

/// Mutable state of one timeline.
///
/// `timer` advances by exactly 1 per tick, except for the loop reset to the
/// sentinel `-1`. `flags` is an auxiliary register zeroed at every reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineState {
    pub timer: i32,
    pub flags: i32,
}

impl TimelineState {
    pub fn get(&self, objective: Objective) -> i32 {
        match objective {
            Objective::Timer => self.timer,
            Objective::Flags => self.flags,
        }
    }

    pub fn set(&mut self, objective: Objective, value: i32) {
        match objective {
            Objective::Timer => self.timer = value,
            Objective::Flags => self.flags = value,
        }
    }

    /// Wrapping add, returning the new value.
    pub fn add(&mut self, objective: Objective, delta: i32) -> i32 {
        let value = self.get(objective).wrapping_add(delta);
        self.set(objective, value);
        value
    }
}

/// Registers keyed by timeline name.
#[derive(Clone, Debug, Default)]
pub struct Scoreboard {
    entries: HashMap<String, TimelineState>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value, 0 when the timeline was never referenced.
    pub fn get(&self, timeline: &str, objective: Objective) -> i32 {
        self.entries
            .get(timeline)
            .map(|s| s.get(objective))
            .unwrap_or(0)
    }

    pub fn set(&mut self, timeline: &str, objective: Objective, value: i32) {
        self.state_mut(timeline).set(objective, value);
    }

    pub fn add(&mut self, timeline: &str, objective: Objective, delta: i32) -> i32 {
        self.state_mut(timeline).add(objective, delta)
    }

    /// Snapshot of a timeline's registers (defaults when unreferenced).
    pub fn state(&self, timeline: &str) -> TimelineState {
        self.entries.get(timeline).copied().unwrap_or_default()
    }

    /// Mutable registers, creating the entry on first reference.
    pub fn state_mut(&mut self, timeline: &str) -> &mut TimelineState {
        self.entries.entry_ref(timeline).or_default()
    }

    pub fn contains(&self, timeline: &str) -> bool {
        self.entries.contains_key(timeline)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
