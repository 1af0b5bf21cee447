//! Output contracts from the engine.
//!
//! Entity writes go straight to the host during the update; outputs only carry
//! the discrete events of the tick.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum TimelineEvent {
    /// `count` actions were dispatched at `timer`.
    RulesFired {
        timeline: String,
        timer: i32,
        count: usize,
    },
    /// The loop reset fired while the counter read `timer`.
    CycleReset { timeline: String, timer: i32 },
}

/// Outputs returned by `Engine::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    /// Number of updates performed so far, this one included.
    pub epoch: u64,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    /// Events discarded because `max_events_per_tick` was reached.
    #[serde(default)]
    pub dropped_events: usize,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped_events = 0;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
