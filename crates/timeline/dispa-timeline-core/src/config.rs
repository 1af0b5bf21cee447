//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which registered timelines [`Engine::update`](crate::Engine::update) advances.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickGate {
    /// Every timeline, every tick; tables loop forever.
    #[default]
    Always,
    /// Only timelines whose `flags` register is 1 or greater. The loop reset
    /// zeroes `flags`, so a gated timeline plays one cycle per activation.
    FlagsActive,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub gate: TickGate,
    /// Maximum events kept per update; the rest are dropped with a warning.
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gate: TickGate::Always,
            max_events_per_tick: 1024,
        }
    }
}

impl Config {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }
}
