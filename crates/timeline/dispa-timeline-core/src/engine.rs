//! Engine: owns registered rule tables and their registers, and advances them
//! in lockstep with the host clock.
//!
//! Methods:
//! - new, register / with_timeline, update (inputs -> gated tick of every timeline), tick_one

use indexmap::IndexMap;
use log::{debug, warn};

use crate::config::{Config, TickGate};
use crate::data::TimelineTable;
use crate::error::TimelineError;
use crate::host::EntityHost;
use crate::inputs::{Inputs, TimelineCommand};
use crate::outputs::{Outputs, TimelineEvent};
use crate::player::{tick, TickReport};
use crate::scoreboard::{Objective, Scoreboard, TimelineState};

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    // Registration order is tick order.
    tables: IndexMap<String, TimelineTable>,
    scores: Scoreboard,
    epoch: u64,

    // Per-tick outputs
    outputs: Outputs,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn push_event(outputs: &mut Outputs, cap: usize, event: TimelineEvent) {
    if outputs.events.len() < cap {
        outputs.events.push(event);
    } else {
        outputs.dropped_events += 1;
    }
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            tables: IndexMap::new(),
            scores: Scoreboard::new(),
            epoch: 0,
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Register a rule table. Its registers start at whatever the scoreboard
    /// already holds for that name (0 when never referenced).
    pub fn register(&mut self, table: TimelineTable) -> Result<(), TimelineError> {
        if self.tables.contains_key(table.name()) {
            return Err(TimelineError::DuplicateTimeline {
                timeline: table.name().to_string(),
            });
        }
        debug!(
            "registered timeline '{}' ({} rules, max offset {})",
            table.name(),
            table.len(),
            table.max_offset()
        );
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    pub fn with_timeline(mut self, table: TimelineTable) -> Result<Self, TimelineError> {
        self.register(table)?;
        Ok(self)
    }

    pub fn table(&self, name: &str) -> Option<&TimelineTable> {
        self.tables.get(name)
    }

    pub fn timeline_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn score(&self, timeline: &str, objective: Objective) -> i32 {
        self.scores.get(timeline, objective)
    }

    pub fn state(&self, timeline: &str) -> TimelineState {
        self.scores.state(timeline)
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scores
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn apply_inputs(&mut self, inputs: Inputs, host: &mut dyn EntityHost) {
        for cmd in inputs.commands {
            match cmd {
                TimelineCommand::SetScore {
                    timeline,
                    objective,
                    value,
                } => {
                    self.scores.set(&timeline, objective, value);
                    host.score_written(&timeline, objective, value);
                }
                TimelineCommand::AddScore {
                    timeline,
                    objective,
                    delta,
                } => {
                    let value = self.scores.add(&timeline, objective, delta);
                    host.score_written(&timeline, objective, value);
                }
                TimelineCommand::Reset { timeline } => {
                    *self.scores.state_mut(&timeline) = TimelineState::default();
                    host.score_written(&timeline, Objective::Timer, 0);
                    host.score_written(&timeline, Objective::Flags, 0);
                }
            }
        }
    }

    fn gate_allows(&self, timeline: &str) -> bool {
        match self.cfg.gate {
            TickGate::Always => true,
            TickGate::FlagsActive => self.scores.get(timeline, Objective::Flags) >= 1,
        }
    }

    /// One host tick: apply inputs, then advance every registered timeline the
    /// gate allows, in registration order.
    pub fn update(&mut self, inputs: Inputs, host: &mut dyn EntityHost) -> &Outputs {
        self.outputs.clear();
        self.epoch = self.epoch.wrapping_add(1);
        self.outputs.epoch = self.epoch;

        self.apply_inputs(inputs, host);

        let cap = self.cfg.max_events_per_tick;
        for (name, table) in &self.tables {
            if !self.gate_allows(name) {
                continue;
            }
            let report = tick(table, self.scores.state_mut(name), host);
            record_report(&mut self.outputs, cap, name, report);
        }

        if self.outputs.dropped_events > 0 {
            warn!(
                "dropped {} timeline events (max_events_per_tick = {})",
                self.outputs.dropped_events, cap
            );
        }
        &self.outputs
    }

    /// Advance a single timeline, bypassing the gate. `None` if the name is not registered.
    pub fn tick_one(&mut self, timeline: &str, host: &mut dyn EntityHost) -> Option<TickReport> {
        let table = self.tables.get(timeline)?;
        Some(tick(table, self.scores.state_mut(timeline), host))
    }

    /// Whether `update` would advance this timeline right now.
    pub fn is_active(&self, timeline: &str) -> bool {
        self.tables.contains_key(timeline) && self.gate_allows(timeline)
    }
}

fn record_report(outputs: &mut Outputs, cap: usize, timeline: &str, report: TickReport) {
    if report.fired > 0 {
        push_event(
            outputs,
            cap,
            TimelineEvent::RulesFired {
                timeline: timeline.to_string(),
                timer: report.timer,
                count: report.fired,
            },
        );
    }
    if report.reset {
        push_event(
            outputs,
            cap,
            TimelineEvent::CycleReset {
                timeline: timeline.to_string(),
                timer: report.timer,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Action, Rule};
    use crate::host::RecordingHost;
    use crate::value::TransformMerge;

    fn two_rule(name: &str, end: u32) -> TimelineTable {
        TimelineTable::new(
            name,
            vec![
                Rule::new(0, Action::merge("a", TransformMerge::scale(0, [1.0; 3]))),
                Rule::new(end, Action::merge("a", TransformMerge::scale(0, [2.0; 3]))),
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut eng = Engine::default();
        eng.register(two_rule("x", 2)).unwrap();
        assert_eq!(
            eng.register(two_rule("x", 3)),
            Err(TimelineError::DuplicateTimeline {
                timeline: "x".into()
            })
        );
    }

    #[test]
    fn event_cap_counts_dropped_events() {
        let mut eng = Engine::new(Config {
            gate: TickGate::Always,
            max_events_per_tick: 1,
        });
        eng.register(two_rule("a", 0)).unwrap();
        let mut host = RecordingHost::new();
        // One table at offset 0 = max offset: RulesFired + CycleReset.
        let out = eng.update(Inputs::none(), &mut host);
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.dropped_events, 1);
        assert_eq!(out.epoch, 1);
    }

    #[test]
    fn tick_one_ignores_gate() {
        let mut eng = Engine::new(Config {
            gate: TickGate::FlagsActive,
            ..Config::default()
        })
        .with_timeline(two_rule("g", 2))
        .unwrap();
        let mut host = RecordingHost::new();
        assert!(!eng.is_active("g"));
        assert!(eng.update(Inputs::none(), &mut host).is_empty());
        assert_eq!(eng.score("g", Objective::Timer), 0);

        let report = eng.tick_one("g", &mut host).unwrap();
        assert_eq!(report.fired, 1);
        assert_eq!(eng.score("g", Objective::Timer), 1);
        assert!(eng.tick_one("missing", &mut host).is_none());
    }
}
