//! Command-text adapter for the timeline player.
//!
//! [`CommandHost`] turns every host call into one command line, in the order the
//! player issues them. Useful for exporting a timeline to a datapack-style
//! function listing or for diffing a tick's output in tests.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dispa_timeline_core::{
    BlockPos, ConfigError, EntityHost, EntityKind, EntityState, Objective, Selector,
    TransformMerge,
};

pub mod render;

pub use render::tick_dispatch_line;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Function namespace used by the tick dispatch line.
    pub namespace: String,
    /// Emit `scoreboard` lines for register writes.
    pub emit_scores: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            namespace: "de".to_string(),
            emit_scores: true,
        }
    }
}

impl CommandConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }
}

#[derive(Debug, Default)]
pub struct CommandHost {
    cfg: CommandConfig,
    lines: Vec<String>,
}

impl CommandHost {
    pub fn new(cfg: CommandConfig) -> Self {
        Self {
            cfg,
            lines: Vec::new(),
        }
    }

    pub fn config(&self) -> &CommandConfig {
        &self.cfg
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drain the lines emitted so far.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Gated dispatch line for `timeline` in this host's namespace.
    pub fn dispatch_line(&self, timeline: &str, function_path: &str) -> String {
        tick_dispatch_line(timeline, &self.cfg.namespace, function_path)
    }

    fn push(&mut self, line: String) {
        log::trace!("command: {line}");
        self.lines.push(line);
    }
}

impl EntityHost for CommandHost {
    fn merge_transform(&mut self, target: &Selector, merge: &TransformMerge) {
        self.push(render::merge_transform(target, merge));
    }

    fn summon(&mut self, kind: EntityKind, tags: &BTreeSet<String>, at: Option<&Selector>) {
        self.push(render::summon(kind, tags, at));
    }

    fn set_entity_state(&mut self, target: &Selector, payload: &EntityState) {
        self.push(render::set_entity_state(target, payload));
    }

    fn set_block(&mut self, position: BlockPos, block_id: &str) {
        self.push(render::set_block(position, block_id));
    }

    fn score_written(&mut self, timeline: &str, objective: Objective, value: i32) {
        if self.cfg.emit_scores {
            self.push(render::score_set(timeline, objective, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispa_timeline_core::{dispatch, Action};

    #[test]
    fn config_defaults_and_partial_json() {
        let cfg = CommandConfig::from_json_str(r#"{ "namespace": "anims" }"#).unwrap();
        assert_eq!(cfg.namespace, "anims");
        assert!(cfg.emit_scores);
        assert_eq!(CommandConfig::from_json_str("{}").unwrap(), CommandConfig::default());
        assert!(CommandConfig::from_json_str(r#"{ "emit_scores": "yes" }"#).is_err());
    }

    #[test]
    fn summon_and_setblock_lines() {
        let mut host = CommandHost::default();
        dispatch(
            &mut host,
            &Action::SummonEntity {
                kind: EntityKind::ItemDisplay,
                tags: ["obj", "obj-sword"].iter().map(|s| s.to_string()).collect(),
                at: Some(Selector::tag("obj-body")),
            },
        );
        dispatch(&mut host, &Action::set_block([10, 64, -3], "minecraft:stone"));
        assert_eq!(
            host.take_lines(),
            vec![
                r#"execute at @e[tag=obj-body] run summon minecraft:item_display ~ ~ ~ {Tags:["obj","obj-sword"]}"#,
                "setblock 10 64 -3 minecraft:stone",
            ]
        );
        assert!(host.lines().is_empty());
    }

    #[test]
    fn score_lines_follow_config() {
        let mut host = CommandHost::new(CommandConfig {
            emit_scores: false,
            ..CommandConfig::default()
        });
        host.score_written("obj-anim", Objective::Timer, 3);
        assert!(host.lines().is_empty());

        let mut host = CommandHost::default();
        host.score_written("obj-anim", Objective::Flags, 0);
        assert_eq!(host.lines(), ["scoreboard players set $obj-anim flags 0"]);
        assert_eq!(
            host.dispatch_line("obj-anim", "objects/obj/anim"),
            "execute if score $obj-anim flags matches 1.. run function de:objects/obj/anim"
        );
    }
}
