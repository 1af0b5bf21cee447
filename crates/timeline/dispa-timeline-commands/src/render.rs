//! Command text for each host primitive.
//!
//! Floats inside NBT records carry the `f` suffix (`[1f,0f,0f]`); coordinates in
//! `tp`/`setblock` are plain numbers.

use std::collections::BTreeSet;

use dispa_timeline_core::{EntityKind, EntityState, Objective, Selector, TransformMerge};

fn nbt_float(v: f32) -> String {
    format!("{v}f")
}

fn nbt_floats(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| nbt_float(*v)).collect();
    format!("[{}]", parts.join(","))
}

/// JSON string literal (quoted and escaped).
fn quoted(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// Body of a single-quoted SNBT string; the game unescapes `\\` and `\'`.
fn snbt_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn selector(sel: &Selector) -> String {
    format!("@e[tag={}]", sel.as_tag())
}

pub fn scoreboard_holder(timeline: &str) -> String {
    format!("${timeline}")
}

pub fn merge_transform(target: &Selector, merge: &TransformMerge) -> String {
    format!(
        "execute as {} run data merge entity @s {{start_interpolation:{},interpolation_duration:{},transformation:{{{}:{}}}}}",
        selector(target),
        merge.start_interpolation,
        merge.interpolation_duration,
        merge.channel.field_name(),
        nbt_floats(merge.channel.components()),
    )
}

pub fn summon(kind: EntityKind, tags: &BTreeSet<String>, at: Option<&Selector>) -> String {
    let tags: Vec<String> = tags.iter().map(|t| quoted(t)).collect();
    let cmd = format!(
        "summon minecraft:{} ~ ~ ~ {{Tags:[{}]}}",
        kind.id(),
        tags.join(",")
    );
    match at {
        Some(at) => format!("execute at {} run {cmd}", selector(at)),
        None => cmd,
    }
}

pub fn set_entity_state(target: &Selector, payload: &EntityState) -> String {
    let sel = selector(target);
    match payload {
        EntityState::Block { id, properties } => {
            let props = if properties.is_empty() {
                String::new()
            } else {
                let kv: Vec<String> = properties
                    .iter()
                    .map(|(k, v)| format!("{k}:{}", quoted(v)))
                    .collect();
                format!(",Properties:{{{}}}", kv.join(","))
            };
            format!(
                "execute as {sel} run data merge entity @s {{block_state:{{Name:{}{props}}}}}",
                quoted(id)
            )
        }
        EntityState::Item { item } => {
            format!("item replace entity {sel} container.0 with {item}")
        }
        EntityState::Text { text } => {
            let component = snbt_single_quoted(&quoted(text));
            format!("execute as {sel} run data merge entity @s {{text:'{component}'}}")
        }
        EntityState::Offset { offset } => format!(
            "execute as {sel} at @s run tp @s ~{} ~{} ~{}",
            offset[0], offset[1], offset[2]
        ),
    }
}

pub fn set_block(position: [i32; 3], block_id: &str) -> String {
    format!(
        "setblock {} {} {} {block_id}",
        position[0], position[1], position[2]
    )
}

pub fn score_set(timeline: &str, objective: Objective, value: i32) -> String {
    format!(
        "scoreboard players set {} {} {value}",
        scoreboard_holder(timeline),
        objective.name()
    )
}

/// Line of the host's per-tick function that runs a timeline's function while its flags are set.
pub fn tick_dispatch_line(timeline: &str, namespace: &str, function_path: &str) -> String {
    format!(
        "execute if score {} flags matches 1.. run function {namespace}:{function_path}",
        scoreboard_holder(timeline)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispa_timeline_core::TransformChannel;

    #[test]
    fn merge_uses_suffixed_floats() {
        let line = merge_transform(
            &Selector::tag("dtest-a"),
            &TransformMerge {
                start_interpolation: 0,
                interpolation_duration: 20,
                channel: TransformChannel::LeftRotation([0.0, 0.70710677, 0.0, 0.70710677]),
            },
        );
        assert_eq!(
            line,
            "execute as @e[tag=dtest-a] run data merge entity @s {start_interpolation:0,interpolation_duration:20,transformation:{left_rotation:[0f,0.70710677f,0f,0.70710677f]}}"
        );
    }

    /// Reads back a single-quoted SNBT string body the way the game does.
    fn snbt_unescape(body: &str) -> String {
        let mut out = String::with_capacity(body.len());
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                out.extend(chars.next());
            } else {
                out.push(c);
            }
        }
        out
    }

    fn text_component(text: &str) -> String {
        let line = set_entity_state(
            &Selector::tag("obj-label"),
            &EntityState::Text { text: text.into() },
        );
        let body = line
            .strip_prefix("execute as @e[tag=obj-label] run data merge entity @s {text:'")
            .and_then(|rest| rest.strip_suffix("'}"))
            .unwrap_or_else(|| panic!("unexpected text line: {line}"));
        snbt_unescape(body)
    }

    #[test]
    fn text_component_escapes_quotes() {
        let line = set_entity_state(
            &Selector::tag("obj-label"),
            &EntityState::Text {
                text: "it's \"here\"".into(),
            },
        );
        assert_eq!(
            line,
            r#"execute as @e[tag=obj-label] run data merge entity @s {text:'"it\'s \\"here\\""'}"#
        );
    }

    #[test]
    fn text_component_survives_snbt_unescaping() {
        for text in [
            "Hello there",
            r#"say "hi" \o/"#,
            r"C:\path\to",
            "it's",
            r#"mixed \' and \""#,
        ] {
            let json = text_component(text);
            let decoded: String = serde_json::from_str(&json)
                .unwrap_or_else(|e| panic!("{json} is not a JSON string: {e}"));
            assert_eq!(decoded, text);
        }
    }

    #[test]
    fn dispatch_line_is_gated_on_flags() {
        assert_eq!(
            tick_dispatch_line("dtest-atest", "de", "objects/dtest/atest"),
            "execute if score $dtest-atest flags matches 1.. run function de:objects/dtest/atest"
        );
    }
}
