//! Timeline data model: actions, rules and the static per-timeline rule table.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::value::{BlockPos, TransformMerge, Vec3};

/// Returns true for non-empty names made of `A-Z a-z 0-9 _ -`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Tag selector: every entity currently carrying `tag`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector {
    tag: String,
}

impl Selector {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    pub fn as_tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    BlockDisplay,
    ItemDisplay,
    TextDisplay,
}

impl EntityKind {
    pub fn id(&self) -> &'static str {
        match self {
            EntityKind::BlockDisplay => "block_display",
            EntityKind::ItemDisplay => "item_display",
            EntityKind::TextDisplay => "text_display",
        }
    }
}

/// Passthrough payload for [`Action::SetEntityState`]. The host owns its meaning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityState {
    /// Displayed block with optional state properties, in authored order.
    Block {
        id: String,
        #[serde(default)]
        properties: Vec<(String, String)>,
    },
    /// Displayed item contents.
    Item { item: String },
    Text { text: String },
    /// Relative teleport of the matched entities.
    Offset { offset: Vec3 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    MergeTransform {
        target: Selector,
        merge: TransformMerge,
    },
    SummonEntity {
        kind: EntityKind,
        tags: BTreeSet<String>,
        /// Summon at the position of these entities; host default position when absent.
        #[serde(default)]
        at: Option<Selector>,
    },
    SetEntityState {
        target: Selector,
        payload: EntityState,
    },
    SetBlock {
        position: BlockPos,
        block_id: String,
    },
}

impl Action {
    pub fn merge(target: &str, merge: TransformMerge) -> Self {
        Action::MergeTransform {
            target: Selector::tag(target),
            merge,
        }
    }

    pub fn summon<I, S>(kind: EntityKind, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::SummonEntity {
            kind,
            tags: tags.into_iter().map(Into::into).collect(),
            at: None,
        }
    }

    pub fn set_state(target: &str, payload: EntityState) -> Self {
        Action::SetEntityState {
            target: Selector::tag(target),
            payload,
        }
    }

    pub fn set_block(position: BlockPos, block_id: impl Into<String>) -> Self {
        Action::SetBlock {
            position,
            block_id: block_id.into(),
        }
    }

    fn validate(&self, timeline: &str, tick: u32) -> Result<(), TimelineError> {
        let invalid = |reason: String| TimelineError::InvalidAction {
            timeline: timeline.to_string(),
            tick,
            reason,
        };
        let check_selector = |sel: &Selector| {
            if is_valid_name(sel.as_tag()) {
                Ok(())
            } else {
                Err(TimelineError::InvalidName {
                    name: sel.as_tag().to_string(),
                })
            }
        };
        match self {
            Action::MergeTransform { target, merge } => {
                check_selector(target)?;
                if !merge.channel.is_finite() {
                    return Err(TimelineError::NonFinite {
                        timeline: timeline.to_string(),
                        tick,
                        field: merge.channel.field_name(),
                    });
                }
            }
            Action::SummonEntity { tags, at, .. } => {
                if tags.is_empty() {
                    return Err(invalid("summon without tags".into()));
                }
                if let Some(bad) = tags.iter().find(|t| !is_valid_name(t)) {
                    return Err(TimelineError::InvalidName { name: bad.clone() });
                }
                if let Some(at) = at {
                    check_selector(at)?;
                }
            }
            Action::SetEntityState { target, payload } => {
                check_selector(target)?;
                match payload {
                    EntityState::Block { id, .. } if id.is_empty() => {
                        return Err(invalid("empty block id".into()))
                    }
                    EntityState::Item { item } if item.is_empty() => {
                        return Err(invalid("empty item id".into()))
                    }
                    EntityState::Offset { offset } if !offset.iter().all(|c| c.is_finite()) => {
                        return Err(TimelineError::NonFinite {
                            timeline: timeline.to_string(),
                            tick,
                            field: "offset",
                        })
                    }
                    _ => {}
                }
            }
            Action::SetBlock { block_id, .. } => {
                if block_id.is_empty() {
                    return Err(invalid("empty block id".into()));
                }
            }
        }
        Ok(())
    }
}

/// A static `(tick offset, action)` pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub tick: u32,
    pub action: Action,
}

impl Rule {
    pub fn new(tick: u32, action: Action) -> Self {
        Self { tick, action }
    }
}

/// Immutable rule set of one timeline, grouped by tick offset.
///
/// Actions sharing an offset keep their registration order; later merges at the
/// same offset overlay fields written by earlier ones.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineTable {
    name: String,
    by_offset: BTreeMap<u32, Vec<Action>>,
    max_offset: u32,
    len: usize,
}

impl TimelineTable {
    /// Build a table that loops at its greatest rule offset.
    pub fn new(
        name: impl Into<String>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<Self, TimelineError> {
        Self::with_end(name, rules, None)
    }

    /// Build a table whose loop resets at `end` instead of the last rule offset,
    /// holding the final pose for the ticks in between. `end` may not precede any rule.
    pub fn with_end(
        name: impl Into<String>,
        rules: impl IntoIterator<Item = Rule>,
        end: Option<u32>,
    ) -> Result<Self, TimelineError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(TimelineError::InvalidName { name });
        }

        let mut by_offset: BTreeMap<u32, Vec<Action>> = BTreeMap::new();
        let mut len = 0usize;
        for rule in rules {
            if i32::try_from(rule.tick).is_err() {
                return Err(TimelineError::OffsetOutOfRange {
                    timeline: name,
                    tick: rule.tick,
                });
            }
            rule.action.validate(&name, rule.tick)?;
            by_offset.entry(rule.tick).or_default().push(rule.action);
            len += 1;
        }

        let last = match by_offset.keys().next_back() {
            Some(max) => *max,
            None => return Err(TimelineError::EmptyTimeline { timeline: name }),
        };
        let max_offset = match end {
            None => last,
            Some(end) if i32::try_from(end).is_err() => {
                return Err(TimelineError::OffsetOutOfRange {
                    timeline: name,
                    tick: end,
                })
            }
            Some(end) if end < last => {
                return Err(TimelineError::EndBeforeLastRule {
                    timeline: name,
                    end,
                    last,
                })
            }
            Some(end) => end,
        };

        Ok(Self {
            name,
            by_offset,
            max_offset,
            len,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Loop end: the explicit end tick if one was given, else the greatest rule
    /// offset. The loop resets once the timer reaches it.
    pub fn max_offset(&self) -> u32 {
        self.max_offset
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Actions registered at `timer`, in registration order. Empty for negative timers.
    pub fn actions_at(&self, timer: i32) -> &[Action] {
        u32::try_from(timer)
            .ok()
            .and_then(|t| self.by_offset.get(&t))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct tick offsets in ascending order.
    pub fn offsets(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_offset.keys().copied()
    }

    /// All rules in ascending offset order (registration order within an offset).
    pub fn rules(&self) -> impl Iterator<Item = (u32, &Action)> + '_ {
        self.by_offset
            .iter()
            .flat_map(|(tick, actions)| actions.iter().map(move |a| (*tick, a)))
    }

    pub fn to_rules(&self) -> Vec<Rule> {
        self.rules()
            .map(|(tick, action)| Rule::new(tick, action.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(x: f32) -> Action {
        Action::merge("obj-a", TransformMerge::translation(5, [x, 0.0, 0.0]))
    }

    #[test]
    fn groups_by_offset_and_keeps_registration_order() {
        let table = TimelineTable::new(
            "obj-anim",
            vec![
                Rule::new(10, tr(1.0)),
                Rule::new(0, tr(0.0)),
                Rule::new(10, tr(2.0)),
            ],
        )
        .unwrap();
        assert_eq!(table.max_offset(), 10);
        assert_eq!(table.len(), 3);
        assert_eq!(table.actions_at(10), &[tr(1.0), tr(2.0)]);
        assert_eq!(table.actions_at(5), &[] as &[Action]);
        assert_eq!(table.actions_at(-1), &[] as &[Action]);
        assert_eq!(table.offsets().collect::<Vec<_>>(), vec![0, 10]);
    }

    #[test]
    fn rejects_empty_and_badly_named_timelines() {
        assert_eq!(
            TimelineTable::new("a", Vec::new()),
            Err(TimelineError::EmptyTimeline {
                timeline: "a".into()
            })
        );
        assert!(matches!(
            TimelineTable::new("has space", vec![Rule::new(0, tr(0.0))]),
            Err(TimelineError::InvalidName { .. })
        ));
        assert!(matches!(
            TimelineTable::new(
                "ok",
                vec![Rule::new(0, Action::merge("bad tag", TransformMerge::scale(1, [1.0; 3])))]
            ),
            Err(TimelineError::InvalidName { .. })
        ));
    }

    #[test]
    fn rejects_offsets_beyond_counter_range_and_nan() {
        assert!(matches!(
            TimelineTable::new("t", vec![Rule::new(u32::MAX, tr(0.0))]),
            Err(TimelineError::OffsetOutOfRange { .. })
        ));
        assert!(matches!(
            TimelineTable::new("t", vec![Rule::new(1, tr(f32::INFINITY))]),
            Err(TimelineError::NonFinite {
                field: "translation",
                ..
            })
        ));
    }

    #[test]
    fn explicit_end_extends_the_loop() {
        let table =
            TimelineTable::with_end("obj-anim", vec![Rule::new(4, tr(1.0))], Some(9)).unwrap();
        assert_eq!(table.max_offset(), 9);
        assert_eq!(table.offsets().collect::<Vec<_>>(), vec![4]);

        let same = TimelineTable::with_end("obj-anim", vec![Rule::new(4, tr(1.0))], Some(4));
        assert_eq!(same.map(|t| t.max_offset()), Ok(4));

        assert_eq!(
            TimelineTable::with_end("obj-anim", vec![Rule::new(4, tr(1.0))], Some(3)),
            Err(TimelineError::EndBeforeLastRule {
                timeline: "obj-anim".into(),
                end: 3,
                last: 4
            })
        );
        assert!(matches!(
            TimelineTable::with_end("obj-anim", vec![Rule::new(4, tr(1.0))], Some(u32::MAX)),
            Err(TimelineError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn action_json_shape() {
        let action = Action::summon(EntityKind::TextDisplay, ["obj-label"]);
        let v = serde_json::to_value(&action).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "type": "summon_entity",
                "kind": "text_display",
                "tags": ["obj-label"],
                "at": null
            })
        );
    }
}
