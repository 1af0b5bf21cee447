//! Host boundary.
//!
//! The game engine owns entities, blocks and the effect of every write. The
//! player only hands actions over; nothing is returned or checked. Adapters
//! implement [`EntityHost`] and are passed into [`tick`](crate::tick) or
//! [`Engine::update`](crate::Engine::update).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::{Action, EntityKind, EntityState, Selector};
use crate::scoreboard::Objective;
use crate::value::{BlockPos, TransformMerge};

pub trait EntityHost {
    /// Overlay the merge's fields onto every entity matching `target`.
    fn merge_transform(&mut self, target: &Selector, merge: &TransformMerge);

    fn summon(&mut self, kind: EntityKind, tags: &BTreeSet<String>, at: Option<&Selector>);

    fn set_entity_state(&mut self, target: &Selector, payload: &EntityState);

    fn set_block(&mut self, position: BlockPos, block_id: &str);

    /// Notification that a register was written (`set` on reset, `add` on advance).
    /// Hosts that keep their own scoreboard mirror it here.
    fn score_written(&mut self, _timeline: &str, _objective: Objective, _value: i32) {}
}

/// Forward one action to the matching host primitive.
pub fn dispatch(host: &mut dyn EntityHost, action: &Action) {
    match action {
        Action::MergeTransform { target, merge } => host.merge_transform(target, merge),
        Action::SummonEntity { kind, tags, at } => host.summon(*kind, tags, at.as_ref()),
        Action::SetEntityState { target, payload } => host.set_entity_state(target, payload),
        Action::SetBlock { position, block_id } => host.set_block(*position, block_id),
    }
}

/// One recorded host call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    MergeTransform {
        target: Selector,
        merge: TransformMerge,
    },
    Summon {
        kind: EntityKind,
        tags: BTreeSet<String>,
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
    Score {
        timeline: String,
        objective: Objective,
        value: i32,
    },
}

/// Host that records every call in order. Used by tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    /// Also record scoreboard notifications.
    pub record_scores: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scores() -> Self {
        Self {
            calls: Vec::new(),
            record_scores: true,
        }
    }

    /// Drain recorded calls.
    pub fn take(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Recorded calls excluding scoreboard notifications.
    pub fn entity_calls(&self) -> impl Iterator<Item = &HostCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, HostCall::Score { .. }))
    }
}

impl EntityHost for RecordingHost {
    fn merge_transform(&mut self, target: &Selector, merge: &TransformMerge) {
        self.calls.push(HostCall::MergeTransform {
            target: target.clone(),
            merge: *merge,
        });
    }

    fn summon(&mut self, kind: EntityKind, tags: &BTreeSet<String>, at: Option<&Selector>) {
        self.calls.push(HostCall::Summon {
            kind,
            tags: tags.clone(),
            at: at.cloned(),
        });
    }

    fn set_entity_state(&mut self, target: &Selector, payload: &EntityState) {
        self.calls.push(HostCall::SetEntityState {
            target: target.clone(),
            payload: payload.clone(),
        });
    }

    fn set_block(&mut self, position: BlockPos, block_id: &str) {
        self.calls.push(HostCall::SetBlock {
            position,
            block_id: block_id.to_string(),
        });
    }

    fn score_written(&mut self, timeline: &str, objective: Objective, value: i32) {
        if self.record_scores {
            self.calls.push(HostCall::Score {
                timeline: timeline.to_string(),
                objective,
                value,
            });
        }
    }
}

impl From<&Action> for HostCall {
    fn from(action: &Action) -> Self {
        match action.clone() {
            Action::MergeTransform { target, merge } => HostCall::MergeTransform { target, merge },
            Action::SummonEntity { kind, tags, at } => HostCall::Summon { kind, tags, at },
            Action::SetEntityState { target, payload } => {
                HostCall::SetEntityState { target, payload }
            }
            Action::SetBlock { position, block_id } => HostCall::SetBlock { position, block_id },
        }
    }
}
