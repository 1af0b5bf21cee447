use std::fmt;

use indexmap::IndexMap;
use log::info;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::data::{Action, EntityKind, EntityState, Rule, Selector, TimelineTable};
use crate::error::TimelineError;
use crate::value::{
    axis_from_name, quat_from_axis_angle, quat_from_yaw_pitch_roll, Quat, TransformChannel,
    TransformMerge, Vec3,
};

/// Public API: parse a stored timeline JSON document into a validated [`TimelineTable`].
///
/// Notes:
/// - Rules may appear in any order; rules sharing a tick keep document order.
/// - Vectors accept `[x, y, z]` or `{ "x", "y", "z" }`.
/// - Rotations accept `[x, y, z, w]`, `{ "x", "y", "z", "w" }` or
///   `{ "axis": "y" | [ax, ay, az], "angle": degrees }` or
///   `{ "yaw", "pitch", "roll" }` in degrees (missing angles are 0).
/// - A merge action carries exactly one of `translation`, `left_rotation`, `scale`.
/// - An optional top-level `end` tick moves the loop reset past the last rule.
pub fn parse_stored_timeline_json(s: &str) -> Result<TimelineTable, TimelineError> {
    let st: StoredTimeline =
        serde_json::from_str(s).map_err(|e| TimelineError::Parse(e.to_string()))?;
    let table = to_table(st)?;
    info!("loaded timeline '{}' ({} rules)", table.name(), table.len());
    Ok(table)
}

/// Parse `{ "timelines": [ ... ] }` into tables, preserving document order.
pub fn parse_stored_bundle_json(s: &str) -> Result<Vec<TimelineTable>, TimelineError> {
    let bundle: StoredBundle =
        serde_json::from_str(s).map_err(|e| TimelineError::Parse(e.to_string()))?;
    let tables = bundle
        .timelines
        .into_iter()
        .map(to_table)
        .collect::<Result<Vec<_>, _>>()?;
    info!("loaded {} timelines", tables.len());
    Ok(tables)
}

fn to_table(st: StoredTimeline) -> Result<TimelineTable, TimelineError> {
    let mut rules: Vec<Rule> = Vec::with_capacity(st.rules.len());
    for r in st.rules {
        let action = to_action(&st.name, r.tick, r.action)?;
        rules.push(Rule::new(r.tick, action));
    }
    TimelineTable::with_end(st.name, rules, st.end)
}

fn to_action(timeline: &str, tick: u32, a: SaAction) -> Result<Action, TimelineError> {
    let invalid = |reason: String| TimelineError::InvalidAction {
        timeline: timeline.to_string(),
        tick,
        reason,
    };
    let action = match a {
        SaAction::MergeTransform {
            target,
            start_interpolation,
            interpolation_duration,
            translation,
            left_rotation,
            scale,
        } => {
            let mut channels: Vec<TransformChannel> = Vec::with_capacity(1);
            if let Some(v) = translation {
                channels.push(TransformChannel::Translation(v.to_vec3()));
            }
            if let Some(q) = left_rotation {
                channels.push(TransformChannel::LeftRotation(
                    q.to_quat().map_err(&invalid)?,
                ));
            }
            if let Some(v) = scale {
                channels.push(TransformChannel::Scale(v.to_vec3()));
            }
            let channel = match channels.as_slice() {
                [one] => *one,
                [] => {
                    return Err(invalid(
                        "merge_transform needs one of translation, left_rotation, scale".into(),
                    ))
                }
                _ => return Err(invalid("merge_transform sets more than one channel".into())),
            };
            Action::MergeTransform {
                target: Selector::tag(target),
                merge: TransformMerge {
                    start_interpolation,
                    interpolation_duration,
                    channel,
                },
            }
        }
        SaAction::SummonEntity { kind, tags, at } => Action::SummonEntity {
            kind,
            tags: tags.into_iter().collect(),
            at: at.map(Selector::tag),
        },
        SaAction::SetEntityState { target, payload } => Action::SetEntityState {
            target: Selector::tag(target),
            payload: match payload {
                SaPayload::Block { id, properties } => EntityState::Block { id, properties },
                SaPayload::Item { item } => EntityState::Item { item },
                SaPayload::Text { text } => EntityState::Text { text },
                SaPayload::Offset { offset } => EntityState::Offset {
                    offset: offset.to_vec3(),
                },
            },
        },
        SaAction::SetBlock { position, block_id } => Action::SetBlock { position, block_id },
    };
    Ok(action)
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct StoredBundle {
    timelines: Vec<StoredTimeline>,
}

#[derive(Debug, Deserialize)]
struct StoredTimeline {
    name: String,
    rules: Vec<SaRule>,
    #[serde(default)]
    end: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SaRule {
    tick: u32,
    action: SaAction,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SaAction {
    MergeTransform {
        target: String,
        #[serde(default)]
        start_interpolation: u32,
        interpolation_duration: u32,
        #[serde(default)]
        translation: Option<RawVec3>,
        #[serde(default)]
        left_rotation: Option<RawQuat>,
        #[serde(default)]
        scale: Option<RawVec3>,
    },
    SummonEntity {
        kind: EntityKind,
        tags: Vec<String>,
        #[serde(default)]
        at: Option<String>,
    },
    SetEntityState {
        target: String,
        payload: SaPayload,
    },
    SetBlock {
        position: [i32; 3],
        block_id: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SaPayload {
    Block {
        id: String,
        #[serde(default, deserialize_with = "ordered_properties")]
        properties: Vec<(String, String)>,
    },
    Item {
        item: String,
    },
    Text {
        text: String,
    },
    Offset {
        offset: RawVec3,
    },
}

/// Block state properties in document order; a repeated key is an error.
fn ordered_properties<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PropertiesVisitor;

    impl<'de> Visitor<'de> for PropertiesVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of block state properties")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut props: IndexMap<String, String> =
                IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<String, String>()? {
                if props.contains_key(&key) {
                    return Err(de::Error::custom(format!(
                        "duplicate block state property '{key}'"
                    )));
                }
                props.insert(key, value);
            }
            Ok(props.into_iter().collect())
        }
    }

    deserializer.deserialize_map(PropertiesVisitor)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawVec3 {
    Array([f64; 3]),
    Object { x: f64, y: f64, z: f64 },
}

impl RawVec3 {
    fn to_vec3(&self) -> Vec3 {
        match *self {
            RawVec3::Array([x, y, z]) | RawVec3::Object { x, y, z } => {
                [x as f32, y as f32, z as f32]
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAxis {
    Name(String),
    Vector([f64; 3]),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawQuat {
    Array([f64; 4]),
    Object { x: f64, y: f64, z: f64, w: f64 },
    AxisAngle { axis: RawAxis, angle: f64 },
    Euler(RawEuler),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEuler {
    #[serde(default)]
    yaw: f64,
    #[serde(default)]
    pitch: f64,
    #[serde(default)]
    roll: f64,
}

impl RawQuat {
    fn to_quat(&self) -> Result<Quat, String> {
        match self {
            RawQuat::Array([x, y, z, w]) | RawQuat::Object { x, y, z, w } => {
                Ok([*x as f32, *y as f32, *z as f32, *w as f32])
            }
            RawQuat::AxisAngle { axis, angle } => {
                let axis = match axis {
                    RawAxis::Name(name) => {
                        axis_from_name(name).ok_or_else(|| format!("unknown axis '{name}'"))?
                    }
                    RawAxis::Vector([x, y, z]) => [*x as f32, *y as f32, *z as f32],
                };
                Ok(quat_from_axis_angle(axis, *angle as f32))
            }
            RawQuat::Euler(RawEuler { yaw, pitch, roll }) => Ok(quat_from_yaw_pitch_roll(
                *yaw as f32,
                *pitch as f32,
                *roll as f32,
            )),
        }
    }
}
