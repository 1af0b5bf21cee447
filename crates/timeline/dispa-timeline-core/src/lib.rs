//! DiSPA Timeline Core (engine-agnostic)
//!
//! Plays baked display-entity animations: each timeline owns an integer tick
//! counter and a static table of `(tick offset -> action)` rules. Every host tick
//! the actions registered at the current counter value are handed to the host,
//! then the counter advances, looping back to 0 once it reaches the last offset.
//!
//! Hosts implement [`EntityHost`]; the [`Engine`] drives many timelines per tick.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod host;
pub mod inputs;
pub mod outputs;
pub mod player;
pub mod scoreboard;
pub mod stored_timeline;
pub mod value;

// Re-exports for consumers (adapters)
pub use config::{Config, TickGate};
pub use data::{is_valid_name, Action, EntityKind, EntityState, Rule, Selector, TimelineTable};
pub use engine::Engine;
pub use error::{ConfigError, TimelineError};
pub use host::{dispatch, EntityHost, HostCall, RecordingHost};
pub use inputs::{Inputs, TimelineCommand};
pub use outputs::{Outputs, TimelineEvent};
pub use player::{tick, TickReport};
pub use scoreboard::{Objective, Scoreboard, TimelineState};
pub use stored_timeline::{parse_stored_bundle_json, parse_stored_timeline_json};
pub use value::{
    axis_from_name, quat_from_axis_angle, quat_from_yaw_pitch_roll, quat_mul, BlockPos, Quat,
    TransformChannel, TransformMerge, Vec3, IDENTITY_QUAT,
};
