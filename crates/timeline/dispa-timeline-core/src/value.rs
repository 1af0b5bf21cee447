//! Transform values carried by merge actions.
//!
//! All components are `f32`. Quaternions are `[x, y, z, w]` and are kept exactly
//! as authored; hosts must tolerate literals that are only unit-length to ~8
//! significant digits (e.g. `0.70710677` for `1/sqrt(2)`).

use serde::{Deserialize, Serialize};

pub type Vec3 = [f32; 3];

/// Quaternion (x, y, z, w)
pub type Quat = [f32; 4];

/// Integer block coordinates.
pub type BlockPos = [i32; 3];

pub const IDENTITY_QUAT: Quat = [0.0, 0.0, 0.0, 1.0];

/// One transform field overlaid by a merge. Unlisted fields keep their prior value host-side.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TransformChannel {
    Translation(Vec3),
    LeftRotation(Quat),
    Scale(Vec3),
}

impl TransformChannel {
    /// Field name as it appears in the entity's `transformation` record.
    pub fn field_name(&self) -> &'static str {
        match self {
            TransformChannel::Translation(_) => "translation",
            TransformChannel::LeftRotation(_) => "left_rotation",
            TransformChannel::Scale(_) => "scale",
        }
    }

    pub fn components(&self) -> &[f32] {
        match self {
            TransformChannel::Translation(v) | TransformChannel::Scale(v) => v,
            TransformChannel::LeftRotation(q) => q,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|c| c.is_finite())
    }
}

/// Partial transform update with client-side interpolation timing (in ticks).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransformMerge {
    #[serde(default)]
    pub start_interpolation: u32,
    pub interpolation_duration: u32,
    pub channel: TransformChannel,
}

impl TransformMerge {
    pub fn new(interpolation_duration: u32, channel: TransformChannel) -> Self {
        Self {
            start_interpolation: 0,
            interpolation_duration,
            channel,
        }
    }

    pub fn translation(interpolation_duration: u32, v: Vec3) -> Self {
        Self::new(interpolation_duration, TransformChannel::Translation(v))
    }

    pub fn left_rotation(interpolation_duration: u32, q: Quat) -> Self {
        Self::new(interpolation_duration, TransformChannel::LeftRotation(q))
    }

    pub fn scale(interpolation_duration: u32, v: Vec3) -> Self {
        Self::new(interpolation_duration, TransformChannel::Scale(v))
    }
}

/// Unit axis for the shorthand names `x`, `y` and `z`.
pub fn axis_from_name(name: &str) -> Option<Vec3> {
    match name {
        "x" => Some([1.0, 0.0, 0.0]),
        "y" => Some([0.0, 1.0, 0.0]),
        "z" => Some([0.0, 0.0, 1.0]),
        _ => None,
    }
}

/// Rotation of `degrees` around `axis`. The axis is normalized; a zero axis yields identity.
pub fn quat_from_axis_angle(axis: Vec3, degrees: f32) -> Quat {
    let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
    if len <= f32::EPSILON || !len.is_finite() {
        return IDENTITY_QUAT;
    }
    let half = degrees.to_radians() * 0.5;
    let s = half.sin() / len;
    [axis[0] * s, axis[1] * s, axis[2] * s, half.cos()]
}

/// Hamilton product `a * b` (apply `b`, then `a`).
pub fn quat_mul(a: Quat, b: Quat) -> Quat {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

/// Display-entity rotation from degrees: intrinsic Y-Z-X, with `pitch` about Y,
/// `yaw` about Z and `roll` about X.
pub fn quat_from_yaw_pitch_roll(yaw: f32, pitch: f32, roll: f32) -> Quat {
    let y = quat_from_axis_angle([0.0, 1.0, 0.0], pitch);
    let z = quat_from_axis_angle([0.0, 0.0, 1.0], yaw);
    let x = quat_from_axis_angle([1.0, 0.0, 0.0], roll);
    quat_mul(quat_mul(y, z), x)
}
