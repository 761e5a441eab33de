//! Orientation samples and the quaternion to Euler conversion.
//!
//! Angles follow the aerospace Z-Y-X convention used by the BNO055 fusion
//! output: yaw about Z, then pitch about Y, then roll about X. All angles are
//! in degrees; yaw and roll span [-180, 180], pitch spans [-90, 90].

use libm::{asinf, atan2f};

const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

// Below this both atan2 arguments count as zero and the angle is undefined.
const DEGENERATE: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    pub fn norm_squared(&self) -> f32 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EulerAngles {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// One reading, alive for a single loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sample {
    Quaternion(Quaternion),
    Euler(EulerAngles),
}

/// Converts a rotation quaternion to yaw/pitch/roll in degrees.
///
/// The quaternion does not have to be normalized, the BNO055 output drifts
/// slightly off the unit sphere. At gimbal lock (pitch of ±90°) the asin
/// argument is clamped, so pitch saturates at ±90°; where the yaw or roll
/// terms vanish entirely that angle reads 0 instead of NaN. A zero quaternion carries no rotation and maps to
/// all-zero angles.
pub fn quat_to_euler(q: &Quaternion) -> EulerAngles {
    let sqw = q.w * q.w;
    let sqx = q.x * q.x;
    let sqy = q.y * q.y;
    let sqz = q.z * q.z;
    let norm = q.norm_squared();

    if norm <= f32::EPSILON {
        return EulerAngles::default();
    }

    let yaw = atan2_or_zero(2.0 * (q.x * q.y + q.z * q.w), sqx - sqy - sqz + sqw);
    let sin_pitch = (-2.0 * (q.x * q.z - q.y * q.w) / norm).clamp(-1.0, 1.0);
    let pitch = asinf(sin_pitch);
    let roll = atan2_or_zero(2.0 * (q.y * q.z + q.x * q.w), -sqx - sqy + sqz + sqw);

    EulerAngles {
        yaw: yaw * RAD_TO_DEG,
        pitch: pitch * RAD_TO_DEG,
        roll: roll * RAD_TO_DEG,
    }
}

/// `atan2`, with 0 at the origin where the angle is undefined (gimbal lock).
fn atan2_or_zero(y: f32, x: f32) -> f32 {
    if y.abs() < DEGENERATE && x.abs() < DEGENERATE {
        0.0
    } else {
        atan2f(y, x)
    }
}
