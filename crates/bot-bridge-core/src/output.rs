//! Output control vector

use serde::{Deserialize, Serialize};

/// Number of fields in an output vector
pub const OUTPUT_LEN: usize = 7;

/// Full deflection on an analog axis
pub const MAX_AXIS: i32 = 32767;

/// Centered analog axis
pub const NEUTRAL_AXIS: i32 = 16383;

/// Controller command produced for one tick.
///
/// Field order: steer, pitch, throttle, brake, jump, boost, slide. The two
/// signed axes are centered at [`NEUTRAL_AXIS`]; throttle and brake run from
/// 0 to [`MAX_AXIS`]; the last three are button states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputVector(pub [i32; OUTPUT_LEN]);

impl OutputVector {
    /// No motion. Returned whenever no decision could be obtained.
    pub const FAILSAFE: OutputVector = OutputVector([NEUTRAL_AXIS, NEUTRAL_AXIS, 0, 0, 0, 0, 0]);

    /// The failsafe vector
    pub fn failsafe() -> Self {
        Self::FAILSAFE
    }

    /// Encode normalized controls into the analog domain.
    ///
    /// `steer` and `pitch` are in -1..=1, `throttle` and `brake` in 0..=1.
    /// Out-of-range values are clamped.
    pub fn from_controls(
        steer: f64,
        pitch: f64,
        throttle: f64,
        brake: f64,
        jump: bool,
        boost: bool,
        slide: bool,
    ) -> Self {
        Self([
            signed_axis(steer),
            signed_axis(pitch),
            unsigned_axis(throttle),
            unsigned_axis(brake),
            jump as i32,
            boost as i32,
            slide as i32,
        ])
    }

    pub fn steer(&self) -> i32 {
        self.0[0]
    }

    pub fn pitch(&self) -> i32 {
        self.0[1]
    }

    pub fn throttle(&self) -> i32 {
        self.0[2]
    }

    pub fn brake(&self) -> i32 {
        self.0[3]
    }

    pub fn jump(&self) -> bool {
        self.0[4] != 0
    }

    pub fn boost(&self) -> bool {
        self.0[5] != 0
    }

    pub fn slide(&self) -> bool {
        self.0[6] != 0
    }

    /// Whether this is the failsafe command
    pub fn is_failsafe(&self) -> bool {
        *self == Self::FAILSAFE
    }

    /// Fields as a plain sequence for the host
    pub fn to_vec(&self) -> Vec<i32> {
        self.0.to_vec()
    }
}

impl Default for OutputVector {
    fn default() -> Self {
        Self::FAILSAFE
    }
}

impl From<OutputVector> for Vec<i32> {
    fn from(output: OutputVector) -> Self {
        output.to_vec()
    }
}

fn signed_axis(tilt: f64) -> i32 {
    unsigned_axis((tilt.clamp(-1.0, 1.0) + 1.0) / 2.0)
}

fn unsigned_axis(normalized: f64) -> i32 {
    (normalized.clamp(0.0, 1.0) * MAX_AXIS as f64).round() as i32
}
