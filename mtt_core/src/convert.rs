//! Angle <-> raw position conversion.
//!
//! `position = trunc((180 + angle) * 4096/360 + 0.5)`
//! `angle    = position * 360/4096 - 180`

use std::ops::RangeInclusive;

/// Raw counts per full revolution.
pub const COUNTS_PER_REV: f64 = 4096.0;
/// Angle reported for raw position 0.
pub const OFFSET_DEG: f64 = 180.0;
/// Angular size of one raw count.
pub const RESOLUTION_DEG: f32 = 360.0 / 4096.0;
/// Angles this tool will command.
pub const ANGLE_RANGE: RangeInclusive<f32> = -50.0..=50.0;

/// Convert an angle to the goal-position register value.
///
/// Rounds half up via `trunc(x + 0.5)` and saturates into `u16`; the caller
/// checks the angle against [`ANGLE_RANGE`] first.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_position(angle: f32) -> u16 {
    let raw = (OFFSET_DEG + f64::from(angle)) * COUNTS_PER_REV / 360.0;
    (raw + 0.5).trunc() as u16
}

/// Convert a raw position back to degrees. No rounding.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn to_angle(position: u32) -> f32 {
    (f64::from(position) * 360.0 / COUNTS_PER_REV - OFFSET_DEG) as f32
}
