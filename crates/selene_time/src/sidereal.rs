//! Earth Rotation Angle (IERS Conventions 2010, eq. 5.15).

use std::f64::consts::TAU;

use crate::julian::J2000_JD;

/// Mean angular rate of Earth rotation, rad/s.
pub const EARTH_ROTATION_RATE_RAD_S: f64 = 7.292_115e-5;

/// ERA in radians, `[0, 2π)`, for a UT1 Julian Date.
///
/// The integer part of the date is split off before scaling so the
/// fractional turn keeps full precision.
pub fn earth_rotation_angle_rad(jd_ut1: f64) -> f64 {
    let du = jd_ut1 - J2000_JD;
    let turns = 0.779_057_273_264_0 + 0.002_737_811_911_354_48 * du + du.fract();
    (turns.fract() * TAU).rem_euclid(TAU)
}
