//! Stellar aberration from the observer's barycentric velocity.

use crate::vector::{Vec3, add, dot, norm, scale};

/// Speed of light, km/s (exact).
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Shift an astrometric position for aberration.
///
/// `position_km` is the light-time corrected target position relative to
/// the observer, `observer_velocity_km_s` the observer's barycentric
/// velocity and `light_time_s` the one-way light time. Implements the
/// relativistic first-order form (Kaplan et al. 1989, eq. 13).
///
/// Returns the input unchanged when either the light time or the velocity
/// is zero.
pub fn apply_aberration(
    position_km: &Vec3,
    observer_velocity_km_s: &Vec3,
    light_time_s: f64,
) -> Vec3 {
    let p1mag = light_time_s * SPEED_OF_LIGHT_KM_S;
    let vemag = norm(observer_velocity_km_s);
    if p1mag == 0.0 || vemag == 0.0 {
        return *position_km;
    }

    let beta = vemag / SPEED_OF_LIGHT_KM_S;
    let cosd = dot(position_km, observer_velocity_km_s) / (p1mag * vemag);
    let gammai = (1.0 - beta * beta).sqrt();
    let p = beta * cosd;
    let q = (1.0 + p / (1.0 + gammai)) * light_time_s;
    let r = 1.0 + p;

    let shifted = add(
        &scale(position_km, gammai),
        &scale(observer_velocity_km_s, q),
    );
    scale(&shifted, 1.0 / r)
}
