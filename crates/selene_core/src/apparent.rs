//! Apparent equatorial place of a body seen from the configured observer.
//!
//! Pipeline per instant:
//! 1. UTC → TDB epoch; UTC Julian Date stands in for UT1 in the Earth
//!    Rotation Angle.
//! 2. Observer = Earth's barycentric state + the rotated WGS84 offset.
//! 3. Light time: the target is evaluated at `t − τ` until `τ` settles.
//! 4. Aberration from the observer's barycentric velocity.
//! 5. Cartesian → RA/Dec in the ICRF frame.

use chrono::{DateTime, Utc};
use selene_frames::vector::{add, norm, sub};
use selene_frames::{
    EquatorialCoords, SPEED_OF_LIGHT_KM_S, apply_aberration, cartesian_to_equatorial,
    geodetic_to_itrs, terrestrial_to_celestial,
};
use selene_time::{
    EARTH_ROTATION_RATE_RAD_S, Epoch, SECONDS_PER_DAY, earth_rotation_angle_rad, jd_utc,
};

use crate::{Body, Engine, EngineError, StateVector};

/// Light-time iterations before giving up.
const MAX_LIGHT_TIME_ITERATIONS: usize = 10;

/// Convergence threshold on successive light-time estimates (1e-12 day).
const LIGHT_TIME_TOLERANCE_S: f64 = 1e-12 * SECONDS_PER_DAY;

/// Apparent direction of a body plus the light time used to get it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentPlace {
    pub coords: EquatorialCoords,
    pub light_time_s: f64,
    /// Observation epoch as a TDB Julian Date.
    pub epoch_tdb_jd: f64,
}

impl Engine {
    /// Barycentric state of the observer at a UTC instant.
    pub fn observer_state(&self, instant: &DateTime<Utc>) -> Result<StateVector, EngineError> {
        let epoch = Epoch::from_datetime(instant, self.lsk());
        self.observer_state_at(epoch, jd_utc(instant))
    }

    fn observer_state_at(&self, epoch: Epoch, jd_ut1: f64) -> Result<StateVector, EngineError> {
        let earth = self.barycentric_state(Body::Earth, epoch)?;
        let itrs = geodetic_to_itrs(self.observer());
        let era = earth_rotation_angle_rad(jd_ut1);
        let (offset, offset_vel) = terrestrial_to_celestial(&itrs, era, EARTH_ROTATION_RATE_RAD_S);
        Ok(StateVector {
            position_km: add(&earth.position_km, &offset),
            velocity_km_s: add(&earth.velocity_km_s, &offset_vel),
        })
    }

    /// Apparent place of `body` at `instant` for the configured observer.
    pub fn apparent_place(
        &self,
        body: Body,
        instant: &DateTime<Utc>,
    ) -> Result<ApparentPlace, EngineError> {
        if body == Body::Earth {
            return Err(EngineError::UnsupportedQuery(
                "observer is on the Earth; Earth has no apparent place",
            ));
        }

        let epoch = Epoch::from_datetime(instant, self.lsk());
        let observer = self.observer_state_at(epoch, jd_utc(instant))?;

        let target_at = |tau: f64| -> Result<[f64; 3], EngineError> {
            let state = self.barycentric_state(body, epoch.offset_seconds(-tau))?;
            Ok(sub(&state.position_km, &observer.position_km))
        };

        let mut relative = target_at(0.0)?;
        let mut tau = norm(&relative) / SPEED_OF_LIGHT_KM_S;
        let mut converged = false;
        for _ in 0..MAX_LIGHT_TIME_ITERATIONS {
            relative = target_at(tau)?;
            let next = norm(&relative) / SPEED_OF_LIGHT_KM_S;
            let delta = (next - tau).abs();
            tau = next;
            if delta < LIGHT_TIME_TOLERANCE_S {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(EngineError::Internal(format!(
                "light-time iteration for {} did not converge",
                body.name()
            )));
        }

        let apparent = apply_aberration(&relative, &observer.velocity_km_s, tau);
        Ok(ApparentPlace {
            coords: cartesian_to_equatorial(&apparent),
            light_time_s: tau,
            epoch_tdb_jd: epoch.as_jd_tdb(),
        })
    }

    /// Apparent `(ra, dec)` of `body` in degrees.
    pub fn apparent_radec(
        &self,
        body: Body,
        instant: &DateTime<Utc>,
    ) -> Result<EquatorialCoords, EngineError> {
        self.apparent_place(body, instant).map(|place| place.coords)
    }
}
