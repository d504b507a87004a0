//! WGS84 geodetic coordinates and the Earth-fixed → celestial rotation.
//!
//! The terrestrial frame is rotated about the pole by the Earth Rotation
//! Angle only. Precession, nutation and polar motion are left out; at the
//! Moon's distance they move an Earth-surface offset by well under 0.01°.

use crate::vector::Vec3;

/// WGS84 equatorial radius, km.
pub const WGS84_A_KM: f64 = 6378.137;

/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Geographic location on the WGS84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    /// Geodetic latitude in degrees, north positive.
    pub latitude_deg: f64,
    /// Longitude in degrees, east positive.
    pub longitude_deg: f64,
    /// Height above the ellipsoid in meters.
    pub altitude_m: f64,
}

impl GeoLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude_deg)
            && (-180.0..=180.0).contains(&self.longitude_deg)
            && self.altitude_m.is_finite()
    }
}

/// Earth-fixed Cartesian position (km) of a geodetic point.
pub fn geodetic_to_itrs(point: &GeoLocation) -> Vec3 {
    let lat = point.latitude_deg.to_radians();
    let lon = point.longitude_deg.to_radians();
    let h_km = point.altitude_m / 1000.0;

    let e2 = WGS84_F * (2.0 - WGS84_F);
    let (sin_lat, cos_lat) = lat.sin_cos();
    let n = WGS84_A_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();

    [
        (n + h_km) * cos_lat * lon.cos(),
        (n + h_km) * cos_lat * lon.sin(),
        (n * (1.0 - e2) + h_km) * sin_lat,
    ]
}

/// Celestial position and velocity of an Earth-fixed vector.
///
/// `era_rad` is the Earth Rotation Angle; `rate_rad_s` the rotation rate
/// used for the velocity `ω × r`.
pub fn terrestrial_to_celestial(itrs: &Vec3, era_rad: f64, rate_rad_s: f64) -> (Vec3, Vec3) {
    let (s, c) = era_rad.sin_cos();
    let pos = [
        c * itrs[0] - s * itrs[1],
        s * itrs[0] + c * itrs[1],
        itrs[2],
    ];
    let vel = [-rate_rad_s * pos[1], rate_rad_s * pos[0], 0.0];
    (pos, vel)
}
