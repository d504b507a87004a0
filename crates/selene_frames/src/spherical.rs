//! Cartesian → equatorial (right ascension, declination, distance).

/// Equatorial coordinates of a direction in the J2000 frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialCoords {
    /// Right ascension in degrees, `[0, 360)`.
    pub ra_deg: f64,
    /// Declination in degrees, `[-90, 90]`.
    pub dec_deg: f64,
    pub distance_km: f64,
}

impl EquatorialCoords {
    /// Right ascension in hours, `[0, 24)`.
    pub fn ra_hours(&self) -> f64 {
        self.ra_deg / 15.0
    }
}

/// Convert an ICRF vector (km) to equatorial coordinates.
///
/// The zero vector maps to `(0, 0, 0)`.
pub fn cartesian_to_equatorial(xyz: &[f64; 3]) -> EquatorialCoords {
    let [x, y, z] = *xyz;
    let r = (x * x + y * y + z * z).sqrt();
    if r == 0.0 {
        return EquatorialCoords {
            ra_deg: 0.0,
            dec_deg: 0.0,
            distance_km: 0.0,
        };
    }

    let mut ra_deg = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round a tiny negative angle up to exactly 360.
    if ra_deg >= 360.0 {
        ra_deg = 0.0;
    }
    let dec_deg = (z / r).clamp(-1.0, 1.0).asin().to_degrees();

    EquatorialCoords {
        ra_deg,
        dec_deg,
        distance_km: r,
    }
}
