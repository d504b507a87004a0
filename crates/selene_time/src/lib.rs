//! Time scales for ephemeris lookup.
//!
//! - Julian Date arithmetic and `chrono` instant conversion
//! - Leap-second data (built-in table or NAIF LSK file)
//! - UTC → TT → TDB conversion and its inverse
//! - Earth Rotation Angle
//! - [`Epoch`], a TDB instant in seconds past J2000

pub mod error;
pub mod julian;
pub mod lsk;
pub mod scales;
pub mod sidereal;

use std::path::Path;

use chrono::{DateTime, Utc};

pub use error::TimeError;
pub use julian::{
    J2000_JD, SECONDS_PER_DAY, calendar_to_jd, jd_to_tdb_seconds, jd_utc, tdb_seconds_to_jd,
    utc_seconds_past_j2000,
};
pub use lsk::LskData;
pub use sidereal::{EARTH_ROTATION_RATE_RAD_S, earth_rotation_angle_rad};

/// Leap-second data ready for conversions.
#[derive(Debug, Clone, PartialEq)]
pub struct LeapSecondKernel {
    data: LskData,
}

impl LeapSecondKernel {
    /// Built-in table; no file needed.
    pub fn builtin() -> Self {
        Self {
            data: LskData::builtin(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, TimeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TimeError::Io(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, TimeError> {
        Ok(Self {
            data: lsk::parse_lsk(content)?,
        })
    }

    pub fn data(&self) -> &LskData {
        &self.data
    }

    pub fn utc_to_tdb(&self, utc_s: f64) -> f64 {
        scales::utc_to_tdb(utc_s, &self.data)
    }
}

impl Default for LeapSecondKernel {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A TDB instant as seconds past J2000.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Epoch {
    tdb_seconds: f64,
}

impl Epoch {
    pub fn from_jd_tdb(jd: f64) -> Self {
        Self {
            tdb_seconds: jd_to_tdb_seconds(jd),
        }
    }

    /// TDB epoch of a UTC instant.
    pub fn from_datetime(instant: &DateTime<Utc>, lsk: &LeapSecondKernel) -> Self {
        Self {
            tdb_seconds: lsk.utc_to_tdb(utc_seconds_past_j2000(instant)),
        }
    }

    pub fn as_tdb_seconds(self) -> f64 {
        self.tdb_seconds
    }

    pub fn as_jd_tdb(self) -> f64 {
        tdb_seconds_to_jd(self.tdb_seconds)
    }

    /// Shift by a signed number of seconds.
    pub fn offset_seconds(self, ds: f64) -> Self {
        Self {
            tdb_seconds: self.tdb_seconds + ds,
        }
    }
}
