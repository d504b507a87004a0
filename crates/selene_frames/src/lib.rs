//! Geometry helpers for apparent-place computation.
//!
//! Cartesian ↔ equatorial conversion, the WGS84 observer offset, and the
//! relativistic aberration correction. Every vector here is in the ICRF
//! (J2000 equator) frame, km and km/s.

pub mod aberration;
pub mod geodetic;
pub mod spherical;
pub mod vector;

pub use aberration::{SPEED_OF_LIGHT_KM_S, apply_aberration};
pub use geodetic::{GeoLocation, WGS84_A_KM, WGS84_F, geodetic_to_itrs, terrestrial_to_celestial};
pub use spherical::{EquatorialCoords, cartesian_to_equatorial};
