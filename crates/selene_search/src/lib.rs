//! Lunar-return and solar-equivalent search.
//!
//! - [`find_lunar_return`]: first sidereal-period multiple after a reference
//!   instant where the Moon's apparent RA and Dec both fall back within a
//!   tolerance, plus the day of that year whose Sun position is closest
//! - [`ApparentPositionSource`]: the position seam the search runs against,
//!   implemented for [`selene_core::Engine`]

pub mod error;
pub mod lunar_return;
pub mod lunar_return_types;
pub mod source;

pub use error::SearchError;
pub use lunar_return::{
    candidate_instant, find_lunar_return, find_moon_match, find_solar_equivalent, l1_distance,
    truncate_to_minute, within_tolerance,
};
pub use lunar_return_types::{
    ApparentPosition, LunarReturn, LunarReturnConfig, MoonMatch, SIDEREAL_MONTH_DAYS,
    SolarEquivalent,
};
pub use source::ApparentPositionSource;
