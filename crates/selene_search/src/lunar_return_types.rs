//! Types for lunar-return search.

use chrono::{DateTime, NaiveDate, Utc};

/// Sidereal month used to space candidates, in days.
pub const SIDEREAL_MONTH_DAYS: f64 = 27.321661;

/// Apparent equatorial position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentPosition {
    /// Right ascension in degrees, `[0, 360)`.
    pub ra_deg: f64,
    /// Declination in degrees, `[-90, 90]`.
    pub dec_deg: f64,
}

impl ApparentPosition {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self { ra_deg, dec_deg }
    }

    pub fn ra_hours(&self) -> f64 {
        self.ra_deg / 15.0
    }
}

/// Configuration for [`crate::find_lunar_return`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LunarReturnConfig {
    /// Per-axis tolerance in degrees. Compared with strict `<`.
    pub tolerance_deg: f64,
    /// Candidate spacing in days.
    pub sidereal_period_days: f64,
    /// Candidates later than reference + this many days are not tried.
    pub window_days: f64,
    /// Number of daily Sun samples from January 1st of the match year.
    pub solar_scan_days: u32,
}

impl Default for LunarReturnConfig {
    fn default() -> Self {
        Self {
            tolerance_deg: 10.0,
            sidereal_period_days: SIDEREAL_MONTH_DAYS,
            window_days: 365.0,
            solar_scan_days: 366,
        }
    }
}

impl LunarReturnConfig {
    pub fn with_tolerance(tolerance_deg: f64) -> Self {
        Self {
            tolerance_deg,
            ..Self::default()
        }
    }

    /// Checks the search geometry. The tolerance is taken as given: a
    /// negative or NaN tolerance simply never matches.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if !self.sidereal_period_days.is_finite() || self.sidereal_period_days <= 0.0 {
            return Err("sidereal_period_days must be positive");
        }
        if !self.window_days.is_finite() || self.window_days < 0.0 {
            return Err("window_days must be non-negative");
        }
        if self.solar_scan_days == 0 {
            return Err("solar_scan_days must be > 0");
        }
        Ok(())
    }
}

/// The first candidate that passed the per-axis test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonMatch {
    /// Number of sidereal periods after the reference.
    pub cycle: u32,
    /// Candidate instant, `reference + cycle × period`.
    pub instant: DateTime<Utc>,
    pub moon: ApparentPosition,
}

/// Day whose 00:00 UTC Sun position is closest to a target position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarEquivalent {
    pub date: NaiveDate,
    pub sun: ApparentPosition,
    /// `|Δra| + |Δdec|` in degrees.
    pub distance_deg: f64,
}

/// Result of a lunar-return search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LunarReturn {
    /// Reference instant in UTC.
    pub reference: DateTime<Utc>,
    /// Moon position at the reference.
    pub reference_moon: ApparentPosition,
    pub matched: MoonMatch,
    /// `None` only when no scanned day yields a finite distance.
    pub solar_equivalent: Option<SolarEquivalent>,
}

impl LunarReturn {
    /// UTC calendar date of the match.
    pub fn match_date(&self) -> NaiveDate {
        self.matched.instant.date_naive()
    }
}
