//! Julian Date arithmetic on the proleptic Gregorian calendar.

use chrono::{DateTime, Utc};

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Unix timestamp of 2000-01-01 12:00:00 UTC.
const J2000_UNIX_S: i64 = 946_728_000;

/// Gregorian calendar date to Julian Date (Meeus, ch. 7).
///
/// `day` may carry a fractional part for the time of day.
pub fn calendar_to_jd(year: i32, month: u32, day: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };
    let a = y.div_euclid(100);
    let b = 2 - a + a.div_euclid(4);
    (365.25 * (f64::from(y) + 4716.0)).floor()
        + (30.6001 * f64::from(m + 1)).floor()
        + day
        + f64::from(b)
        - 1524.5
}

pub fn jd_to_tdb_seconds(jd: f64) -> f64 {
    (jd - J2000_JD) * SECONDS_PER_DAY
}

pub fn tdb_seconds_to_jd(s: f64) -> f64 {
    J2000_JD + s / SECONDS_PER_DAY
}

/// UTC seconds past J2000 for a civil instant, counting every day as 86400 s.
///
/// This is the scale the leap-second table is keyed on.
pub fn utc_seconds_past_j2000(instant: &DateTime<Utc>) -> f64 {
    let whole = instant.timestamp() - J2000_UNIX_S;
    whole as f64 + f64::from(instant.timestamp_subsec_nanos()) * 1e-9
}

/// Julian Date on the UTC scale.
pub fn jd_utc(instant: &DateTime<Utc>) -> f64 {
    tdb_seconds_to_jd(utc_seconds_past_j2000(instant))
}

/// Month number for a three-letter English abbreviation (`JAN` → 1).
pub fn month_from_abbrev(s: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(s))
        .map(|i| i as u32 + 1)
}
