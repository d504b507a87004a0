//! UTC → TAI → TT → TDB, all in seconds past J2000.

use crate::lsk::LskData;

/// TAI − UTC at a UTC instant.
///
/// Instants before the first table entry use the first offset. UTC before
/// 1972 was not defined in whole seconds, so this is accurate to a few
/// seconds there.
pub fn delta_at(utc_s: f64, lsk: &LskData) -> f64 {
    lsk.leap_seconds
        .iter()
        .rev()
        .find(|&&(_, epoch)| utc_s >= epoch)
        .or(lsk.leap_seconds.first())
        .map_or(0.0, |&(dat, _)| dat)
}

/// TDB − TT from the one-term periodic model.
pub fn tdb_minus_tt(tt_s: f64, lsk: &LskData) -> f64 {
    let m = lsk.m0 + lsk.m1 * tt_s;
    let e = m + lsk.eb * m.sin();
    lsk.k * e.sin()
}

pub fn utc_to_tt(utc_s: f64, lsk: &LskData) -> f64 {
    utc_s + delta_at(utc_s, lsk) + lsk.delta_t_a
}

pub fn utc_to_tdb(utc_s: f64, lsk: &LskData) -> f64 {
    let tt = utc_to_tt(utc_s, lsk);
    tt + tdb_minus_tt(tt, lsk)
}
