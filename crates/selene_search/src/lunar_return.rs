//! Lunar-return search.
//!
//! Candidates are `reference + k × period` for `k = 0, 1, 2, …` up to the
//! window end. The first candidate whose Moon position is within the
//! tolerance of the reference on both RA and Dec (raw differences, no RA
//! wraparound) is the match; `k = 0` is the reference itself. The match's
//! calendar year is then scanned day by day for the Sun position nearest
//! (L1) to the matched Moon position.
//!
//! Moon positions are taken at the candidate instant truncated to the whole
//! minute; Sun positions at 00:00 UTC.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, Timelike, Utc};
use selene_core::Body;

use crate::error::SearchError;
use crate::lunar_return_types::{
    ApparentPosition, LunarReturn, LunarReturnConfig, MoonMatch, SolarEquivalent,
};
use crate::source::ApparentPositionSource;

const MICROS_PER_DAY: f64 = 86_400e6;

/// `reference + days`, rounded to the microsecond.
fn offset_days(reference: &DateTime<Utc>, days: f64) -> Option<DateTime<Utc>> {
    let micros = (days * MICROS_PER_DAY).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    reference.checked_add_signed(TimeDelta::microseconds(micros as i64))
}

/// Instant of candidate `cycle`: `reference + cycle × period_days`.
///
/// `None` if the result leaves chrono's calendar range.
pub fn candidate_instant(
    reference: &DateTime<Utc>,
    cycle: u32,
    period_days: f64,
) -> Option<DateTime<Utc>> {
    offset_days(reference, f64::from(cycle) * period_days)
}

/// Drop seconds and sub-seconds.
pub fn truncate_to_minute(instant: &DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(*instant)
}

/// Per-axis test with strict `<` on raw degree differences.
pub fn within_tolerance(a: &ApparentPosition, b: &ApparentPosition, tolerance_deg: f64) -> bool {
    (a.ra_deg - b.ra_deg).abs() < tolerance_deg && (a.dec_deg - b.dec_deg).abs() < tolerance_deg
}

/// `|Δra| + |Δdec|` in degrees.
pub fn l1_distance(a: &ApparentPosition, b: &ApparentPosition) -> f64 {
    (a.ra_deg - b.ra_deg).abs() + (a.dec_deg - b.dec_deg).abs()
}

/// First candidate whose Moon position passes [`within_tolerance`] against
/// `reference_moon`.
pub fn find_moon_match<S: ApparentPositionSource + ?Sized>(
    source: &S,
    reference: &DateTime<Utc>,
    reference_moon: &ApparentPosition,
    config: &LunarReturnConfig,
) -> Result<Option<MoonMatch>, SearchError> {
    config.validate().map_err(SearchError::InvalidConfig)?;

    let window_end = offset_days(reference, config.window_days)
        .ok_or_else(|| SearchError::InstantOutOfRange(format!("{reference} + window")))?;

    for cycle in 0u32.. {
        let instant = candidate_instant(reference, cycle, config.sidereal_period_days)
            .ok_or_else(|| SearchError::InstantOutOfRange(format!("{reference} + cycle {cycle}")))?;
        if instant > window_end {
            log::debug!(
                "no lunar return within {} days of {reference}",
                config.window_days
            );
            return Ok(None);
        }

        let moon = source.apparent_position(Body::Moon, &truncate_to_minute(&instant))?;
        log::debug!(
            "cycle {cycle} at {instant}: moon ra={:.4} dec={:.4}",
            moon.ra_deg,
            moon.dec_deg
        );
        if within_tolerance(reference_moon, &moon, config.tolerance_deg) {
            return Ok(Some(MoonMatch {
                cycle,
                instant,
                moon,
            }));
        }
    }

    Ok(None)
}

/// Day of `year` (from January 1st, `scan_days` samples) whose 00:00 UTC
/// Sun position is L1-closest to `target`. Ties keep the earliest day.
pub fn find_solar_equivalent<S: ApparentPositionSource + ?Sized>(
    source: &S,
    year: i32,
    target: &ApparentPosition,
    scan_days: u32,
) -> Result<Option<SolarEquivalent>, SearchError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| SearchError::InstantOutOfRange(format!("year {year}")))?;

    let mut best: Option<SolarEquivalent> = None;
    let mut min_distance = f64::INFINITY;
    for i in 0..scan_days {
        let date = start
            .checked_add_days(Days::new(u64::from(i)))
            .ok_or_else(|| SearchError::InstantOutOfRange(format!("{start} + {i} days")))?;
        let instant = date.and_time(NaiveTime::MIN).and_utc();
        let sun = source.apparent_position(Body::Sun, &instant)?;
        let distance = l1_distance(target, &sun);
        if distance < min_distance {
            min_distance = distance;
            best = Some(SolarEquivalent {
                date,
                sun,
                distance_deg: distance,
            });
        }
    }

    Ok(best)
}

/// Lunar return after `reference` and its solar-equivalent day.
///
/// `Ok(None)` when no candidate within the window passes the tolerance.
pub fn find_lunar_return<S: ApparentPositionSource + ?Sized>(
    source: &S,
    reference: &DateTime<Utc>,
    config: &LunarReturnConfig,
) -> Result<Option<LunarReturn>, SearchError> {
    config.validate().map_err(SearchError::InvalidConfig)?;

    let reference_moon = source.apparent_position(Body::Moon, &truncate_to_minute(reference))?;
    log::debug!(
        "reference {reference}: moon ra={:.4} dec={:.4}, tolerance {}",
        reference_moon.ra_deg,
        reference_moon.dec_deg,
        config.tolerance_deg
    );

    let Some(matched) = find_moon_match(source, reference, &reference_moon, config)? else {
        return Ok(None);
    };

    let solar_equivalent = find_solar_equivalent(
        source,
        matched.instant.year(),
        &matched.moon,
        config.solar_scan_days,
    )?;
    if let Some(sol) = &solar_equivalent {
        log::debug!(
            "cycle {} matched; solar equivalent {} at L1 {:.4}",
            matched.cycle,
            sol.date,
            sol.distance_deg
        );
    }

    Ok(Some(LunarReturn {
        reference: *reference,
        reference_moon,
        matched,
        solar_equivalent,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SIDEREAL_MONTH_DAYS;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};

    /// Source backed by closures, recording every query.
    struct Scripted<M, S> {
        moon: M,
        sun: S,
        calls: Cell<usize>,
        queried: RefCell<Vec<(Body, DateTime<Utc>)>>,
    }

    impl<M, S> Scripted<M, S>
    where
        M: Fn(&DateTime<Utc>) -> ApparentPosition,
        S: Fn(&DateTime<Utc>) -> ApparentPosition,
    {
        fn new(moon: M, sun: S) -> Self {
            Self {
                moon,
                sun,
                calls: Cell::new(0),
                queried: RefCell::new(Vec::new()),
            }
        }
    }

    impl<M, S> ApparentPositionSource for Scripted<M, S>
    where
        M: Fn(&DateTime<Utc>) -> ApparentPosition,
        S: Fn(&DateTime<Utc>) -> ApparentPosition,
    {
        fn apparent_position(
            &self,
            body: Body,
            instant: &DateTime<Utc>,
        ) -> Result<ApparentPosition, SearchError> {
            self.calls.set(self.calls.get() + 1);
            self.queried.borrow_mut().push((body, *instant));
            match body {
                Body::Moon => Ok((self.moon)(instant)),
                Body::Sun => Ok((self.sun)(instant)),
                Body::Earth => Err(SearchError::InvalidConfig("earth")),
            }
        }
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, 14, 15, 9, 26).unwrap()
    }

    /// Candidate index of an instant relative to [`reference`].
    fn cycle_of(instant: &DateTime<Utc>) -> i64 {
        let days = (*instant - reference()).num_seconds() as f64 / 86_400.0;
        (days / SIDEREAL_MONTH_DAYS).round() as i64
    }

    fn fixed(ra: f64, dec: f64) -> impl Fn(&DateTime<Utc>) -> ApparentPosition {
        move |_| ApparentPosition::new(ra, dec)
    }

    #[test]
    fn cycle_zero_matches_the_reference_itself() {
        let source = Scripted::new(
            |t: &DateTime<Utc>| ApparentPosition::new(t.minute() as f64, 0.0),
            fixed(0.0, 0.0),
        );
        let config = LunarReturnConfig::with_tolerance(0.001);
        let result = find_lunar_return(&source, &reference(), &config).unwrap().unwrap();
        assert_eq!(result.matched.cycle, 0);
        assert_eq!(result.matched.instant, reference());
        assert_eq!(
            result.match_date(),
            NaiveDate::from_ymd_opt(2023, 3, 14).unwrap()
        );
        assert_eq!(result.reference_moon, result.matched.moon);
    }

    #[test]
    fn zero_tolerance_scans_fourteen_candidates_then_gives_up() {
        let source = Scripted::new(fixed(10.0, 10.0), fixed(0.0, 0.0));
        let config = LunarReturnConfig::with_tolerance(0.0);
        assert_eq!(
            find_lunar_return(&source, &reference(), &config).unwrap(),
            None
        );
        // Reference plus k = 0..=13; k = 14 lands at 382.5 days.
        assert_eq!(source.calls.get(), 15);
        let queried = source.queried.borrow();
        assert!(queried.iter().all(|(b, _)| *b == Body::Moon));
    }

    #[test]
    fn smallest_passing_cycle_wins() {
        let source = Scripted::new(
            |t: &DateTime<Utc>| match cycle_of(t) {
                3 | 5 => ApparentPosition::new(101.0, 11.0),
                _ => ApparentPosition::new(150.0, -20.0),
            },
            fixed(0.0, 0.0),
        );
        let reference_moon = ApparentPosition::new(100.0, 10.0);
        let config = LunarReturnConfig::with_tolerance(2.0);
        let m = find_moon_match(&source, &reference(), &reference_moon, &config)
            .unwrap()
            .unwrap();
        assert_eq!(m.cycle, 3);
        let expected = reference()
            + TimeDelta::microseconds((3.0 * SIDEREAL_MONTH_DAYS * MICROS_PER_DAY).round() as i64);
        assert_eq!(m.instant, expected);
        assert_eq!(source.calls.get(), 4);
    }

    #[test]
    fn axes_are_tested_independently() {
        let reference_moon = ApparentPosition::new(100.0, 10.0);
        let config = LunarReturnConfig::with_tolerance(5.0);
        // RA within tolerance, Dec not.
        let source = Scripted::new(fixed(101.0, 16.0), fixed(0.0, 0.0));
        assert_eq!(
            find_moon_match(&source, &reference(), &reference_moon, &config).unwrap(),
            None
        );
        // Both 4.9° off: combined distance exceeds the tolerance, each axis does not.
        let source = Scripted::new(fixed(104.9, 14.9), fixed(0.0, 0.0));
        assert!(find_moon_match(&source, &reference(), &reference_moon, &config)
            .unwrap()
            .is_some());
    }

    #[test]
    fn tolerance_comparison_is_strict() {
        let a = ApparentPosition::new(100.0, 10.0);
        assert!(!within_tolerance(&a, &ApparentPosition::new(110.0, 10.0), 10.0));
        assert!(within_tolerance(&a, &ApparentPosition::new(109.5, 0.5), 10.0));
    }

    #[test]
    fn ra_wraparound_is_not_corrected() {
        // 359.5° and 0.5° are 1° apart on the sky but 359° apart raw.
        let reference_moon = ApparentPosition::new(359.5, 0.0);
        let source = Scripted::new(fixed(0.5, 0.0), fixed(0.0, 0.0));
        let config = LunarReturnConfig::with_tolerance(10.0);
        assert_eq!(
            find_moon_match(&source, &reference(), &reference_moon, &config).unwrap(),
            None
        );
    }

    #[test]
    fn candidate_on_window_end_is_tried() {
        let reference_moon = ApparentPosition::new(0.0, 0.0);
        let source = Scripted::new(
            |t: &DateTime<Utc>| match cycle_of(t) {
                2 => ApparentPosition::new(0.0, 0.0),
                _ => ApparentPosition::new(90.0, 0.0),
            },
            fixed(0.0, 0.0),
        );
        let on_edge = LunarReturnConfig {
            window_days: 2.0 * SIDEREAL_MONTH_DAYS,
            ..LunarReturnConfig::with_tolerance(1.0)
        };
        let m = find_moon_match(&source, &reference(), &reference_moon, &on_edge).unwrap();
        assert_eq!(m.map(|m| m.cycle), Some(2));

        let short = LunarReturnConfig {
            window_days: 2.0 * SIDEREAL_MONTH_DAYS - 1e-3,
            ..on_edge
        };
        assert_eq!(
            find_moon_match(&source, &reference(), &reference_moon, &short).unwrap(),
            None
        );
    }

    #[test]
    fn moon_queries_use_whole_minutes() {
        let source = Scripted::new(fixed(10.0, 10.0), fixed(0.0, 0.0));
        let config = LunarReturnConfig::with_tolerance(0.0);
        find_lunar_return(&source, &reference(), &config).unwrap();
        for (_, t) in source.queried.borrow().iter() {
            assert_eq!((t.second(), t.nanosecond()), (0, 0), "{t}");
        }
    }

    #[test]
    fn solar_scan_covers_366_midnights_from_january_first() {
        let source = Scripted::new(fixed(0.0, 0.0), fixed(0.0, 0.0));
        let target = ApparentPosition::new(0.0, 0.0);
        find_solar_equivalent(&source, 2023, &target, 366).unwrap();
        let queried = source.queried.borrow();
        assert_eq!(queried.len(), 366);
        assert_eq!(
            queried[0].1,
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        );
        // 2023 has 365 days, so the last sample is in the next year.
        assert_eq!(
            queried[365].1,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(queried.iter().all(|(b, _)| *b == Body::Sun));
    }

    #[test]
    fn solar_scan_picks_minimum_and_earliest_tie() {
        // Sun RA tracks the zero-based day of year; days 39 and 40 tie.
        let source = Scripted::new(fixed(0.0, 0.0), |t: &DateTime<Utc>| {
            ApparentPosition::new(f64::from(t.ordinal0()), 0.0)
        });
        let target = ApparentPosition::new(39.5, 0.0);
        let sol = find_solar_equivalent(&source, 2024, &target, 366).unwrap().unwrap();
        assert_eq!(sol.date, NaiveDate::from_ymd_opt(2024, 2, 9).unwrap());
        assert_eq!(sol.distance_deg, 0.5);

        let target = ApparentPosition::new(100.0, 3.0);
        let sol = find_solar_equivalent(&source, 2024, &target, 366).unwrap().unwrap();
        assert_eq!(sol.date.ordinal0(), 100);
        assert_eq!(sol.distance_deg, 3.0);
    }

    #[test]
    fn nan_everywhere_yields_no_solar_day() {
        let source = Scripted::new(fixed(0.0, 0.0), fixed(f64::NAN, 0.0));
        let target = ApparentPosition::new(0.0, 0.0);
        assert_eq!(
            find_solar_equivalent(&source, 2024, &target, 366).unwrap(),
            None
        );
    }

    #[test]
    fn match_in_the_next_year_scans_that_year() {
        let reference = Utc.with_ymd_and_hms(2023, 12, 20, 12, 0, 0).unwrap();
        let moon = move |t: &DateTime<Utc>| {
            let days = (*t - reference).num_seconds() as f64 / 86_400.0;
            match (days / SIDEREAL_MONTH_DAYS).round() as i64 {
                2 => ApparentPosition::new(50.0, 0.0),
                _ => ApparentPosition::new(200.0, 0.0),
            }
        };
        let source = Scripted::new(moon, fixed(50.0, 0.0));
        let reference_moon = ApparentPosition::new(50.0, 0.0);
        let config = LunarReturnConfig::with_tolerance(1.0);
        let m = find_moon_match(&source, &reference, &reference_moon, &config)
            .unwrap()
            .unwrap();
        assert_eq!(m.cycle, 2);
        assert_eq!(m.instant.year(), 2024);

        source.queried.borrow_mut().clear();
        find_solar_equivalent(&source, m.instant.year(), &m.moon, 366).unwrap();
        let first = source.queried.borrow()[0].1;
        assert_eq!(first, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn full_search_evaluation_budget() {
        let source = Scripted::new(fixed(120.0, 15.0), |t: &DateTime<Utc>| {
            ApparentPosition::new(f64::from(t.ordinal0()), 0.0)
        });
        let result = find_lunar_return(&source, &reference(), &LunarReturnConfig::default())
            .unwrap()
            .unwrap();
        // Reference, k = 0, then the 366-day Sun scan.
        assert_eq!(source.calls.get(), 1 + 1 + 366);
        let sol = result.solar_equivalent.unwrap();
        assert_eq!(sol.date.ordinal0(), 120);
    }

    #[test]
    fn engine_errors_propagate() {
        struct Failing;
        impl ApparentPositionSource for Failing {
            fn apparent_position(
                &self,
                _: Body,
                _: &DateTime<Utc>,
            ) -> Result<ApparentPosition, SearchError> {
                Err(SearchError::Engine(selene_core::EngineError::EpochOutOfRange {
                    epoch_tdb_jd: 0.0,
                }))
            }
        }
        let err = find_lunar_return(&Failing, &reference(), &LunarReturnConfig::default())
            .unwrap_err();
        assert!(matches!(err, SearchError::Engine(_)));
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let source = Scripted::new(fixed(0.0, 0.0), fixed(0.0, 0.0));
        let config = LunarReturnConfig {
            sidereal_period_days: -1.0,
            ..LunarReturnConfig::default()
        };
        assert!(matches!(
            find_lunar_return(&source, &reference(), &config),
            Err(SearchError::InvalidConfig(_))
        ));
        assert_eq!(source.calls.get(), 0);
    }

    proptest! {
        #[test]
        fn candidates_are_whole_microsecond_multiples(
            secs in 0i64..4_000_000_000,
            cycle in 0u32..14,
        ) {
            let reference = Utc.timestamp_opt(secs, 0).unwrap();
            let c = candidate_instant(&reference, cycle, SIDEREAL_MONTH_DAYS).unwrap();
            let micros = (c - reference).num_microseconds().unwrap();
            let expected = (f64::from(cycle) * SIDEREAL_MONTH_DAYS * MICROS_PER_DAY).round() as i64;
            prop_assert_eq!(micros, expected);
        }

        #[test]
        fn truncation_stays_within_the_minute(
            secs in 0i64..4_000_000_000,
            nanos in 0u32..1_000_000_000,
        ) {
            let t = Utc.timestamp_opt(secs, nanos).unwrap();
            let m = truncate_to_minute(&t);
            prop_assert!(m <= t);
            prop_assert!(t - m < TimeDelta::minutes(1));
            prop_assert_eq!(m.second(), 0);
        }

        #[test]
        fn tolerance_test_is_symmetric(
            ra1 in 0.0f64..360.0, dec1 in -90.0f64..90.0,
            ra2 in 0.0f64..360.0, dec2 in -90.0f64..90.0,
            tol in 0.0f64..30.0,
        ) {
            let a = ApparentPosition::new(ra1, dec1);
            let b = ApparentPosition::new(ra2, dec2);
            prop_assert_eq!(within_tolerance(&a, &b, tol), within_tolerance(&b, &a, tol));
            if within_tolerance(&a, &b, tol) {
                prop_assert!(l1_distance(&a, &b) < 2.0 * tol);
            }
        }
    }
}
