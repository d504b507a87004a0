//! Chebyshev series evaluation for SPK Type 2 records.
//!
//! A Type 2 record stores one Chebyshev series per Cartesian axis over a
//! normalised time `s` in `[-1, 1]`. Position is the series value; velocity
//! is the series derivative with respect to `s`, scaled by the record radius
//! by the caller.

/// Value of `sum(c_k * T_k(s))` via the Clenshaw backward recurrence.
pub fn series_value(coeffs: &[f64], s: f64) -> f64 {
    match coeffs {
        [] => 0.0,
        [c0] => *c0,
        [c0, rest @ ..] => {
            let two_s = 2.0 * s;
            let (mut b1, mut b2) = (0.0, 0.0);
            for &c in rest.iter().rev() {
                let b0 = two_s * b1 - b2 + c;
                b2 = b1;
                b1 = b0;
            }
            s * b1 - b2 + c0
        }
    }
}

/// Value and `d/ds` of a Chebyshev series in a single forward pass.
///
/// Tracks `T_k(s)` and `T_k'(s)` together:
/// ```text
/// T_k  = 2s·T_{k-1} − T_{k-2}
/// T_k' = 2·T_{k-1} + 2s·T_{k-1}' − T_{k-2}'
/// ```
pub fn series_value_and_slope(coeffs: &[f64], s: f64) -> (f64, f64) {
    let Some((&c0, rest)) = coeffs.split_first() else {
        return (0.0, 0.0);
    };

    let two_s = 2.0 * s;
    let (mut t_km2, mut t_km1) = (1.0, s);
    let (mut d_km2, mut d_km1) = (0.0, 1.0);

    let mut value = c0;
    let mut slope = 0.0;

    for (i, &c) in rest.iter().enumerate() {
        if i == 0 {
            value += c * t_km1;
            slope += c * d_km1;
            continue;
        }
        let t_k = two_s * t_km1 - t_km2;
        let d_k = 2.0 * t_km1 + two_s * d_km1 - d_km2;
        value += c * t_k;
        slope += c * d_k;

        t_km2 = t_km1;
        t_km1 = t_k;
        d_km2 = d_km1;
        d_km1 = d_k;
    }

    (value, slope)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-13;

    // Direct T_k(s) = cos(k·acos(s)) for cross-checking the recurrences.
    fn direct(coeffs: &[f64], s: f64) -> f64 {
        let theta = s.acos();
        coeffs
            .iter()
            .enumerate()
            .map(|(k, c)| c * (k as f64 * theta).cos())
            .sum()
    }

    #[test]
    fn empty_and_constant_series() {
        assert_eq!(series_value(&[], 0.3), 0.0);
        assert_eq!(series_value_and_slope(&[], 0.3), (0.0, 0.0));
        assert_eq!(series_value(&[4.5], -0.9), 4.5);
        assert_eq!(series_value_and_slope(&[4.5], -0.9), (4.5, 0.0));
    }

    #[test]
    fn clenshaw_matches_trigonometric_definition() {
        let coeffs = [0.25, -1.5, 3.0, 0.75, -0.125, 2.0];
        for &s in &[-1.0, -0.61, 0.0, 0.33, 0.97, 1.0] {
            let got = series_value(&coeffs, s);
            let want = direct(&coeffs, s);
            assert!((got - want).abs() < EPS, "s={s}: {got} vs {want}");
        }
    }

    #[test]
    fn forward_pass_value_agrees_with_clenshaw() {
        let coeffs = [1.0, 2.0, -3.0, 4.0, -5.0, 6.0, -7.0];
        for &s in &[-0.8, -0.2, 0.45, 0.9] {
            let (value, _) = series_value_and_slope(&coeffs, s);
            assert!((value - series_value(&coeffs, s)).abs() < EPS);
        }
    }

    #[test]
    fn slope_of_t3_is_12s2_minus_3() {
        let coeffs = [0.0, 0.0, 0.0, 1.0];
        let s = -0.35;
        let (_, slope) = series_value_and_slope(&coeffs, s);
        assert!((slope - (12.0 * s * s - 3.0)).abs() < EPS);
    }

    #[test]
    fn slope_matches_central_difference() {
        let coeffs = [0.4, -0.9, 1.7, 0.2, -0.6, 0.05, 0.3];
        let s = 0.12;
        let h = 1e-6;
        let numeric = (series_value(&coeffs, s + h) - series_value(&coeffs, s - h)) / (2.0 * h);
        let (_, slope) = series_value_and_slope(&coeffs, s);
        assert!((slope - numeric).abs() < 1e-7, "{slope} vs {numeric}");
    }
}
