//! Leap-second data: a built-in table and a NAIF LSK text parser.
//!
//! Only the `DELTET/*` kernel-pool variables are read. Values may be
//! scalars or parenthesised lists, numbers may use Fortran `D` exponents,
//! and epochs are written as `@YYYY-MON-DD` literals.

use std::collections::HashMap;

use crate::error::TimeError;
use crate::julian::{calendar_to_jd, jd_to_tdb_seconds, month_from_abbrev};

/// Leap-second table and TDB−TT model constants.
#[derive(Debug, Clone, PartialEq)]
pub struct LskData {
    /// TT − TAI in seconds.
    pub delta_t_a: f64,
    /// Amplitude of the periodic TDB − TT term, seconds.
    pub k: f64,
    /// Eccentricity used in the Kepler step of the TDB − TT model.
    pub eb: f64,
    /// Mean anomaly at J2000, radians.
    pub m0: f64,
    /// Mean anomaly rate, radians per second.
    pub m1: f64,
    /// `(TAI − UTC, effective UTC seconds past J2000)`, ascending by epoch.
    pub leap_seconds: Vec<(f64, f64)>,
}

/// `(TAI − UTC, year, month)`; every step takes effect on the 1st at 00:00 UTC.
const BUILTIN_STEPS: [(f64, i32, u32); 28] = [
    (10.0, 1972, 1),
    (11.0, 1972, 7),
    (12.0, 1973, 1),
    (13.0, 1974, 1),
    (14.0, 1975, 1),
    (15.0, 1976, 1),
    (16.0, 1977, 1),
    (17.0, 1978, 1),
    (18.0, 1979, 1),
    (19.0, 1980, 1),
    (20.0, 1981, 7),
    (21.0, 1982, 7),
    (22.0, 1983, 7),
    (23.0, 1985, 7),
    (24.0, 1988, 1),
    (25.0, 1990, 1),
    (26.0, 1991, 1),
    (27.0, 1992, 7),
    (28.0, 1993, 7),
    (29.0, 1994, 7),
    (30.0, 1996, 1),
    (31.0, 1997, 7),
    (32.0, 1999, 1),
    (33.0, 2006, 1),
    (34.0, 2009, 1),
    (35.0, 2012, 7),
    (36.0, 2015, 7),
    (37.0, 2017, 1),
];

impl LskData {
    /// The leap seconds announced through 2017-01-01 with the standard
    /// `naif0012.tls` model constants.
    pub fn builtin() -> Self {
        Self {
            delta_t_a: 32.184,
            k: 1.657e-3,
            eb: 1.671e-2,
            m0: 6.239996,
            m1: 1.99096871e-7,
            leap_seconds: BUILTIN_STEPS
                .iter()
                .map(|&(dat, year, month)| {
                    (dat, jd_to_tdb_seconds(calendar_to_jd(year, month, 1.0)))
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Name(&'a str),
    Assign,
    Open,
    Close,
    Value(f64),
}

/// Parse the data sections of an LSK file.
pub fn parse_lsk(content: &str) -> Result<LskData, TimeError> {
    let pool = read_pool(&data_sections(content)?)?;

    let scalar = |name: &str| -> Result<f64, TimeError> {
        pool.get(name)
            .and_then(|v| v.first().copied())
            .ok_or_else(|| TimeError::LskParse(format!("missing {name}")))
    };

    let [m0, m1] = pool.get("DELTET/M").map(Vec::as_slice).unwrap_or_default() else {
        return Err(TimeError::LskParse("DELTET/M needs exactly 2 values".into()));
    };
    let (m0, m1) = (*m0, *m1);

    let flat = pool
        .get("DELTET/DELTA_AT")
        .ok_or_else(|| TimeError::LskParse("missing DELTET/DELTA_AT".into()))?;
    if flat.is_empty() || !flat.len().is_multiple_of(2) {
        return Err(TimeError::LskParse(
            "DELTET/DELTA_AT must hold (offset, epoch) pairs".into(),
        ));
    }
    let mut leap_seconds: Vec<(f64, f64)> = flat.chunks_exact(2).map(|p| (p[0], p[1])).collect();
    leap_seconds.sort_by(|a, b| a.1.total_cmp(&b.1));

    Ok(LskData {
        delta_t_a: scalar("DELTET/DELTA_T_A")?,
        k: scalar("DELTET/K")?,
        eb: scalar("DELTET/EB")?,
        m0,
        m1,
        leap_seconds,
    })
}

/// Concatenate every `\begindata` … `\begintext` block.
fn data_sections(content: &str) -> Result<String, TimeError> {
    let mut out = String::new();
    let mut in_data = false;
    for line in content.lines() {
        match line.trim() {
            l if l.eq_ignore_ascii_case("\\begindata") => in_data = true,
            l if l.eq_ignore_ascii_case("\\begintext") => in_data = false,
            _ if in_data => {
                out.push_str(line);
                out.push('\n');
            }
            _ => {}
        }
    }
    if out.trim().is_empty() {
        return Err(TimeError::LskParse("no \\begindata section found".into()));
    }
    Ok(out)
}

fn tokenize(text: &str) -> Result<Vec<Token<'_>>, TimeError> {
    let mut tokens = Vec::new();
    let spaced = text.split(|c: char| c.is_whitespace() || c == ',');
    for word in spaced.filter(|w| !w.is_empty()) {
        let mut rest = word;
        while !rest.is_empty() {
            let split = rest.find(['=', '(', ')']).unwrap_or(rest.len());
            if split == 0 {
                tokens.push(match rest.as_bytes()[0] {
                    b'=' => Token::Assign,
                    b'(' => Token::Open,
                    _ => Token::Close,
                });
                rest = &rest[1..];
                continue;
            }
            let (atom, tail) = rest.split_at(split);
            tokens.push(atom_token(atom)?);
            rest = tail;
        }
    }
    Ok(tokens)
}

fn atom_token(atom: &str) -> Result<Token<'_>, TimeError> {
    if let Some(date) = atom.strip_prefix('@') {
        return naif_date(date).map(Token::Value);
    }
    let starts_numeric = atom
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'));
    if !starts_numeric {
        return Ok(Token::Name(atom));
    }
    atom.replace(['D', 'd'], "E")
        .parse()
        .map(Token::Value)
        .map_err(|e| TimeError::LskParse(format!("bad number {atom:?}: {e}")))
}

fn read_pool(text: &str) -> Result<HashMap<String, Vec<f64>>, TimeError> {
    let tokens = tokenize(text)?;
    let mut pool = HashMap::new();
    let mut iter = tokens.into_iter();

    while let Some(token) = iter.next() {
        let Token::Name(name) = token else {
            return Err(TimeError::LskParse(format!("expected a variable name, found {token:?}")));
        };
        if iter.next() != Some(Token::Assign) {
            return Err(TimeError::LskParse(format!("expected '=' after {name}")));
        }
        let mut values = Vec::new();
        match iter.next() {
            Some(Token::Value(v)) => values.push(v),
            Some(Token::Open) => loop {
                match iter.next() {
                    Some(Token::Value(v)) => values.push(v),
                    Some(Token::Close) => break,
                    other => {
                        return Err(TimeError::LskParse(format!(
                            "unterminated list for {name}: {other:?}"
                        )));
                    }
                }
            },
            other => {
                return Err(TimeError::LskParse(format!("no value for {name}: {other:?}")));
            }
        }
        pool.insert(name.to_string(), values);
    }

    Ok(pool)
}

/// `YYYY-MON-DD` to UTC seconds past J2000.
fn naif_date(s: &str) -> Result<f64, TimeError> {
    let bad = || TimeError::LskParse(format!("bad date literal @{s}"));
    let mut parts = s.splitn(3, '-');
    let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(bad());
    };
    let year: i32 = y.parse().map_err(|_| bad())?;
    let month = month_from_abbrev(m).ok_or_else(bad)?;
    let day: f64 = d.parse().map_err(|_| bad())?;
    Ok(jd_to_tdb_seconds(calendar_to_jd(year, month, day)))
}
