//! Request body and field parsing.

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Utc,
};
use chrono_tz::America::Argentina::Buenos_Aires;
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, ServiceError};

/// Civil time zone for reference instants without an explicit offset.
pub const LOCAL_ZONE: Tz = Buenos_Aires;

/// Tolerance used when the request omits `tolerancia`.
pub const DEFAULT_TOLERANCE_DEG: f64 = 10.0;

/// Body of a lunar-return request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LunaRequest {
    /// Reference date or date-time, ISO-8601.
    #[serde(default)]
    pub fecha: Option<String>,
    /// Number, numeric string or bool. Absent means 10.
    #[serde(default, deserialize_with = "present")]
    pub tolerancia: Option<Value>,
    /// Only emptiness matters.
    #[serde(default)]
    pub sexo: Option<String>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it is told apart
/// from an absent field.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl LunaRequest {
    pub fn new(fecha: impl Into<String>) -> Self {
        Self {
            fecha: Some(fecha.into()),
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance_deg: f64) -> Self {
        self.tolerancia = Some(Value::from(tolerance_deg));
        self
    }

    pub fn with_sexo(mut self, sexo: impl Into<String>) -> Self {
        self.sexo = Some(sexo.into());
        self
    }

    /// Parses a JSON request body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| ServiceError::InvalidInput(format!("malformed request body: {e}")))
    }

    pub fn reference_instant(&self) -> Result<DateTime<Utc>> {
        match self.fecha.as_deref() {
            Some(fecha) => parse_reference_instant(fecha),
            None => Err(ServiceError::InvalidInput("fecha is required".into())),
        }
    }

    pub fn tolerance_deg(&self) -> Result<f64> {
        parse_tolerance(self.tolerancia.as_ref())
    }

    /// Whether the lower-cased tag is non-empty.
    pub fn has_sexo(&self) -> bool {
        self.sexo
            .as_deref()
            .is_some_and(|s| !s.to_lowercase().is_empty())
    }
}

/// Reads `tolerancia` the way a float conversion of the raw field would.
pub fn parse_tolerance(value: Option<&Value>) -> Result<f64> {
    let Some(value) = value else {
        return Ok(DEFAULT_TOLERANCE_DEG);
    };
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ServiceError::InvalidInput(format!("tolerancia out of range: {n}"))),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            ServiceError::InvalidInput(format!("could not convert tolerancia to float: {s:?}"))
        }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(ServiceError::InvalidInput(format!(
            "tolerancia must be a number or numeric string, got {other}"
        ))),
    }
}

/// Parses an ISO-8601 date or date-time into UTC.
///
/// Accepted: `YYYY-MM-DD`, optionally followed by `T` or a space and
/// `HH[:MM[:SS[.fff]]]` (`,` also separates the fraction), optionally
/// followed by `Z` or an offset `±HH[[:]MM[[:]SS]]`. Values with no offset
/// are civil time in [`LOCAL_ZONE`].
///
/// Basic-format dates (`YYYYMMDD`), week dates, compact times (`HHMM`) and
/// fractional offsets are rejected.
pub fn parse_reference_instant(fecha: &str) -> Result<DateTime<Utc>> {
    let invalid = || ServiceError::InvalidInput(format!("invalid isoformat string: {fecha:?}"));

    let (date_part, rest) = match (fecha.get(..10), fecha.get(10..)) {
        (Some(d), Some(r)) => (d, r),
        _ => return Err(invalid()),
    };
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())?;

    if rest.is_empty() {
        return localize(date.and_time(NaiveTime::MIN)).ok_or_else(invalid);
    }

    let Some(time_and_offset) = rest.strip_prefix(['T', ' ']) else {
        return Err(invalid());
    };
    let (time_text, offset) = split_offset(time_and_offset).ok_or_else(invalid)?;
    let time = parse_time(time_text).ok_or_else(invalid)?;
    let naive = date.and_time(time);

    match offset {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(invalid),
        None => localize(naive).ok_or_else(invalid),
    }
}

/// Splits a trailing UTC offset off a time string.
fn split_offset(text: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(time) = text.strip_suffix(['Z', 'z']) {
        return Some((time, FixedOffset::east_opt(0)));
    }
    let Some(at) = text.find(['+', '-']) else {
        return Some((text, None));
    };
    let (time, offset) = text.split_at(at);
    Some((time, Some(parse_offset(offset)?)))
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    let sign = match text.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = text[1..].chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |range: std::ops::Range<usize>| digits.get(range)?.parse::<i32>().ok();
    let (hours, minutes, seconds) = match digits.len() {
        2 => (field(0..2)?, 0, 0),
        4 => (field(0..2)?, field(2..4)?, 0),
        6 => (field(0..2)?, field(2..4)?, field(4..6)?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60 + seconds))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    match text.len() {
        2 => NaiveTime::parse_from_str(&format!("{text}:00"), "%H:%M").ok(),
        5 => NaiveTime::parse_from_str(text, "%H:%M").ok(),
        8 => NaiveTime::parse_from_str(text, "%H:%M:%S").ok(),
        n if n > 9 && matches!(text.as_bytes()[8], b'.' | b',') => {
            NaiveTime::parse_from_str(&text.replacen(',', ".", 1), "%H:%M:%S%.f").ok()
        }
        _ => None,
    }
}

/// Attaches [`LOCAL_ZONE`] to a civil time. A repeated hour resolves to
/// standard time; a skipped hour is read with the offset in force before
/// the transition.
fn localize(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match LOCAL_ZONE.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, standard) => Some(standard.with_timezone(&Utc)),
        LocalResult::None => {
            let before = LOCAL_ZONE
                .from_local_datetime(&(naive - TimeDelta::hours(2)))
                .earliest()?;
            let offset = before.offset().fix();
            offset
                .from_local_datetime(&naive)
                .single()
                .map(|t| t.with_timezone(&Utc))
        }
    }
}
