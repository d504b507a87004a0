//! Error types for time-scale conversions.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from leap-second loading or instant conversion.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TimeError {
    /// LSK text could not be parsed.
    LskParse(String),
    /// I/O error while reading an LSK file.
    Io(String),
    /// Instant cannot be represented as a finite epoch.
    InvalidInstant(String),
}

impl Display for TimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LskParse(msg) => write!(f, "LSK parse error: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::InvalidInstant(msg) => write!(f, "invalid instant: {msg}"),
        }
    }
}

impl Error for TimeError {}

impl From<std::io::Error> for TimeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
