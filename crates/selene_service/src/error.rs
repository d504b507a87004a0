//! Service error type.

use selene_search::SearchError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Request body or field could not be understood.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Ephemeris kernel missing or unreadable at startup.
    #[error("ephemeris unavailable: {0}")]
    EphemerisUnavailable(String),

    #[error(transparent)]
    Search(#[from] SearchError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
