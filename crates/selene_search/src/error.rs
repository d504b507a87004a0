//! Search error type.

use selene_core::EngineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SearchError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("invalid search config: {0}")]
    InvalidConfig(&'static str),
    /// A candidate or scan instant falls outside the representable calendar.
    #[error("instant out of calendar range: {0}")]
    InstantOutOfRange(String),
}
