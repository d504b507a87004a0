//! Request boundary for lunar-return queries.
//!
//! [`LunaService`] owns a position source, turns a [`LunaRequest`] into a
//! [`LunaResponse`], and converts every per-request failure into an
//! [`ErrorBody`] so callers never see a partial result.

pub mod error;
pub mod request;
pub mod response;

use selene_core::{Engine, EngineConfig};
use selene_search::{ApparentPositionSource, LunarReturnConfig, find_lunar_return};
use serde::Serialize;

pub use error::{Result, ServiceError};
pub use request::{
    DEFAULT_TOLERANCE_DEG, LOCAL_ZONE, LunaRequest, parse_reference_instant, parse_tolerance,
};
pub use response::{
    ErrorBody, INTERPRETATION_LABEL, LunaCoords, LunaResponse, Orbita, format_dec,
    format_ra_hours,
};

/// Outcome of [`LunaService::handle_json`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Ok(LunaResponse),
    Failed(ErrorBody),
}

impl Reply {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// HTTP-style status: 200 or 500.
    pub fn status(&self) -> u16 {
        if self.is_ok() { 200 } else { 500 }
    }

    pub fn to_json(&self) -> String {
        // Plain structs of strings; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
    }
}

pub struct LunaService<S = Engine> {
    source: S,
}

impl LunaService<Engine> {
    /// Loads the ephemeris. Any failure here is fatal for the caller.
    pub fn start(config: EngineConfig) -> Result<Self> {
        let engine =
            Engine::new(config).map_err(|e| ServiceError::EphemerisUnavailable(e.to_string()))?;
        Ok(Self::new(engine))
    }
}

impl<S: ApparentPositionSource> LunaService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn handle(&self, request: &LunaRequest) -> Result<LunaResponse> {
        let reference = request.reference_instant()?;
        let tolerance = request.tolerance_deg()?;
        let config = LunarReturnConfig::with_tolerance(tolerance);

        log::debug!("luna request: reference={reference} tolerance={tolerance}");
        let found = find_lunar_return(&self.source, &reference, &config)?;
        Ok(match found {
            Some(found) => LunaResponse {
                orbitas: vec![Orbita::from_return(&found, request.has_sexo())],
            },
            None => LunaResponse::empty(),
        })
    }

    /// Answers a parsed request, converting failures into an error body.
    pub fn respond(&self, request: &LunaRequest) -> Reply {
        Self::into_reply(self.handle(request))
    }

    /// Parses a raw JSON body and answers it like [`Self::respond`].
    pub fn handle_json(&self, body: &str) -> Reply {
        Self::into_reply(LunaRequest::from_json(body).and_then(|request| self.handle(&request)))
    }

    fn into_reply(result: Result<LunaResponse>) -> Reply {
        match result {
            Ok(response) => Reply::Ok(response),
            Err(e) => {
                log::warn!("luna request failed: {e}");
                Reply::Failed(ErrorBody {
                    error: e.to_string(),
                })
            }
        }
    }
}
