//! Position source seam between the search and the ephemeris.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use selene_core::{Body, Engine};

use crate::error::SearchError;
use crate::lunar_return_types::ApparentPosition;

/// Anything that can report a body's apparent RA/Dec at a UTC instant.
pub trait ApparentPositionSource {
    fn apparent_position(
        &self,
        body: Body,
        instant: &DateTime<Utc>,
    ) -> Result<ApparentPosition, SearchError>;
}

impl ApparentPositionSource for Engine {
    fn apparent_position(
        &self,
        body: Body,
        instant: &DateTime<Utc>,
    ) -> Result<ApparentPosition, SearchError> {
        let coords = self.apparent_radec(body, instant)?;
        Ok(ApparentPosition::new(coords.ra_deg, coords.dec_deg))
    }
}

impl<S: ApparentPositionSource + ?Sized> ApparentPositionSource for Arc<S> {
    fn apparent_position(
        &self,
        body: Body,
        instant: &DateTime<Utc>,
    ) -> Result<ApparentPosition, SearchError> {
        (**self).apparent_position(body, instant)
    }
}
