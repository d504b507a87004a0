//! Response bodies.

use selene_search::{ApparentPosition, LunarReturn};
use serde::{Deserialize, Serialize};

/// Label attached to a result when the request carries a `sexo` tag.
pub const INTERPRETATION_LABEL: &str = "Energía Complementaria Día de nacimiento";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunaResponse {
    /// Empty when no candidate matched.
    pub orbitas: Vec<Orbita>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orbita {
    /// Match date, `YYYY-MM-DD` (UTC).
    pub fecha: String,
    pub luna: LunaCoords,
    /// Solar-equivalent date, `YYYY-MM-DD`.
    pub sol_equivalente: Option<String>,
    pub interpretacion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunaCoords {
    /// Hours, two decimals, `h` suffix.
    pub ascension_recta: String,
    /// Degrees, two decimals, `°` suffix.
    pub declinacion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn format_ra_hours(ra_deg: f64) -> String {
    format!("{:.2}h", ra_deg / 15.0)
}

pub fn format_dec(dec_deg: f64) -> String {
    format!("{dec_deg:.2}°")
}

impl LunaCoords {
    pub fn from_position(position: &ApparentPosition) -> Self {
        Self {
            ascension_recta: format_ra_hours(position.ra_deg),
            declinacion: format_dec(position.dec_deg),
        }
    }
}

impl Orbita {
    pub fn from_return(found: &LunarReturn, tagged: bool) -> Self {
        Self {
            fecha: found.match_date().format(DATE_FORMAT).to_string(),
            luna: LunaCoords::from_position(&found.matched.moon),
            sol_equivalente: found
                .solar_equivalent
                .map(|sol| sol.date.format(DATE_FORMAT).to_string()),
            interpretacion: if tagged {
                INTERPRETATION_LABEL.to_string()
            } else {
                String::new()
            },
        }
    }
}

impl LunaResponse {
    pub fn empty() -> Self {
        Self {
            orbitas: Vec::new(),
        }
    }
}
