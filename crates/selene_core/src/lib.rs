//! Ephemeris engine for a single Earth-based observer.
//!
//! [`Engine`] owns the SPK kernel, the leap-second data and the observer
//! location. It resolves barycentric states through the NAIF body chain
//! and, in [`apparent`], turns them into apparent right ascension and
//! declination.

pub mod apparent;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use jpl_kernel::{KernelError, SpkKernel};
use selene_time::{Epoch, LeapSecondKernel};

pub use apparent::ApparentPlace;
pub use selene_frames::{EquatorialCoords, GeoLocation};

/// The fixed observer: latitude −35.6581°, longitude −63.7575°, 135 m.
pub const DEFAULT_OBSERVER: GeoLocation = GeoLocation {
    latitude_deg: -35.6581,
    longitude_deg: -63.7575,
    altitude_m: 135.0,
};

/// Engine configuration used at startup time.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub spk_path: PathBuf,
    /// NAIF LSK file; the built-in leap-second table is used when `None`.
    pub lsk_path: Option<PathBuf>,
    pub observer: GeoLocation,
}

impl EngineConfig {
    /// Kernel at `spk_path`, built-in leap seconds, default observer.
    pub fn new(spk_path: impl Into<PathBuf>) -> Self {
        Self {
            spk_path: spk_path.into(),
            lsk_path: None,
            observer: DEFAULT_OBSERVER,
        }
    }

    pub fn with_lsk(mut self, lsk_path: impl Into<PathBuf>) -> Self {
        self.lsk_path = Some(lsk_path.into());
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.spk_path.as_os_str().is_empty() {
            return Err(EngineError::InvalidConfig("spk_path must not be empty"));
        }
        if self
            .lsk_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(EngineError::InvalidConfig("lsk_path must not be empty"));
        }
        if !self.observer.is_valid() {
            return Err(EngineError::InvalidConfig(
                "observer latitude/longitude out of range",
            ));
        }
        Ok(())
    }
}

/// Bodies the engine can evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Earth,
    Moon,
}

impl Body {
    /// NAIF body code.
    pub const fn code(self) -> i32 {
        match self {
            Self::Sun => 10,
            Self::Earth => 399,
            Self::Moon => 301,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Earth => "Earth",
            Self::Moon => "Moon",
        }
    }
}

impl std::str::FromStr for Body {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sun" | "sol" => Ok(Self::Sun),
            "earth" => Ok(Self::Earth),
            "moon" | "luna" => Ok(Self::Moon),
            _ => Err(EngineError::UnsupportedQuery("unknown body name")),
        }
    }
}

/// Cartesian state vector, km and km/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

impl StateVector {
    fn from_array(s: [f64; 6]) -> Self {
        Self {
            position_km: [s[0], s[1], s[2]],
            velocity_km_s: [s[3], s[4], s[5]],
        }
    }
}

/// Core engine errors.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EngineError {
    InvalidConfig(&'static str),
    KernelLoad(String),
    UnsupportedQuery(&'static str),
    EpochOutOfRange { epoch_tdb_jd: f64 },
    Internal(String),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::KernelLoad(msg) => write!(f, "kernel load error: {msg}"),
            Self::UnsupportedQuery(msg) => write!(f, "unsupported query: {msg}"),
            Self::EpochOutOfRange { epoch_tdb_jd } => {
                write!(f, "epoch out of kernel range: JD {epoch_tdb_jd} TDB")
            }
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl Error for EngineError {}

impl From<KernelError> for EngineError {
    fn from(e: KernelError) -> Self {
        match e {
            KernelError::EpochOutOfRange { epoch_tdb_s, .. } => Self::EpochOutOfRange {
                epoch_tdb_jd: selene_time::tdb_seconds_to_jd(epoch_tdb_s),
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Ephemeris engine.
///
/// Read-only after construction and [`Send`] + [`Sync`]; share it across
/// threads with `Arc<Engine>`.
pub struct Engine {
    config: EngineConfig,
    spk: SpkKernel,
    lsk: LeapSecondKernel,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("spk_segments", &self.spk.segments().len())
            .finish()
    }
}

impl Engine {
    /// Load the kernels named by `config`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let spk = SpkKernel::load(&config.spk_path)
            .map_err(|e| EngineError::KernelLoad(e.to_string()))?;
        let lsk = match &config.lsk_path {
            Some(path) => LeapSecondKernel::load(path)
                .map_err(|e| EngineError::KernelLoad(e.to_string()))?,
            None => LeapSecondKernel::builtin(),
        };
        log::info!(
            "loaded {} ({} segments) from {}",
            spk.internal_name(),
            spk.segments().len(),
            config.spk_path.display()
        );
        Ok(Self::from_parts(config, spk, lsk))
    }

    /// Assemble an engine from kernels already in memory.
    pub fn from_parts(config: EngineConfig, spk: SpkKernel, lsk: LeapSecondKernel) -> Self {
        Self { config, spk, lsk }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn spk(&self) -> &SpkKernel {
        &self.spk
    }

    pub fn lsk(&self) -> &LeapSecondKernel {
        &self.lsk
    }

    pub fn observer(&self) -> &GeoLocation {
        &self.config.observer
    }

    /// Barycentric (SSB) state of `body` at a TDB epoch.
    pub fn barycentric_state(&self, body: Body, epoch: Epoch) -> Result<StateVector, EngineError> {
        let epoch_tdb_s = epoch.as_tdb_seconds();
        if !epoch_tdb_s.is_finite() {
            return Err(EngineError::UnsupportedQuery("epoch must be finite"));
        }
        let state = self.spk.resolve_to_ssb(body.code(), epoch_tdb_s)?;
        Ok(StateVector::from_array(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = EngineConfig::new("kernels/data/de421.bsp");
        assert_eq!(config.observer, DEFAULT_OBSERVER);
        assert!(config.lsk_path.is_none());
        assert!(config.validate().is_ok());
        let config = config.with_lsk("naif0012.tls");
        assert_eq!(config.lsk_path, Some(PathBuf::from("naif0012.tls")));
    }

    #[test]
    fn engine_rejects_empty_spk_path() {
        assert!(matches!(
            Engine::new(EngineConfig::new("")),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn engine_rejects_empty_lsk_path() {
        let config = EngineConfig::new("de421.bsp").with_lsk("");
        assert!(matches!(
            Engine::new(config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn engine_rejects_bad_observer() {
        let mut config = EngineConfig::new("de421.bsp");
        config.observer.latitude_deg = 120.0;
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn missing_kernel_is_load_error() {
        let err = Engine::new(EngineConfig::new("/nonexistent/de421.bsp")).unwrap_err();
        assert!(matches!(err, EngineError::KernelLoad(_)));
    }

    #[test]
    fn body_names_parse() {
        assert_eq!(Body::Moon.code(), 301);
        assert_eq!("Luna".parse::<Body>().unwrap(), Body::Moon);
        assert_eq!("sun".parse::<Body>().unwrap(), Body::Sun);
        assert!("mars".parse::<Body>().is_err());
    }

    #[test]
    fn kernel_range_error_maps_to_epoch_out_of_range() {
        let err: EngineError = KernelError::EpochOutOfRange {
            target: 301,
            center: 3,
            epoch_tdb_s: 0.0,
        }
        .into();
        assert_eq!(
            err,
            EngineError::EpochOutOfRange {
                epoch_tdb_jd: 2_451_545.0
            }
        );
    }

    // Compile-time assertion: Engine must be Send + Sync.
    #[allow(dead_code)]
    const _: () = {
        fn assert_send_sync<T: Send + Sync>() {}
        fn check() {
            assert_send_sync::<Engine>();
        }
    };
}
