use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::predict::PredictError;

/// Rejected engine input. Raised before any work is dispatched.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("satellite list is empty")]
    NoSatellites,
    #[error("antenna direction path is empty")]
    EmptyAntennaPath,
    #[error("antenna direction path is not strictly increasing in time at index {index}")]
    NonMonotonicAntennaPath { index: usize },
    #[error("reservation begin {begin} is not before end {end}")]
    ReservationWindow {
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("time window begin {begin} is after end {end}")]
    TimeWindow {
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("facility beamwidth must be positive, got {0}")]
    Beamwidth(f64),
    #[error("time continuity resolution must be at least 1 second, got {0}")]
    Resolution(Duration),
    #[error("concurrency level must be at least 1, got {0}")]
    ConcurrencyLevel(usize),
    #[error("minimum altitude must be non-negative, got {0}")]
    MinAltitude(f64),
    #[error("reservation frequency is required for power estimation")]
    MissingFrequency,
    #[error("reservation frequency must be positive, got {0} Hz")]
    Frequency(f64),
    #[error("cutoff {cutoff} is outside the reservation")]
    Cutoff { cutoff: DateTime<Utc> },
}

impl ConfigurationError {
    /// Name of the configuration field that was rejected.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigurationError::NoSatellites => "satellites",
            ConfigurationError::EmptyAntennaPath
            | ConfigurationError::NonMonotonicAntennaPath { .. } => "antenna_direction_path",
            ConfigurationError::ReservationWindow { .. } => "reservation.time",
            ConfigurationError::TimeWindow { .. } => "time_window",
            ConfigurationError::Beamwidth(_) => "facility.beamwidth",
            ConfigurationError::Resolution(_) => "time_continuity_resolution",
            ConfigurationError::ConcurrencyLevel(_) => "concurrency_level",
            ConfigurationError::MinAltitude(_) => "min_altitude",
            ConfigurationError::MissingFrequency | ConfigurationError::Frequency(_) => {
                "reservation.frequency"
            }
            ConfigurationError::Cutoff { .. } => "cutoff",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration ({field}): {0}", field = .0.field())]
    Configuration(#[from] ConfigurationError),
    #[error("satellite {satellite}: {source}")]
    Satellite {
        satellite: String,
        #[source]
        source: PredictError,
    },
    #[error("satellite {satellite}: no distance available at {time}")]
    MissingDistance {
        satellite: String,
        time: DateTime<Utc>,
    },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
