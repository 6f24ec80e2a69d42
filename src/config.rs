use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::gain::{ConstantGain, GainPattern, GaussianBeam};
use crate::overhead::{
    ConfigurationError, Coordinates, Facility, FrequencyRange, OnFail, Position, PositionTime,
    Reservation, RuntimeSettings, Satellite, TimeWindow, Transmitter,
};
use crate::predict::{PredictError, TleLoader};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("satellites: {0}")]
    Satellites(#[from] PredictError),
    #[error("invalid station coordinates: {0}")]
    Coordinates(String),
    #[error("antenna: exactly one of `path` or `fixed` is required")]
    Antenna,
    #[error("reservation: {0}")]
    Reservation(#[from] ConfigurationError),
}

/// A run description: where, when, what to look at, and how.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub facility: FacilityConfig,
    pub reservation: ReservationConfig,
    pub satellites: SatellitesConfig,
    pub antenna: AntennaConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub power: PowerConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacilityConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub elevation_m: f64,
    pub beamwidth_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationConfig {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub frequency_hz: Option<f64>,
    pub bandwidth_hz: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SatellitesConfig {
    /// A TLE file or a directory of them.
    pub tle: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionConfig {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointingConfig {
    pub time: DateTime<Utc>,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AntennaConfig {
    pub path: Option<Vec<PointingConfig>>,
    /// Held for the whole reservation.
    pub fixed: Option<DirectionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    #[serde(
        default = "default_resolution",
        deserialize_with = "deserialize_duration"
    )]
    pub time_continuity_resolution: Duration,
    #[serde(default = "default_concurrency")]
    pub concurrency_level: usize,
    #[serde(default)]
    pub min_altitude_deg: f64,
    #[serde(default)]
    pub on_fail: OnFail,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            time_continuity_resolution: default_resolution(),
            concurrency_level: default_concurrency(),
            min_altitude_deg: 0.0,
            on_fail: OnFail::default(),
        }
    }
}

fn default_resolution() -> Duration {
    Duration::seconds(1)
}

fn default_concurrency() -> usize {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PowerConfig {
    #[serde(default)]
    pub gain: GainConfig,
    pub transmitter: Option<TransmitterConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GainConfig {
    #[default]
    Isotropic,
    Constant {
        gain_dbi: f64,
    },
    Gaussian {
        peak_gain_dbi: f64,
        /// Defaults to the facility beamwidth.
        fwhm_deg: Option<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransmitterConfig {
    pub power_watts: f64,
    #[serde(default)]
    pub gain_dbi: f64,
}

/// Everything the engine needs, resolved from a [`Config`].
pub struct RunInputs {
    pub reservation: Reservation,
    pub satellites: Vec<Satellite>,
    pub antenna_path: Vec<PositionTime>,
    pub settings: RuntimeSettings,
    pub gain: Arc<dyn GainPattern>,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.base_dir = Path::new(path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn facility(&self) -> Result<Facility, ConfigError> {
        let coordinates = Coordinates::parse(&self.facility.coordinates)
            .ok_or_else(|| ConfigError::Coordinates(self.facility.coordinates.clone()))?;
        Ok(Facility::new(
            self.facility.name.clone().unwrap_or_else(|| "facility".to_string()),
            coordinates,
            self.facility.elevation_m,
            self.facility.beamwidth_deg,
        ))
    }

    pub fn antenna_path(&self) -> Result<Vec<PositionTime>, ConfigError> {
        match (&self.antenna.path, &self.antenna.fixed) {
            (Some(path), None) => Ok(path
                .iter()
                .map(|p| {
                    PositionTime::new(Position::new(p.altitude_deg, p.azimuth_deg), p.time)
                })
                .collect()),
            (None, Some(fixed)) => Ok(vec![PositionTime::new(
                Position::new(fixed.altitude_deg, fixed.azimuth_deg),
                self.reservation.begin,
            )]),
            _ => Err(ConfigError::Antenna),
        }
    }

    pub fn settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            time_continuity_resolution: self.settings.time_continuity_resolution,
            concurrency_level: self.settings.concurrency_level,
            min_altitude_deg: self.settings.min_altitude_deg,
            on_fail: self.settings.on_fail,
        }
    }

    pub fn gain_pattern(&self) -> Arc<dyn GainPattern> {
        match self.power.gain {
            GainConfig::Isotropic => Arc::new(ConstantGain::isotropic()),
            GainConfig::Constant { gain_dbi } => Arc::new(ConstantGain::from_dbi(gain_dbi)),
            GainConfig::Gaussian {
                peak_gain_dbi,
                fwhm_deg,
            } => Arc::new(GaussianBeam::from_dbi(
                peak_gain_dbi,
                fwhm_deg.unwrap_or(self.facility.beamwidth_deg),
            )),
        }
    }

    pub fn load_satellites(&self) -> Result<Vec<Satellite>, ConfigError> {
        let path = self.base_dir.join(&self.satellites.tle);
        let mut satellites = TleLoader::load(&path)?;
        if let Some(tx) = &self.power.transmitter {
            let transmitter = Transmitter::from_dbi(tx.power_watts, tx.gain_dbi);
            for satellite in satellites.iter_mut().filter(|s| s.transmitter.is_none()) {
                satellite.transmitter = Some(transmitter);
            }
        }
        log::info!("Loaded {} satellites from {}", satellites.len(), path.display());
        Ok(satellites)
    }

    /// Resolves the configuration into engine inputs. Field-level validation
    /// is left to the engine.
    pub fn into_inputs(self) -> Result<RunInputs, ConfigError> {
        let time = TimeWindow::new(self.reservation.begin, self.reservation.end)?;
        Ok(RunInputs {
            reservation: Reservation {
                facility: self.facility()?,
                time,
                frequency: FrequencyRange {
                    frequency_hz: self.reservation.frequency_hz,
                    bandwidth_hz: self.reservation.bandwidth_hz,
                },
            },
            satellites: self.load_satellites()?,
            antenna_path: self.antenna_path()?,
            settings: self.settings(),
            gain: self.gain_pattern(),
        })
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim())
        .map_err(serde::de::Error::custom)
        .and_then(|d| Duration::from_std(d).map_err(serde::de::Error::custom))
}
