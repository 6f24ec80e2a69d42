use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sgp4::Elements;

use super::error::ConfigurationError;
use super::facility::Facility;

/// A closed-open interval `[begin, end)` with `begin <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = ConfigurationError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.begin, raw.end)
    }
}

impl TimeWindow {
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ConfigurationError> {
        if begin > end {
            return Err(ConfigurationError::TimeWindow { begin, end });
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> DateTime<Utc> {
        self.begin
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.begin
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.begin <= time && time < self.end
    }
}

/// Topocentric look angles of a target seen from a facility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Negative below the horizon.
    pub altitude_deg: f64,
    /// Clockwise from north, `[0, 360)`.
    pub azimuth_deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Position {
    pub fn new(altitude_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            altitude_deg,
            azimuth_deg,
            distance_km: None,
        }
    }

    pub fn with_distance(mut self, distance_km: f64) -> Self {
        self.distance_km = Some(distance_km);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionTime {
    pub position: Position,
    pub time: DateTime<Utc>,
}

impl PositionTime {
    pub fn new(position: Position, time: DateTime<Utc>) -> Self {
        Self { position, time }
    }
}

/// Satellite samples that fall inside one antenna pointing interval, paired
/// with the direction the antenna holds during that interval.
#[derive(Debug, Clone, PartialEq)]
pub struct AntennaPosition {
    pub satellite_positions: Vec<PositionTime>,
    pub antenna_direction: PositionTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub frequency_hz: Option<f64>,
    pub bandwidth_hz: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub facility: Facility,
    pub time: TimeWindow,
    #[serde(default)]
    pub frequency: FrequencyRange,
}

impl Reservation {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.time.begin() >= self.time.end() {
            return Err(ConfigurationError::ReservationWindow {
                begin: self.time.begin(),
                end: self.time.end(),
            });
        }
        if let Some(frequency_hz) = self.frequency.frequency_hz {
            if !(frequency_hz > 0.0) {
                return Err(ConfigurationError::Frequency(frequency_hz));
            }
        }
        self.facility.validate()
    }
}

/// Downlink characteristics used by the link budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transmitter {
    pub power_watts: f64,
    /// Linear gain toward the facility.
    pub gain: f64,
}

impl Transmitter {
    pub fn from_dbi(power_watts: f64, gain_dbi: f64) -> Self {
        Self {
            power_watts,
            gain: 10f64.powf(gain_dbi / 10.0),
        }
    }
}

impl Default for Transmitter {
    /// 1 W into an isotropic antenna, so powers read as "per watt EIRP".
    fn default() -> Self {
        Self {
            power_watts: 1.0,
            gain: 1.0,
        }
    }
}

/// Opaque satellite identity. The engine never looks inside the elements.
#[derive(Debug, Clone, Serialize)]
pub struct Satellite {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norad_id: Option<u64>,
    #[serde(skip)]
    elements: Option<Arc<Elements>>,
    #[serde(skip)]
    pub transmitter: Option<Transmitter>,
}

impl Satellite {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            norad_id: None,
            elements: None,
            transmitter: None,
        }
    }

    pub fn from_elements(elements: Elements) -> Self {
        let name = elements
            .object_name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", elements.norad_id));
        Self {
            name,
            norad_id: Some(elements.norad_id),
            elements: Some(Arc::new(elements)),
            transmitter: None,
        }
    }

    pub fn with_transmitter(mut self, transmitter: Transmitter) -> Self {
        self.transmitter = Some(transmitter);
        self
    }

    pub fn elements(&self) -> Option<&Elements> {
        self.elements.as_deref()
    }
}

impl PartialEq for Satellite {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.norad_id == other.norad_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverheadWindow {
    pub satellite: Satellite,
    pub overhead_time: TimeWindow,
    /// The in-view samples inside `overhead_time`.
    pub positions: Vec<PositionTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerTime {
    pub power_watts: f64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerWindow {
    pub satellite: Satellite,
    pub powertimes: Vec<PowerTime>,
}
