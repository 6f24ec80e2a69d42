use serde::{Deserialize, Serialize};

use super::error::ConfigurationError;

// WGS-84
const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
const EARTH_ECCENTRICITY_SQUARED: f64 = 0.006_694_379_990_14;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl Coordinates {
    /// Parses `"lat, lon"` in decimal degrees.
    pub fn parse(coordinates: &str) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        Some(Self {
            latitude_deg: parts[0].parse().ok()?,
            longitude_deg: parts[1].parse().ok()?,
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }
}

/// A radio telescope site with a single dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub coordinates: Coordinates,
    /// Height above the WGS-84 ellipsoid.
    pub elevation_m: f64,
    /// Full width of the main beam.
    pub beamwidth_deg: f64,
}

impl Facility {
    pub fn new(
        name: impl Into<String>,
        coordinates: Coordinates,
        elevation_m: f64,
        beamwidth_deg: f64,
    ) -> Self {
        Self {
            name: name.into(),
            coordinates,
            elevation_m,
            beamwidth_deg,
        }
    }

    pub fn half_beamwidth(&self) -> f64 {
        self.beamwidth_deg / 2.0
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        // NaN fails this comparison as well
        if !(self.beamwidth_deg > 0.0) {
            return Err(ConfigurationError::Beamwidth(self.beamwidth_deg));
        }
        Ok(())
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.coordinates.lat_rad();
        let lon = self.coordinates.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = EARTH_EQUATORIAL_RADIUS_KM
            / (1.0 - EARTH_ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt();
        let alt_km = self.elevation_m / 1000.0;
        [
            (n + alt_km) * cos_lat * lon.cos(),
            (n + alt_km) * cos_lat * lon.sin(),
            (n * (1.0 - EARTH_ECCENTRICITY_SQUARED) + alt_km) * sin_lat,
        ]
    }
}
