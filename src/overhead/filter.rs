use super::facility::Facility;
use super::types::Position;

/// Decides whether a satellite counts as in view of the antenna.
pub trait FilterStrategy: Send + Sync {
    fn is_in_view(&self, satellite: &Position, antenna: &Position) -> bool;
}

/// Visible at all, regardless of where the antenna points.
#[derive(Debug, Clone, Copy)]
pub struct AboveHorizonFilter {
    min_altitude_deg: f64,
}

impl AboveHorizonFilter {
    pub fn new(min_altitude_deg: f64) -> Self {
        Self { min_altitude_deg }
    }
}

impl FilterStrategy for AboveHorizonFilter {
    fn is_in_view(&self, satellite: &Position, _antenna: &Position) -> bool {
        satellite.altitude_deg >= self.min_altitude_deg
    }
}

/// Inside the main beam, and never below the horizon floor.
#[derive(Debug, Clone, Copy)]
pub struct WithinMainBeamFilter {
    half_beamwidth_deg: f64,
    min_altitude_deg: f64,
}

impl WithinMainBeamFilter {
    pub fn new(facility: &Facility, min_altitude_deg: f64) -> Self {
        Self {
            half_beamwidth_deg: facility.half_beamwidth(),
            min_altitude_deg,
        }
    }

    fn altitude_proximate(&self, satellite: &Position, antenna: &Position) -> bool {
        satellite.altitude_deg >= self.min_altitude_deg
            && satellite.altitude_deg >= antenna.altitude_deg - self.half_beamwidth_deg
    }

    fn azimuth_proximate(&self, satellite: &Position, antenna: &Position) -> bool {
        let satellite_candidates = [satellite.azimuth_deg, satellite.azimuth_deg + 360.0];
        let antenna_candidates = [antenna.azimuth_deg, antenna.azimuth_deg + 360.0];
        satellite_candidates.iter().any(|s| {
            antenna_candidates
                .iter()
                .any(|a| (s - a).abs() <= self.half_beamwidth_deg)
        })
    }
}

impl FilterStrategy for WithinMainBeamFilter {
    fn is_in_view(&self, satellite: &Position, antenna: &Position) -> bool {
        self.altitude_proximate(satellite, antenna) && self.azimuth_proximate(satellite, antenna)
    }
}
