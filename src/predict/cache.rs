use std::collections::HashMap;
use std::sync::Mutex;

use crate::overhead::Facility;

/// Earth-fixed description of a facility used for topocentric geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacilityFrame {
    pub ecef_km: [f64; 3],
    pub lat_rad: f64,
    pub lon_rad: f64,
}

impl FacilityFrame {
    pub fn new(facility: &Facility) -> Self {
        Self {
            ecef_km: facility.position_ecef_km(),
            lat_rad: facility.coordinates.lat_rad(),
            lon_rad: facility.coordinates.lon_rad(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FacilityKey([u64; 3]);

impl FacilityKey {
    fn new(facility: &Facility) -> Self {
        Self([
            facility.coordinates.latitude_deg.to_bits(),
            facility.coordinates.longitude_deg.to_bits(),
            facility.elevation_m.to_bits(),
        ])
    }
}

/// Memoised facility frames, keyed by the facility's location values.
///
/// Owned by one retriever for one engine run. Purely a speedup: a miss
/// recomputes the same frame.
#[derive(Debug, Default)]
pub struct GeometryCache {
    frames: Mutex<HashMap<FacilityKey, FacilityFrame>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facility_frame(&self, facility: &Facility) -> FacilityFrame {
        let key = FacilityKey::new(facility);
        let mut frames = self.frames.lock().unwrap_or_else(|e| e.into_inner());
        *frames
            .entry(key)
            .or_insert_with(|| FacilityFrame::new(facility))
    }

    pub fn len(&self) -> usize {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
